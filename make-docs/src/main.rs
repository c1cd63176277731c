//! Regenerate `src/scripts.rs` from the `--help` output of every plugin
//!
//! Run from the repository root after `cargo build`:
//!
//! ```plain
//! make-docs > src/scripts.rs
//! ```

use std::env;
use std::process::Command;

struct Plugin {
    name: &'static str,
    about: &'static str,
}

static PLUGINS: [Plugin; 1] = [Plugin {
    name: "check-nextcloud",
    about: "Cross platform, only requires HTTP(S) access to the Nextcloud instance and \
            either a serverinfo token or an admin account.",
}];

fn main() {
    let target = env::args()
        .nth(1)
        .unwrap_or_else(|| "target/debug".to_owned());

    let mut out = doc_lines(
        "Documentation about the plugins contained herein\n\n\
         Generated by `make-docs`, do not edit by hand."
            .split('\n'),
    );
    out.push_str("\n//!\n");
    out.push_str(&doc_lines(
        PLUGINS.iter().map(|p| format!("- [{0}](#{0})", p.name)),
    ));
    out.push('\n');

    for plugin in PLUGINS.iter() {
        let binary = format!("{}/{}", target, plugin.name);
        let output = Command::new(&binary)
            .arg("--help")
            .output()
            .unwrap_or_else(|e| panic!("couldn't run {}: {}", binary, e));
        let help = String::from_utf8(output.stdout)
            .unwrap_or_else(|e| panic!("{} --help isn't utf8: {}", plugin.name, e));

        out.push_str(&format!(
            "//!\n//! # {0}\n//!\n//! {1}\n//!\n//! ```plain\n//! $ {0} --help\n",
            plugin.name, plugin.about
        ));
        out.push_str(&doc_lines(help.trim_end().split('\n')));
        out.push_str("\n//! ```\n");
    }
    print!("{}", out);
}

/// Turn every line into an inner doc comment
fn doc_lines<S: AsRef<str>, I: Iterator<Item = S>>(lines: I) -> String {
    lines
        .map(|line| format!("//! {}", line.as_ref()).trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}
