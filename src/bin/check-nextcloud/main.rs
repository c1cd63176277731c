//! Check a Nextcloud instance through its serverinfo API

mod args;
mod fetch;

use env_logger::Env;

use nextcloud_plugins::report::{self, Report};

use crate::args::{Args, Config};
use crate::fetch::fetch;

/// Fetch, decode, evaluate and describe
///
/// Never exits the process, so that tests can look at the result.
fn check(config: &Config) -> Report {
    let envelope = match fetch(config) {
        Ok(envelope) => envelope,
        Err(e) => return Report::new(e.status(), e.to_string()),
    };
    let info = match envelope.into_server_info() {
        Ok(info) => info,
        Err(e) => return Report::new(e.status(), e.to_string()),
    };
    match config.check {
        Some(ref check) => check.run(&info),
        None => report::summary(&info),
    }
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    // stderr only, stdout is for the monitoring system
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = Args::parse();
    let report = check(&config);
    println!("{}", report);
    report.status.exit();
}
