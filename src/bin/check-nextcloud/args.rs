use std::env;
use std::fmt;

use derive_more::From;
use log::{debug, warn};
use structopt::clap::{self, AppSettings, ErrorKind};
use structopt::StructOpt;

use nextcloud_plugins::metrics::{MetricCheck, UnknownMetric};
use nextcloud_plugins::Status;

static AFTER_HELP: &str = "About Parameters:

    Without -P this prints a summary of the instance and only warns when
    app updates are available. With -P, that one metric is checked against
    the -w and -c thresholds. The available parameters are:

        version php_version freespace cpuload mem_free swap_free
        app_updates users users5m users1h users24h files shares
        shares_user shares_groups shares_link shares_fed db_size

About Thresholds:

    Thresholds use the Nagios range syntax and alert when the value is
    outside of the range:

        - `x`     alert if the value is below 0 or above x
        - `x:`    alert if the value is below x
        - `~:x`   alert if the value is above x
        - `x:y`   alert if the value is below x or above y
        - `@x:y`  alert if the value is between x and y (inclusive)

    For freespace, mem_free, swap_free and db_size the bounds may carry
    binary byte units: B kB MB GB TB PB EB ZB YB, e.g. `-w 10GB:`.

Examples:

    Warn when less than 10GB of disk space is free, critical under 2GB:

        check-nextcloud -H cloud.example.com -T $TOKEN -P freespace -w 10GB: -c 2GB:

    Go critical when more than 500 users were active in the last hour:

        check-nextcloud -H cloud.example.com -u admin -p $PASS -P users1h -c '~:500'";

/// Check a Nextcloud instance through its serverinfo API.
///
/// Authenticate with either a serverinfo token (-T) or a user and password
/// (-u/-p). The token is used if both are given.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-nextcloud (part of nextcloud-plugins)",
    setting = AppSettings::ColoredHelp,
    after_help = AFTER_HELP
)]
pub(crate) struct Args {
    #[structopt(
        short = "H",
        long = "host",
        help = "Hostname of the Nextcloud instance, e.g. cloud.example.com"
    )]
    pub host: Option<String>,
    #[structopt(
        short = "U",
        long = "uri",
        help = "Path of the serverinfo API",
        default_value = "/ocs/v2.php/apps/serverinfo/api/v1/info"
    )]
    pub uri: String,
    #[structopt(
        short = "T",
        long = "token",
        env = "NC_TOKEN",
        hide_env_values = true,
        help = "Serverinfo token, sent as the NC-Token header"
    )]
    pub token: Option<String>,
    #[structopt(
        short = "u",
        long = "user",
        default_value = "",
        help = "User to authenticate as, if no token is given"
    )]
    pub user: String,
    #[structopt(
        short = "p",
        long = "password",
        env = "NC_PASSWORD",
        hide_env_values = true,
        default_value = "",
        help = "Password for --user"
    )]
    pub password: String,
    #[structopt(
        short = "s",
        long = "ssl",
        help = "Query over HTTPS: true or false [default: true]"
    )]
    pub ssl: Option<bool>,
    #[structopt(
        short = "P",
        long = "parameter",
        help = "Check this one metric instead of printing a summary. See below."
    )]
    pub parameter: Option<String>,
    #[structopt(
        short = "w",
        long = "warning",
        default_value = "",
        help = "Range to warn outside of"
    )]
    pub warning: String,
    #[structopt(
        short = "c",
        long = "critical",
        default_value = "",
        help = "Range to go critical outside of"
    )]
    pub critical: String,
    #[structopt(
        short = "a",
        long = "apps",
        help = "Also ask for app update information. Slower, implied by -P app_updates"
    )]
    pub apps: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Auth {
    Token(String),
    Basic { user: String, password: String },
    Anonymous,
}

/// Everything the check needs, decided once at startup
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Config {
    pub host: String,
    /// Always starts with a `/`
    pub uri: String,
    pub ssl: bool,
    pub auth: Auth,
    pub check: Option<MetricCheck>,
    pub include_apps: bool,
}

#[derive(Debug, PartialEq, From)]
pub(crate) enum UsageError {
    #[from(ignore)]
    MissingHost,
    UnknownMetric(UnknownMetric),
}

impl UsageError {
    pub fn status(&self) -> Status {
        Status::Unknown
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            UsageError::MissingHost => write!(f, "a hostname (-H) is required"),
            UsageError::UnknownMetric(ref e) => write!(f, "{}", e),
        }
    }
}

/// The status to exit with when clap refuses the command line
///
/// `--help` and `--version` are not failures.
pub(crate) fn clap_status(kind: ErrorKind) -> Status {
    match kind {
        ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => Status::Ok,
        _ => Status::Critical,
    }
}

impl Args {
    /// Parse the command line, or exit with help for the user
    ///
    /// Malformed options are CRITICAL, a missing host or an unknown metric
    /// is UNKNOWN.
    pub fn parse() -> Config {
        let args = match Args::from_iter_safe(env::args_os()) {
            Ok(args) => args,
            Err(clap::Error { message, kind, .. }) => {
                let status = clap_status(kind);
                if status == Status::Ok {
                    println!("{}", message);
                } else {
                    println!("{}: {}", status, message.trim_start_matches("error: "));
                }
                status.exit();
            }
        };
        match args.into_config() {
            Ok(config) => config,
            Err(UsageError::MissingHost) => {
                // stdout, so that the monitoring system shows it
                if let Err(e) = Args::clap().print_help() {
                    println!("{}: {}", Status::Unknown, e);
                }
                println!();
                Status::Unknown.exit();
            }
            Err(e) => {
                println!("{}: {}", e.status(), e);
                e.status().exit();
            }
        }
    }

    pub fn into_config(self) -> Result<Config, UsageError> {
        let host = match self.host.as_ref().map(|h| h.trim()) {
            Some(host) if !host.is_empty() => host.to_owned(),
            _ => return Err(UsageError::MissingHost),
        };

        let check = match self.parameter {
            Some(ref name) => Some(MetricCheck::parse(name.trim(), &self.warning, &self.critical)?),
            None => {
                if !self.warning.is_empty() || !self.critical.is_empty() {
                    warn!("-w/-c are only used together with -P, ignoring them");
                }
                None
            }
        };
        let include_apps = self.apps || check.as_ref().map_or(false, |c| c.metric.needs_apps());

        let auth = match self.token {
            Some(ref token) if !token.trim().is_empty() => Auth::Token(token.trim().to_owned()),
            _ if !self.user.trim().is_empty() => Auth::Basic {
                user: self.user.trim().to_owned(),
                password: self.password.clone(),
            },
            _ => Auth::Anonymous,
        };

        let uri = self.uri.trim();
        let uri = if uri.starts_with('/') {
            uri.to_owned()
        } else {
            format!("/{}", uri)
        };

        let config = Config {
            host,
            uri,
            ssl: self.ssl.unwrap_or(true),
            auth,
            check,
            include_apps,
        };
        debug!(
            "checking {} over {} (metric: {})",
            config.host,
            if config.ssl { "https" } else { "http" },
            config
                .check
                .as_ref()
                .map_or("summary", |c| c.metric.name())
        );
        Ok(config)
    }
}

/// Args for tests, without credentials exported in the developer's shell
#[cfg(test)]
pub(crate) fn test_args(argv: &[&str]) -> Args {
    env::remove_var("NC_TOKEN");
    env::remove_var("NC_PASSWORD");
    let mut full = vec!["check-nextcloud"];
    full.extend_from_slice(argv);
    Args::from_iter(full)
}
