//! Plugin output
//!
//! A check prints exactly one line:
//!
//! ```plain
//! WARNING: 5.00 GB disk space available | free_space=5368709120B;10GB:
//! ```
//!
//! Everything after the `|` is perf data, `label=value[uom];warn;crit;min;max`
//! per metric, which monitoring front ends parse to draw graphs.

use std::fmt;

use itertools::Itertools;

use crate::bytesize::bytes_to_human_size;
use crate::metrics::Metric;
use crate::serverinfo::ServerInfo;
use crate::threshold::Thresholds;
use crate::Status;

/// One perf data token
#[derive(Clone, Debug, PartialEq)]
pub struct PerfData {
    pub label: String,
    pub value: String,
    pub uom: &'static str,
    /// Echoed back exactly as given on the command line
    pub warn: String,
    pub crit: String,
    pub max: Option<String>,
}

impl PerfData {
    pub fn new<V: ToString>(label: &str, value: V, uom: &'static str) -> PerfData {
        PerfData {
            label: label.to_owned(),
            value: value.to_string(),
            uom,
            warn: String::new(),
            crit: String::new(),
            max: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: &Thresholds) -> PerfData {
        self.warn = thresholds.warning.raw().to_owned();
        self.crit = thresholds.critical.raw().to_owned();
        self
    }

    pub fn with_max(mut self, max: Option<String>) -> PerfData {
        self.max = max;
        self
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = format!("{}{}", self.value, self.uom);
        let mut fields = vec![
            value.as_str(),
            self.warn.as_str(),
            self.crit.as_str(),
            // no metric has a known minimum
            "",
            self.max.as_ref().map_or("", |m| m.as_str()),
        ];
        // trailing empty fields can be left off
        while fields.len() > 1 && fields.last() == Some(&"") {
            fields.pop();
        }
        write!(f, "{}={}", self.label, fields.join(";"))
    }
}

/// The outcome of a check
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub status: Status,
    pub message: String,
    pub perfdata: Vec<PerfData>,
}

impl Report {
    pub fn new<S: Into<String>>(status: Status, message: S) -> Report {
        Report {
            status,
            message: message.into(),
            perfdata: Vec::new(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)?;
        if !self.perfdata.is_empty() {
            write!(f, " | {}", self.perfdata.iter().join(" "))?;
        }
        Ok(())
    }
}

/// Metrics graphed in the summary, in output order
static SUMMARY_PERFDATA: [Metric; 9] = [
    Metric::FreeSpace,
    Metric::AppUpdates,
    Metric::Users,
    Metric::Users5m,
    Metric::Users1h,
    Metric::Users24h,
    Metric::Files,
    Metric::Shares,
    Metric::DbSize,
];

/// Describe the whole instance, for when no single metric was asked for
///
/// Pending app updates are a warning, everything else is informational.
pub fn summary(info: &ServerInfo) -> Report {
    let system = &info.nextcloud.system;
    let shares = &info.nextcloud.shares;
    let users = &info.active_users;
    let database = &info.server.database;
    let updates = system
        .apps
        .as_ref()
        .map_or(0, |apps| apps.num_updates_available);

    let mut parts = vec![format!(
        "Nextcloud {} ({} available)",
        system.version,
        bytes_to_human_size(system.freespace, 2)
    )];
    if let Some(apps) = system.apps.as_ref().filter(|_| updates > 0) {
        parts.push(format!(
            "{} app updates available ({})",
            updates,
            apps.app_updates.keys().join(", ")
        ));
    }
    parts.push(format!(
        "{} users ({} < 5min, {} < 1h, {} < 24h)",
        info.nextcloud.storage.num_users,
        users.last_5_minutes,
        users.last_hour,
        users.last_24_hours
    ));
    parts.push(format!("{} files", info.nextcloud.storage.num_files));
    parts.push(format!(
        "{} shares ({} user, {} group, {} link, {} federated)",
        shares.num_shares,
        shares.num_shares_user,
        shares.num_shares_groups,
        shares.num_shares_link,
        shares.num_fed_shares_sent
    ));
    parts.push(info.server.webserver.clone());
    parts.push(format!("PHP {}", info.server.php.version));
    parts.push(format!(
        "{} {} ({})",
        database.kind,
        database.version,
        bytes_to_human_size(database.size, 2)
    ));

    let status = if updates > 0 {
        Status::Warning
    } else {
        Status::Ok
    };
    let mut report = Report::new(status, parts.join(", "));
    report.perfdata = SUMMARY_PERFDATA
        .iter()
        .filter_map(|metric| {
            metric.extract(info).and_then(|value| {
                value
                    .perf_value()
                    .map(|v| PerfData::new(metric.perf_label(), v, value.uom()))
            })
        })
        .collect();
    report
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::serverinfo::test::server_info;
    use crate::threshold::Units;

    #[test]
    fn perfdata_trims_trailing_fields() {
        assert_eq!(PerfData::new("users", 5, "").to_string(), "users=5");
        let with_crit = PerfData::new("files", 5, "")
            .with_thresholds(&Thresholds::new("", "10", Units::Plain));
        assert_eq!(with_crit.to_string(), "files=5;;10");
        let full = PerfData::new("mem_free", 1, "B")
            .with_thresholds(&Thresholds::new("1:", "@0:1", Units::Bytes))
            .with_max(Some("2".into()));
        assert_eq!(full.to_string(), "mem_free=1B;1:;@0:1;;2");
    }

    #[test]
    fn report_without_perfdata_has_no_pipe() {
        let report = Report::new(Status::Critical, "failure: Not Found");
        assert_eq!(report.to_string(), "CRITICAL: failure: Not Found");
    }

    #[test]
    fn summary_with_updates_warns() {
        let report = summary(&server_info());
        assert_eq!(report.status, Status::Warning);
        assert_eq!(
            report.to_string(),
            "WARNING: Nextcloud 27.1.3.2 (5.00 GB available), \
             2 app updates available (calendar, deck), \
             150 users (2 < 5min, 10 < 1h, 30 < 24h), 123456 files, \
             20 shares (10 user, 5 group, 4 link, 1 federated), \
             Apache/2.4.57 (Debian), PHP 8.2.12, mysql 10.11.4 (1.23 GB) \
             | free_space=5368709120B app_updates=2 users=150 users5m=2 \
             users1h=10 users24h=30 files=123456 shares=20 db_size=1322254336B"
        );
    }

    #[test]
    fn summary_without_app_info_is_ok() {
        let mut info = server_info();
        info.nextcloud.system.apps = None;
        let report = summary(&info);
        assert_eq!(report.status, Status::Ok);
        assert!(report.message.starts_with(
            "Nextcloud 27.1.3.2 (5.00 GB available), 150 users"
        ));
        assert!(!report.perfdata.iter().any(|p| p.label == "app_updates"));
    }
}
