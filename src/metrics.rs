//! Named metrics that can be pulled out of a serverinfo response
//!
//! These are the names accepted by `check-nextcloud -P <name>`. Each metric
//! knows where it lives in `ServerInfo`, whether it is a byte count (so that
//! thresholds like `10GB:` make sense for it), how to label it in perf data,
//! and how to describe it to a human.

use std::cmp::max;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use log::warn;

use crate::bytesize::bytes_to_human_size;
use crate::report::{PerfData, Report};
use crate::serverinfo::ServerInfo;
use crate::threshold::{Thresholds, Units};
use crate::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Version,
    PhpVersion,
    FreeSpace,
    CpuLoad,
    MemFree,
    SwapFree,
    AppUpdates,
    Users,
    Users5m,
    Users1h,
    Users24h,
    Files,
    Shares,
    SharesUser,
    SharesGroups,
    SharesLink,
    SharesFederated,
    DbSize,
}

/// Every metric, in the order they are documented
pub static ALL_METRICS: [Metric; 18] = [
    Metric::Version,
    Metric::PhpVersion,
    Metric::FreeSpace,
    Metric::CpuLoad,
    Metric::MemFree,
    Metric::SwapFree,
    Metric::AppUpdates,
    Metric::Users,
    Metric::Users5m,
    Metric::Users1h,
    Metric::Users24h,
    Metric::Files,
    Metric::Shares,
    Metric::SharesUser,
    Metric::SharesGroups,
    Metric::SharesLink,
    Metric::SharesFederated,
    Metric::DbSize,
];

/// A value pulled out of a serverinfo response
#[derive(Clone, Debug, PartialEq)]
pub enum MetricValue {
    Bytes(u64),
    Count(u64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    /// The value to compare against thresholds, if it is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            MetricValue::Bytes(n) | MetricValue::Count(n) => Some(n as f64),
            MetricValue::Float(f) => Some(f),
            MetricValue::Text(_) => None,
        }
    }

    /// Unit of measurement for perf data
    pub fn uom(&self) -> &'static str {
        match *self {
            MetricValue::Bytes(_) => "B",
            _ => "",
        }
    }

    /// The raw value as it should appear in perf data
    pub fn perf_value(&self) -> Option<String> {
        match *self {
            MetricValue::Bytes(n) | MetricValue::Count(n) => Some(n.to_string()),
            MetricValue::Float(f) => Some(f.to_string()),
            MetricValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MetricValue::Bytes(n) => write!(f, "{}", bytes_to_human_size(n, 2)),
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Float(n) => write!(f, "{:.2}", n),
            MetricValue::Text(ref s) => write!(f, "{}", s),
        }
    }
}

/// `-P` named something that isn't in the metric table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownMetric(pub String);

impl fmt::Display for UnknownMetric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown performance-data parameter '{}' (expected one of: {})",
            self.0,
            ALL_METRICS.iter().map(|m| m.name()).join(", ")
        )
    }
}

/// Memory and swap come in kB. Absurd values stick at `u64::MAX`.
fn kilobytes(kb: u64) -> u64 {
    kb.saturating_mul(1024)
}

impl Metric {
    pub fn name(self) -> &'static str {
        use self::Metric::*;
        match self {
            Version => "version",
            PhpVersion => "php_version",
            FreeSpace => "freespace",
            CpuLoad => "cpuload",
            MemFree => "mem_free",
            SwapFree => "swap_free",
            AppUpdates => "app_updates",
            Users => "users",
            Users5m => "users5m",
            Users1h => "users1h",
            Users24h => "users24h",
            Files => "files",
            Shares => "shares",
            SharesUser => "shares_user",
            SharesGroups => "shares_groups",
            SharesLink => "shares_link",
            SharesFederated => "shares_fed",
            DbSize => "db_size",
        }
    }

    /// Label in perf data. Matches the labels of the summary output.
    pub fn perf_label(self) -> &'static str {
        match self {
            Metric::FreeSpace => "free_space",
            other => other.name(),
        }
    }

    /// How to read threshold expressions for this metric
    pub fn units(self) -> Units {
        match self {
            Metric::FreeSpace | Metric::MemFree | Metric::SwapFree | Metric::DbSize => Units::Bytes,
            _ => Units::Plain,
        }
    }

    /// Whether the API only reports this when asked with `skipApps=false`
    pub fn needs_apps(self) -> bool {
        self == Metric::AppUpdates
    }

    /// Look this metric up in a response
    ///
    /// Returns `None` if the response doesn't have it, e.g. app updates that
    /// weren't requested or a platform without load averages.
    pub fn extract(self, info: &ServerInfo) -> Option<MetricValue> {
        use self::Metric::*;
        use self::MetricValue::*;
        let system = &info.nextcloud.system;
        let shares = &info.nextcloud.shares;
        let value = match self {
            Version => Text(system.version.clone()),
            PhpVersion => Text(info.server.php.version.clone()),
            FreeSpace => Bytes(system.freespace),
            CpuLoad => Float(*system.cpuload.first()?),
            MemFree => Bytes(kilobytes(system.mem_free)),
            SwapFree => Bytes(kilobytes(system.swap_free)),
            AppUpdates => Count(system.apps.as_ref()?.num_updates_available),
            Users => Count(info.nextcloud.storage.num_users),
            Users5m => Count(info.active_users.last_5_minutes),
            Users1h => Count(info.active_users.last_hour),
            Users24h => Count(info.active_users.last_24_hours),
            Files => Count(info.nextcloud.storage.num_files),
            Shares => Count(shares.num_shares),
            SharesUser => Count(shares.num_shares_user),
            SharesGroups => Count(shares.num_shares_groups),
            SharesLink => Count(shares.num_shares_link),
            SharesFederated => Count(shares.num_fed_shares_sent),
            DbSize => Bytes(info.server.database.size),
        };
        Some(value)
    }

    /// The largest value this metric can take, if the response says
    pub fn max(self, info: &ServerInfo) -> Option<MetricValue> {
        let system = &info.nextcloud.system;
        match self {
            Metric::MemFree if system.mem_total > 0 => {
                Some(MetricValue::Bytes(kilobytes(system.mem_total)))
            }
            Metric::SwapFree if system.swap_total > 0 => {
                Some(MetricValue::Bytes(kilobytes(system.swap_total)))
            }
            _ => None,
        }
    }

    /// A human description of `value`, for the plugin output
    pub fn describe(self, value: &MetricValue, info: &ServerInfo) -> String {
        use self::Metric::*;
        match self {
            Version => format!("Nextcloud {}", value),
            PhpVersion => format!("PHP {}", value),
            FreeSpace => format!("{} disk space available", value),
            CpuLoad => format!(
                "load average {}",
                info.nextcloud
                    .system
                    .cpuload
                    .iter()
                    .map(|l| format!("{:.2}", l))
                    .join(", ")
            ),
            MemFree | SwapFree => {
                let kind = if self == MemFree { "memory" } else { "swap" };
                match self.max(info) {
                    Some(total) => format!("{} of {} {} free", value, total, kind),
                    None => format!("{} {} free", value, kind),
                }
            }
            AppUpdates => {
                let updates = info
                    .nextcloud
                    .system
                    .apps
                    .as_ref()
                    .map(|apps| apps.app_updates.keys().join(", "))
                    .unwrap_or_default();
                if updates.is_empty() {
                    format!("{} app updates available", value)
                } else {
                    format!("{} app updates available ({})", value, updates)
                }
            }
            Users => format!("{} users", value),
            Users5m => format!("{} users active in the last 5 minutes", value),
            Users1h => format!("{} users active in the last hour", value),
            Users24h => format!("{} users active in the last 24 hours", value),
            Files => format!("{} files", value),
            Shares => format!("{} shares", value),
            SharesUser => format!("{} user shares", value),
            SharesGroups => format!("{} group shares", value),
            SharesLink => format!("{} link shares", value),
            SharesFederated => format!("{} federated shares sent", value),
            DbSize => format!(
                "{} {} database is {}",
                info.server.database.kind, info.server.database.version, value
            ),
        }
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;
    fn from_str(s: &str) -> Result<Metric, UnknownMetric> {
        ALL_METRICS
            .iter()
            .cloned()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownMetric(s.to_owned()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A metric and the thresholds to check it against
#[derive(Clone, Debug, PartialEq)]
pub struct MetricCheck {
    pub metric: Metric,
    pub thresholds: Thresholds,
}

impl MetricCheck {
    /// Parse the thresholds for `metric`, resolving byte units only for
    /// byte-valued metrics
    pub fn new(metric: Metric, warning: &str, critical: &str) -> MetricCheck {
        MetricCheck {
            metric,
            thresholds: Thresholds::new(warning, critical, metric.units()),
        }
    }

    pub fn parse(name: &str, warning: &str, critical: &str) -> Result<MetricCheck, UnknownMetric> {
        Ok(MetricCheck::new(name.parse()?, warning, critical))
    }

    pub fn evaluate(&self, value: f64) -> Status {
        self.thresholds.evaluate(value)
    }

    /// Check this metric in a response and describe the result
    pub fn run(&self, info: &ServerInfo) -> Report {
        let value = match self.metric.extract(info) {
            Some(value) => value,
            None => {
                return Report::new(
                    Status::Unknown,
                    format!("no data for '{}' in the serverinfo response", self.metric),
                )
            }
        };

        let mut status = match value.as_f64() {
            Some(number) => self.evaluate(number),
            None => {
                if self.thresholds.is_set() {
                    warn!("'{}' is not numeric, ignoring its thresholds", self.metric);
                }
                Status::Ok
            }
        };

        let mut message = self.metric.describe(&value, info);
        let invalid = self.thresholds.invalid();
        if !invalid.is_empty() {
            for problem in &invalid {
                warn!("{}", problem);
            }
            status = max(status, Status::Warning);
            message = format!("{} ({})", message, invalid.join("; "));
        }

        let mut report = Report::new(status, message);
        if let Some(perf_value) = value.perf_value() {
            report.perfdata.push(
                PerfData::new(self.metric.perf_label(), perf_value, value.uom())
                    .with_thresholds(&self.thresholds)
                    .with_max(self.metric.max(info).and_then(|m| m.perf_value())),
            );
        }
        report
    }
}

/// The status of `value` for the metric called `name`
///
/// Unknown metric names are `Status::Unknown`. Empty thresholds don't alert.
pub fn evaluate_metric(name: &str, value: f64, warning: &str, critical: &str) -> Status {
    match MetricCheck::parse(name, warning, critical) {
        Ok(check) => check.evaluate(value),
        Err(_) => Status::Unknown,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::serverinfo::test::server_info;

    #[test]
    fn every_metric_round_trips_its_name() {
        for metric in ALL_METRICS.iter() {
            assert_eq!(metric.name().parse::<Metric>(), Ok(*metric));
        }
    }

    #[test]
    fn unknown_names_are_errors() {
        let err = "unknownmetric".parse::<Metric>().unwrap_err();
        assert_eq!(err, UnknownMetric("unknownmetric".into()));
        assert!(err
            .to_string()
            .starts_with("unknown performance-data parameter 'unknownmetric'"));
    }

    #[test]
    fn only_byte_metrics_resolve_units() {
        assert_eq!(Metric::FreeSpace.units(), Units::Bytes);
        assert_eq!(Metric::DbSize.units(), Units::Bytes);
        assert_eq!(Metric::Users.units(), Units::Plain);
        assert_eq!(Metric::CpuLoad.units(), Units::Plain);
    }

    #[test]
    fn evaluate_metric_without_thresholds_is_ok() {
        assert_eq!(evaluate_metric("users", 150.0, "", ""), Status::Ok);
    }

    #[test]
    fn evaluate_metric_warns_below_the_minimum() {
        assert_eq!(evaluate_metric("users", 150.0, "100:", ""), Status::Ok);
        assert_eq!(evaluate_metric("users", 90.0, "100:", ""), Status::Warning);
        assert_eq!(evaluate_metric("users", 150.0, "~:100", ""), Status::Warning);
    }

    #[test]
    fn evaluate_metric_checks_critical_first() {
        assert_eq!(evaluate_metric("users", 40.0, "100:", "50:"), Status::Critical);
        assert_eq!(evaluate_metric("users", 75.0, "100:", "50:"), Status::Warning);
        assert_eq!(evaluate_metric("users", 150.0, "~:100", "~:50"), Status::Critical);
    }

    #[test]
    fn evaluate_metric_uses_byte_units_for_byte_metrics() {
        assert_eq!(
            evaluate_metric("freespace", 5_368_709_120.0, "10GB:", ""),
            Status::Warning
        );
        assert_eq!(
            evaluate_metric("freespace", 5_368_709_120.0, "10GB:", "1GB:"),
            Status::Warning
        );
        assert_eq!(
            evaluate_metric("freespace", 536_870_912.0, "10GB:", "1GB:"),
            Status::Critical
        );
    }

    #[test]
    fn evaluate_metric_unknown_name_is_unknown() {
        assert_eq!(evaluate_metric("bogus", 1.0, "", ""), Status::Unknown);
    }

    #[test]
    fn extracts_values() {
        let info = server_info();
        assert_eq!(
            Metric::FreeSpace.extract(&info),
            Some(MetricValue::Bytes(5_368_709_120))
        );
        assert_eq!(Metric::CpuLoad.extract(&info), Some(MetricValue::Float(0.52)));
        assert_eq!(
            Metric::MemFree.extract(&info),
            Some(MetricValue::Bytes(2_013_622 * 1024))
        );
        assert_eq!(Metric::AppUpdates.extract(&info), Some(MetricValue::Count(2)));
        assert_eq!(Metric::Users24h.extract(&info), Some(MetricValue::Count(30)));
        assert_eq!(
            Metric::Version.extract(&info),
            Some(MetricValue::Text("27.1.3.2".into()))
        );
    }

    #[test]
    fn missing_sections_have_no_value() {
        let mut info = server_info();
        info.nextcloud.system.apps = None;
        info.nextcloud.system.cpuload.clear();
        assert_eq!(Metric::AppUpdates.extract(&info), None);
        assert_eq!(Metric::CpuLoad.extract(&info), None);
        let report = MetricCheck::new(Metric::CpuLoad, "", "").run(&info);
        assert_eq!(report.status, Status::Unknown);
        assert_eq!(
            report.to_string(),
            "UNKNOWN: no data for 'cpuload' in the serverinfo response"
        );
    }

    #[test]
    fn huge_memory_values_saturate() {
        let mut info = server_info();
        info.nextcloud.system.mem_free = u64::MAX;
        info.nextcloud.system.swap_total = u64::MAX / 2;
        assert_eq!(
            Metric::MemFree.extract(&info),
            Some(MetricValue::Bytes(u64::MAX))
        );
        assert_eq!(
            Metric::SwapFree.max(&info),
            Some(MetricValue::Bytes(u64::MAX))
        );
        let report = MetricCheck::new(Metric::MemFree, "", "").run(&info);
        assert_eq!(report.status, Status::Ok);
        assert_eq!(report.message, "16.00 EB of 7.68 GB memory free");
    }

    #[test]
    fn freespace_below_minimum_warns() {
        let report = MetricCheck::new(Metric::FreeSpace, "10GB:", "").run(&server_info());
        assert_eq!(report.status, Status::Warning);
        assert_eq!(
            report.to_string(),
            "WARNING: 5.00 GB disk space available | free_space=5368709120B;10GB:"
        );
    }

    #[test]
    fn memory_reports_its_total() {
        let report = MetricCheck::new(Metric::MemFree, "", "~:1kB").run(&server_info());
        assert_eq!(report.status, Status::Critical);
        assert_eq!(
            report.to_string(),
            "CRITICAL: 1.92 GB of 7.68 GB memory free \
             | mem_free=2061948928B;;~:1kB;;8247795712"
        );
    }

    #[test]
    fn app_updates_are_listed() {
        let report = MetricCheck::new(Metric::AppUpdates, "0", "").run(&server_info());
        assert_eq!(
            report.to_string(),
            "WARNING: 2 app updates available (calendar, deck) | app_updates=2;0"
        );
    }

    #[test]
    fn text_metrics_are_ok_and_have_no_perfdata() {
        let report = MetricCheck::new(Metric::Version, "10", "20").run(&server_info());
        assert_eq!(report.to_string(), "OK: Nextcloud 27.1.3.2");
    }

    #[test]
    fn invalid_thresholds_raise_a_warning() {
        let report = MetricCheck::new(Metric::Users, "", "lots").run(&server_info());
        assert_eq!(report.status, Status::Warning);
        assert_eq!(
            report.to_string(),
            "WARNING: 150 users (ignoring critical threshold 'lots': \
             'lots' is not a range (expected one of x, x:, ~:x, x:y, @x:y)) \
             | users=150;;lots"
        );
    }

    #[test]
    fn invalid_thresholds_do_not_hide_a_critical() {
        let report = MetricCheck::new(Metric::Users, "junk", "~:10").run(&server_info());
        assert_eq!(report.status, Status::Critical);
    }
}
