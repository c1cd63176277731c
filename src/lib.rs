//! Nextcloud plugins: strongly typed monitoring checks for Nextcloud
//!
//! The goal is to make it easy to watch a Nextcloud instance from Nagios,
//! Icinga or Sensu through the [serverinfo
//! app](https://github.com/nextcloud/serverinfo), with thresholds written in
//! the standard Nagios range syntax and results that are strongly typed all
//! the way to the exit code.
//!
//! The library holds everything that doesn't need the network:
//!
//! * [`bytesize`]: turn `1.5GB` into bytes and bytes back into `1.50 GB`
//! * [`range`]: parse and evaluate Nagios range expressions (`10:`, `@1:5`)
//! * [`threshold`]: combine warning and critical ranges into a [`Status`]
//! * [`serverinfo`]: the JSON model of the serverinfo API
//! * [`metrics`]: look up named metrics in that model and check them
//! * [`report`]: render the plugin output line, including perf data
//!
//! The `check-nextcloud` binary wires those together with an HTTP client.
//! See the [`scripts`] module for its usage.

use std::fmt;
use std::process;

pub mod bytesize;
pub mod metrics;
pub mod range;
pub mod report;
pub mod scripts;
pub mod serverinfo;
pub mod threshold;

/// All possible exit statuses for a check
///
/// The variants are ordered by severity, so `max` picks the worst of two
/// statuses. Use `Status::exit` to terminate the process with the exit code
/// that monitoring systems expect.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    #![cfg_attr(test, allow(dead_code))]
    pub fn exit(self) -> ! {
        process::exit(self.code())
    }

    /// The process exit code for this status
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        write!(f, "{}", label)
    }
}
