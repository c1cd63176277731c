//! The Nextcloud serverinfo API
//!
//! Every OCS response is wrapped in an envelope:
//!
//! ```json
//! {"ocs": {"meta": {"status": "ok", "statuscode": 200, "message": "OK"},
//!          "data": { ... }}}
//! ```
//!
//! `data` only has the serverinfo payload when `statuscode` is 200; errors
//! come back with `"data": []`. So the envelope is decoded first and the
//! payload only once the status code says it is there.
//!
//! The serverinfo app isn't consistent about types across versions (sizes
//! sometimes arrive as strings, `cpuload` is `false` on some platforms) so
//! numbers are read leniently and missing sections default to zero.

use std::collections::BTreeMap;
use std::fmt;

use derive_more::From;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::Status;

/// The OCS wrapper around every response
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub ocs: Ocs,
}

#[derive(Debug, Deserialize)]
pub struct Ocs {
    pub meta: Meta,
    #[serde(default)]
    pub data: Value,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Meta {
    pub status: String,
    pub statuscode: u16,
    #[serde(default)]
    pub message: Option<String>,
}

/// The API answered, but not with a 200
#[derive(Clone, Debug, PartialEq)]
pub struct UpstreamError {
    pub statuscode: u16,
    pub status: String,
    pub message: String,
}

impl UpstreamError {
    /// Client and server errors are critical, anything else is a warning
    pub fn status(&self) -> Status {
        if (400..600).contains(&self.statuscode) {
            Status::Critical
        } else {
            Status::Warning
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

#[derive(Debug, From)]
pub enum ApiError {
    /// The envelope carried a non-200 status code
    Upstream(UpstreamError),
    /// The status was fine but the payload isn't serverinfo data
    Payload(serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match *self {
            ApiError::Upstream(ref e) => e.status(),
            ApiError::Payload(_) => Status::Critical,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ApiError::Upstream(ref e) => write!(f, "{}", e),
            ApiError::Payload(ref e) => write!(f, "unexpected serverinfo data: {}", e),
        }
    }
}

impl Envelope {
    /// Check the OCS status and decode the payload
    pub fn into_server_info(self) -> Result<ServerInfo, ApiError> {
        let Ocs { meta, data } = self.ocs;
        if meta.statuscode != 200 {
            return Err(ApiError::Upstream(UpstreamError {
                statuscode: meta.statuscode,
                message: meta.message.unwrap_or_default(),
                status: meta.status,
            }));
        }
        Ok(serde_json::from_value(data)?)
    }
}

/// The `ocs.data` payload
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerInfo {
    pub nextcloud: Nextcloud,
    pub server: Server,
    #[serde(rename = "activeUsers")]
    pub active_users: ActiveUsers,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Nextcloud {
    pub system: System,
    pub storage: Storage,
    pub shares: Shares,
}

/// Memory and swap are in kB
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct System {
    pub version: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub freespace: u64,
    #[serde(deserialize_with = "lenient_loads")]
    pub cpuload: Vec<f64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub mem_total: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub mem_free: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub swap_total: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub swap_free: u64,
    /// Only present when requested with `skipApps=false`
    pub apps: Option<Apps>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Apps {
    #[serde(deserialize_with = "lenient_u64")]
    pub num_updates_available: u64,
    #[serde(deserialize_with = "lenient_app_updates")]
    pub app_updates: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Storage {
    #[serde(deserialize_with = "lenient_u64")]
    pub num_users: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub num_files: u64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Shares {
    #[serde(deserialize_with = "lenient_u64")]
    pub num_shares: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub num_shares_user: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub num_shares_groups: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub num_shares_link: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub num_fed_shares_sent: u64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Server {
    pub webserver: String,
    pub php: Php,
    pub database: Database,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Php {
    pub version: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Database {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub size: u64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActiveUsers {
    #[serde(rename = "last5minutes", deserialize_with = "lenient_u64")]
    pub last_5_minutes: u64,
    #[serde(rename = "last1hour", deserialize_with = "lenient_u64")]
    pub last_hour: u64,
    #[serde(rename = "last24hours", deserialize_with = "lenient_u64")]
    pub last_24_hours: u64,
}

fn value_to_u64(value: &Value) -> Option<u64> {
    match *value {
        Value::Number(ref n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(ref s) => s
            .trim()
            .parse::<u64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().map(|f| f.max(0.0) as u64)),
        _ => None,
    }
}

/// A count or size that may be a number, a numeric string or junk (zero)
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u64(&value).unwrap_or(0))
}

/// The load averages, or nothing if the platform doesn't report them
fn lenient_loads<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(loads) => loads
            .iter()
            .filter_map(|l| match *l {
                Value::Number(ref n) => n.as_f64(),
                Value::String(ref s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// `{"app": "version"}`, or `[]` when there is nothing to update
fn lenient_app_updates<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(apps) => apps
            .into_iter()
            .map(|(name, version)| {
                let version = match version {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, version)
            })
            .collect(),
        _ => BTreeMap::new(),
    })
}
