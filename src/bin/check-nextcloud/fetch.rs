//! Talk to the serverinfo API
//!
//! One blocking GET per run, no retries. Everything that goes wrong before
//! we have an OCS envelope in hand is a `FetchError`.

use std::fmt;

use derive_more::From;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use url::Url;

use nextcloud_plugins::serverinfo::Envelope;
use nextcloud_plugins::Status;

use crate::args::{Auth, Config};

#[derive(Debug, From)]
pub(crate) enum FetchError {
    Url(url::ParseError),
    Http(reqwest::Error),
    /// The server answered with nothing at all
    #[from(ignore)]
    Empty,
    Json(serde_json::Error),
}

impl FetchError {
    /// Not being able to ask is as bad as a bad answer
    pub fn status(&self) -> Status {
        Status::Critical
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FetchError::Url(ref e) => write!(f, "invalid serverinfo url: {}", e),
            FetchError::Http(ref e) => write!(f, "unable to reach Nextcloud API: {}", e),
            FetchError::Empty => write!(f, "empty response from Nextcloud API"),
            FetchError::Json(ref e) => write!(f, "Nextcloud API returned invalid json: {}", e),
        }
    }
}

/// The full url to query, without credentials
pub(crate) fn request_url(config: &Config) -> Result<Url, FetchError> {
    let scheme = if config.ssl { "https" } else { "http" };
    let mut url = Url::parse(&format!("{}://{}{}", scheme, config.host, config.uri))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("format", "json");
        if config.include_apps {
            query
                .append_pair("skipApps", "false")
                .append_pair("skipUpdate", "false");
        }
    }
    Ok(url)
}

/// Fetch and decode the OCS envelope
///
/// The connection is released when the response is dropped, whichever way
/// this returns.
pub(crate) fn fetch(config: &Config) -> Result<Envelope, FetchError> {
    let url = request_url(config)?;
    debug!("querying {}", url);

    let client = Client::builder()
        .user_agent(concat!("check-nextcloud/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let request = client
        .get(url)
        .header("OCS-APIRequest", "true")
        .header(ACCEPT, "application/json");
    let request = match config.auth {
        Auth::Token(ref token) => request.header("NC-Token", token.as_str()),
        Auth::Basic {
            ref user,
            ref password,
        } => request.basic_auth(user, Some(password)),
        Auth::Anonymous => request,
    };

    let response = request.send()?;
    info!("Nextcloud answered with HTTP {}", response.status());
    let body = response.text()?;
    if body.trim().is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(serde_json::from_str(&body)?)
}
