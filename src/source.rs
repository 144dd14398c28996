use crate::config::Config;
use crate::dataset::HistoricalReport;
use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

const USER_MESSAGE: &str = "Failed to load report data";

/// The only failures that leave the aggregation boundary.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Transport failure reaching the document.
    #[error("failed to fetch report document from {location}: {message}")]
    Fetch { location: String, message: String },

    /// The server answered with a non-success status.
    #[error("report document request to {location} returned HTTP {status}")]
    Status { location: String, status: u16 },

    /// The body is not a report document.
    #[error("report document from {location} is malformed: {source}")]
    Malformed {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } | Self::Status { .. } => "fetch_failure",
            Self::Malformed { .. } => "malformed_input",
        }
    }

    /// Both kinds read the same to users; `kind()` keeps them apart in logs.
    pub fn user_message(&self) -> &'static str {
        USER_MESSAGE
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Location {
    Remote(Url),
    Local(PathBuf),
}

fn locate(raw: &str) -> Location {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Location::Remote(url),
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(Location::Local)
            .unwrap_or_else(|_| Location::Local(PathBuf::from(raw.trim()))),
        _ => Location::Local(PathBuf::from(raw.trim())),
    }
}

/// Fetches and parses the configured document. No retry, no backoff; callers
/// surface a failure and let the user retry.
pub fn load_document(config: &Config) -> Result<HistoricalReport, LoadError> {
    let location = config.data_url.trim().to_string();

    let result = match locate(&location) {
        Location::Remote(url) => fetch_remote(url, config.fetch_timeout_seconds),
        Location::Local(path) => fs::read_to_string(&path).map_err(|error| LoadError::Fetch {
            location: location.clone(),
            message: error.to_string(),
        }),
    }
    .and_then(|body| parse_document(&location, &body));

    match &result {
        Ok(report) => info!(
            location = %location,
            rows = report.row_count(),
            weekly_rows = report.weekly_summary.len(),
            "report document loaded"
        ),
        Err(error) => error!(kind = error.kind(), error = %error, "report document load failed"),
    }

    result
}

pub fn parse_document(location: &str, body: &str) -> Result<HistoricalReport, LoadError> {
    serde_json::from_str(body).map_err(|source| LoadError::Malformed {
        location: location.to_string(),
        source,
    })
}

fn fetch_remote(url: Url, timeout_seconds: u64) -> Result<String, LoadError> {
    let location = url.to_string();

    // reqwest's blocking client must not run on an async runtime thread.
    std::thread::spawn(move || fetch_remote_blocking(url, timeout_seconds))
        .join()
        .map_err(|_| LoadError::Fetch {
            location,
            message: "fetch worker thread panicked".to_string(),
        })?
}

fn fetch_remote_blocking(url: Url, timeout_seconds: u64) -> Result<String, LoadError> {
    let location = url.to_string();
    let fetch_error = |error: reqwest::Error| LoadError::Fetch {
        location: location.clone(),
        message: error.to_string(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    let timeout = (timeout_seconds > 0).then(|| Duration::from_secs(timeout_seconds));
    let client = Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(fetch_error)?;

    let response = client.get(url).send().map_err(fetch_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            location: location.clone(),
            status: status.as_u16(),
        });
    }

    response.text().map_err(fetch_error)
}
