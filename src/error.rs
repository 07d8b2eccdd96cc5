//! Error kinds raised along the retrieval pipeline.
//!
//! Only [`RetrievalError`] ever reaches the caller of a retrieval. The other
//! kinds are absorbed where they happen:
//!
//! | Error | Raised by | Effect |
//! |-------|-----------|--------|
//! | [`NavigationError`] | browser session | fatal during open/search/sort, otherwise stops the page loop |
//! | [`NavigationError::FilterNotFound`] | section filter | logged, retrieval continues unfiltered |
//! | [`FetchError`] | image download | logged, `"image not found"` substituted |
//! | [`ItemExtractionError`] | one promo element | logged, the item is skipped |

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure while driving the browser session.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("control `{control}` not found within {waited:?}")]
    ControlNotFound {
        control: &'static str,
        waited: Duration,
    },
    #[error("option `{option}` is not offered by the sort control")]
    OptionNotFound { option: String },
    #[error("no section filter labelled `{label}`")]
    FilterNotFound { label: String },
    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { what: &'static str, waited: Duration },
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("browser error: {0}")]
    Browser(String),
}

/// Failure while downloading an article image.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A promo element that cannot be turned into a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemExtractionError {
    #[error("promo element has no {0}")]
    MissingField(&'static str),
    #[error("unparseable timestamp `{0}`")]
    BadTimestamp(String),
}

/// Failure that aborts a whole retrieval before any page is read.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid search parameters: {0}")]
    InvalidParameters(String),
    #[error("could not open browser session: {0}")]
    SessionOpen(#[source] NavigationError),
    #[error("search navigation failed: {0}")]
    Navigation(#[source] NavigationError),
}

/// Failure while loading configuration or the work-item payload.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}
