//! Typed errors for the scraping pipeline.
//!
//! Fetch and hierarchy errors abort the run. Extraction errors are scoped to a
//! single leaf page and only cause that unit to be skipped.

use thiserror::Error;

/// Failure to retrieve a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, TLS, timeout, connection reset)
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// A CSS selector built by the parser did not parse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid CSS selector '{css}': {reason}")]
pub struct SelectorError {
    pub css: String,
    pub reason: String,
}

/// A required field could not be read from an otherwise valid leaf page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("field {field} is not a count: {raw:?}")]
    InvalidCount { field: &'static str, raw: String },
}

/// Failure while resolving the page hierarchy. Always fatal.
#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("no units found on {url}")]
    NoUnits { url: String },

    #[error("listing page {url} has no result links")]
    EmptyListing { url: String },

    #[error("cannot resolve link {href:?}: {source}")]
    InvalidLink {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// Bad command-line input, reported before any network activity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid URL {0:?}, please provide a valid URL")]
    InvalidUrl(String),

    #[error("unsupported URL scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("invalid filename {0:?}, output filename must end with .csv")]
    InvalidFilename(String),
}
