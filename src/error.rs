//! Error types shared across the crate

use thiserror::Error;

/// Error raised by a descriptor closure. Boxed so closures can use `?` on
/// whatever they call.
pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid locator `{expr}`: {reason}")]
    InvalidLocator { expr: String, reason: String },

    #[error("unsupported XPath construct `{construct}` in `{expr}`")]
    UnsupportedXPath { expr: String, construct: String },

    #[error("failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    #[error("filter failed for field \"{field}\": {message}")]
    Filter { field: String, message: String },

    #[error("invalid field map: {0}")]
    FieldMap(#[from] serde_json::Error),

    #[error("empty url")]
    EmptyUrl,

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
