//! Error type definitions for the scraper.
//!
//! Source failures are the only errors with domain structure; everything
//! else flows through `anyhow` at the orchestration boundary.

use thiserror::Error;

/// Failures observed while talking to a remote catalog source.
///
/// These never propagate out of the fetcher as errors; they are folded into
/// a typed per-attempt outcome that drives retry and source fallback.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request exceeded the configured per-request timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-success HTTP status other than 404
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Network-level failure (DNS, connection, TLS)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be parsed in the source's declared shape
    #[error("Parse error: {source_kind} - {message}")]
    Parse {
        source_kind: String,
        message: String,
    },
}

impl SourceError {
    pub fn parse_error<S: Into<String>, M: Into<String>>(source_kind: S, message: M) -> Self {
        Self::Parse {
            source_kind: source_kind.into(),
            message: message.into(),
        }
    }
}
