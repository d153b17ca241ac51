pub mod client;
pub mod types;

pub use client::*;
pub use types::*;

use thiserror::Error;

/// Failures talking to the external analysis engine. The workflow never
/// fabricates a result on any of these; they all surface as
/// "analysis unavailable" to the caller.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Cannot reach analysis engine at {0}")]
    Connection(String),

    #[error("Analysis request timed out after {0}s")]
    Timeout(u64),

    #[error("Analysis engine returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse analysis response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    Transport(String),
}
