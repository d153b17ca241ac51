//! De-identification engine: span-based PII detection and redaction.
//!
//! Detection and redaction are separate, composable steps. The workflow
//! either runs the pattern scanner over a raw note or accepts externally
//! supplied spans from the classifier; both feed the same redactor.

pub mod detector;
pub mod redactor;
pub mod types;

pub use detector::*;
pub use redactor::*;
pub use types::*;
