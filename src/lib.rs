//! Veilnote — medical-note de-identification and processing.
//!
//! Raw notes are scanned for personal identifiers, masked, classified by an
//! external analysis engine, encrypted, and persisted with an append-only
//! audit trail. The plaintext note exists only inside one processing call;
//! storage, history, logs, and the caller-facing result carry derived
//! metadata and the cipher envelope only.

pub mod analysis;
pub mod audit;
pub mod config;
pub mod crypto;
pub mod db;
pub mod deid;
pub mod models;
pub mod stats;
pub mod workflow;

mod phi_audit;

use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Veilnote starting v{}", config::APP_VERSION);
}
