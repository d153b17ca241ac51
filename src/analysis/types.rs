use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{EntitySpan, RiskLevel};

/// Normalized result of one classifier call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub entities: Vec<EntitySpan>,
    pub risk_classification: RiskLevel,
    /// Per-label confidence in [0, 1].
    pub confidence_score: BTreeMap<String, f64>,
    pub processing_time_ms: f64,
    pub language_detected: String,
    pub note_hash: String,
}

impl AnalysisResult {
    /// Minimal result for a text the engine had nothing to say about.
    pub fn empty_for(text: &str) -> Self {
        Self {
            entities: Vec::new(),
            risk_classification: RiskLevel::Unknown,
            confidence_score: BTreeMap::new(),
            processing_time_ms: 0.0,
            language_detected: "unknown".into(),
            note_hash: note_digest(text),
        }
    }
}

/// Tracking hash for a note: first 16 hex chars of SHA-256. Used when the
/// engine omits its own hash.
pub fn note_digest(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..16].to_string()
}
