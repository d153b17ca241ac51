use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::{EntitySpan, RiskLevel};

use super::types::{note_digest, AnalysisResult};
use super::AnalysisError;

/// External classifier boundary. Exactly one call per processed note; only
/// masked text ever crosses this interface when masking was requested.
pub trait AnalysisApi {
    fn analyze(&self, masked_text: &str) -> Result<AnalysisResult, AnalysisError>;
}

/// HTTP client for the analysis engine.
pub struct HttpAnalysisClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpAnalysisClient {
    /// Create a new client with a bounded per-request timeout.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default engine instance with the standard timeout.
    pub fn default_local() -> Self {
        Self::new(config::DEFAULT_ENGINE_URL, config::ANALYSIS_TIMEOUT_SECS)
    }
}

/// Request body for the engine's /api/v1/process endpoint. `skip_masking`
/// is always true here: de-identification already happened on our side.
#[derive(Serialize)]
struct ProcessRequest<'a> {
    medical_note: &'a str,
    skip_masking: bool,
}

/// Engine response envelope: `{ "status": ..., "data": {...} }`.
#[derive(Deserialize)]
struct ProcessEnvelope {
    data: ProcessData,
}

/// Engine payload. Every field is optional on the wire; normalization fills
/// the gaps so callers always see a complete result.
#[derive(Deserialize)]
struct ProcessData {
    #[serde(default)]
    entities: Vec<EntitySpan>,
    #[serde(default)]
    risk_classification: Option<String>,
    #[serde(default)]
    confidence_score: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    processing_time_ms: Option<f64>,
    #[serde(default)]
    language_detected: Option<String>,
    #[serde(default)]
    note_hash: Option<String>,
}

impl ProcessData {
    /// Normalize the wire payload: unrecognized risk strings degrade to
    /// `Unknown`, a missing hash falls back to our own digest of the
    /// submitted text, negative timings clamp to zero.
    fn normalize(self, submitted_text: &str) -> AnalysisResult {
        AnalysisResult {
            entities: self.entities,
            risk_classification: self
                .risk_classification
                .as_deref()
                .map(RiskLevel::normalize)
                .unwrap_or(RiskLevel::Unknown),
            confidence_score: self.confidence_score.unwrap_or_default(),
            processing_time_ms: self.processing_time_ms.unwrap_or(0.0).max(0.0),
            language_detected: self
                .language_detected
                .unwrap_or_else(|| "unknown".to_string()),
            note_hash: self
                .note_hash
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| note_digest(submitted_text)),
        }
    }
}

impl AnalysisApi for HttpAnalysisClient {
    fn analyze(&self, masked_text: &str) -> Result<AnalysisResult, AnalysisError> {
        let url = format!("{}/api/v1/process", self.base_url);
        let body = ProcessRequest {
            medical_note: masked_text,
            skip_masking: true,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AnalysisError::Connection(self.base_url.clone())
            } else {
                AnalysisError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ProcessEnvelope = response
            .json()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        Ok(parsed.data.normalize(masked_text))
    }
}

/// Mock classifier for tests — configurable outcome, records every text it
/// receives so tests can assert what crossed the boundary.
pub struct MockAnalysisClient {
    outcome: Option<AnalysisResult>,
    received: Mutex<Vec<String>>,
}

impl MockAnalysisClient {
    /// Mock that succeeds with the given result (note_hash recomputed per
    /// submitted text, like the real engine).
    pub fn succeeding(result: AnalysisResult) -> Self {
        Self {
            outcome: Some(result),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Mock that fails every call with a timeout.
    pub fn failing() -> Self {
        Self {
            outcome: None,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Every text submitted so far, in call order.
    pub fn received_texts(&self) -> Vec<String> {
        self.received
            .lock()
            .map(|texts| texts.clone())
            .unwrap_or_default()
    }
}

impl AnalysisApi for MockAnalysisClient {
    fn analyze(&self, masked_text: &str) -> Result<AnalysisResult, AnalysisError> {
        if let Ok(mut texts) = self.received.lock() {
            texts.push(masked_text.to_string());
        }
        match &self.outcome {
            Some(result) => {
                let mut result = result.clone();
                result.note_hash = note_digest(masked_text);
                Ok(result)
            }
            None => Err(AnalysisError::Timeout(config::ANALYSIS_TIMEOUT_SECS)),
        }
    }
}
