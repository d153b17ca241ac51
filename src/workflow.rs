//! Processing workflow: validate, audit, mask, analyze, encrypt, persist.
//!
//! Step order is load-bearing. Validation runs before any side effect, the
//! attempt audit entry is written before the pipeline starts and its failure
//! aborts the run, and only the masked text ever reaches the analysis engine
//! when masking is requested. The original note is encrypted for storage and
//! exists in plaintext only inside one `process` call.

use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::{AnalysisApi, AnalysisError};
use crate::audit::{
    self, AuditEvent, ACTION_ORIGINAL_VIEWED, ACTION_PROCESS_ATTEMPT, ACTION_PROCESS_COMPLETED,
    ACTION_PROCESS_FAILED,
};
use crate::config;
use crate::crypto::{CryptoError, NoteCipher};
use crate::db::{self, DatabaseError};
use crate::deid::{self, EntityDetector, RemovedEntities};
use crate::models::{NoteRecord, NoteSummary, ProcessedNote, RequestContext};
use crate::stats::{StatsCache, UserStatistics};

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Analysis unavailable: {0}")]
    AnalysisUnavailable(#[from] AnalysisError),

    #[error("Cipher failure: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Storage failure: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("Audit trail write failed: {0}")]
    Audit(String),
}

impl WorkflowError {
    /// Message safe to show an end user. Validation messages pass through;
    /// everything else collapses to a generic line so internals never leak.
    pub fn public_message(&self) -> String {
        match self {
            WorkflowError::Validation(msg) => msg.clone(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Pipeline stage the error belongs to, for audit payloads and logs.
    pub fn stage(&self) -> &'static str {
        match self {
            WorkflowError::Validation(_) => "validation",
            WorkflowError::AnalysisUnavailable(_) => "analysis",
            WorkflowError::Crypto(_) => "encryption",
            WorkflowError::Persistence(_) => "persistence",
            WorkflowError::Audit(_) => "audit",
        }
    }
}

/// The note-processing service. Owns the detector, the cipher, the analysis
/// client, and the statistics cache; database connections are supplied per
/// call so callers control connection scope and threading.
pub struct ProcessingWorkflow<A: AnalysisApi> {
    detector: EntityDetector,
    cipher: NoteCipher,
    analysis: A,
    stats: StatsCache,
}

impl<A: AnalysisApi> ProcessingWorkflow<A> {
    pub fn new(cipher: NoteCipher, analysis: A) -> Self {
        Self {
            detector: EntityDetector::new(),
            cipher,
            analysis,
            stats: StatsCache::with_default_ttl(),
        }
    }

    /// Process one note end to end. Returns the caller view of the persisted
    /// record; the raw note is never part of the return value.
    pub fn process(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        user_id: &str,
        note_text: &str,
        skip_masking: bool,
    ) -> Result<ProcessedNote, WorkflowError> {
        // No side effects before validation passes.
        validate_note(note_text)?;

        let note_chars = note_text.chars().count();
        tracing::debug!(user_id, note_chars, skip_masking, "processing note");

        // The attempt entry is mandatory: if the trail cannot record that
        // processing was tried, processing does not happen.
        let attempt = AuditEvent::now(
            ctx,
            ACTION_PROCESS_ATTEMPT,
            json!({ "user_id": user_id, "note_chars": note_chars, "skip_masking": skip_masking }),
        );
        audit::append_event(conn, &attempt).map_err(|e| WorkflowError::Audit(e.to_string()))?;

        match self.run_pipeline(conn, user_id, note_text, skip_masking) {
            Ok(record) => {
                self.stats.invalidate(user_id);

                let completed = AuditEvent::now(
                    ctx,
                    ACTION_PROCESS_COMPLETED,
                    json!({
                        "user_id": user_id,
                        "record_id": record.id.to_string(),
                        "note_hash": record.note_hash,
                        "risk_classification": record.risk_classification.as_str(),
                    }),
                );
                if let Err(e) = audit::append_event(conn, &completed) {
                    tracing::warn!(error = %e, "completion audit entry failed");
                }

                tracing::info!(
                    user_id,
                    record_id = %record.id,
                    risk = record.risk_classification.as_str(),
                    "note processed"
                );
                Ok(ProcessedNote::from_record(&record, !skip_masking))
            }
            Err(err) => {
                let failed = AuditEvent::now(
                    ctx,
                    ACTION_PROCESS_FAILED,
                    json!({ "user_id": user_id, "stage": err.stage() }),
                );
                if let Err(e) = audit::append_event(conn, &failed) {
                    tracing::warn!(error = %e, "failure audit entry failed");
                }

                tracing::warn!(user_id, stage = err.stage(), "note processing failed");
                Err(err)
            }
        }
    }

    fn run_pipeline(
        &self,
        conn: &Connection,
        user_id: &str,
        note_text: &str,
        skip_masking: bool,
    ) -> Result<NoteRecord, WorkflowError> {
        let (submitted_text, removed_entities) = if skip_masking {
            (note_text.to_string(), RemovedEntities::default())
        } else {
            let result = deid::mask(note_text, &self.detector.detect(note_text));
            (result.masked_text, result.removed_entities)
        };

        // Exactly one analysis call per note, on the text prepared above.
        let analysis = self.analysis.analyze(&submitted_text)?;

        let encrypted_original = self.cipher.encrypt_note(note_text)?;

        let record = NoteRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            encrypted_original,
            note_hash: analysis.note_hash,
            entities: analysis.entities,
            risk_classification: analysis.risk_classification,
            confidence_score: analysis.confidence_score,
            processing_time_ms: analysis.processing_time_ms,
            language_detected: analysis.language_detected,
            removed_entities,
            processed_at: Utc::now().to_rfc3339(),
        };

        db::insert_note(conn, &record)?;
        Ok(record)
    }

    /// Processing history for one user, newest first, capped.
    pub fn history(
        &self,
        conn: &Connection,
        user_id: &str,
    ) -> Result<Vec<NoteSummary>, WorkflowError> {
        Ok(db::fetch_history(conn, user_id, config::HISTORY_LIMIT)?)
    }

    /// Per-user statistics through the TTL cache.
    pub fn statistics(
        &self,
        conn: &Connection,
        user_id: &str,
    ) -> Result<UserStatistics, WorkflowError> {
        Ok(self.stats.fetch(conn, user_id)?)
    }

    /// Decrypt a stored original note. Access is itself audited, and the
    /// audit entry is mandatory: no trail entry, no plaintext.
    pub fn decrypt_original(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        record_id: &Uuid,
    ) -> Result<String, WorkflowError> {
        let record = db::fetch_note(conn, record_id)?.ok_or_else(|| {
            WorkflowError::Persistence(DatabaseError::NotFound {
                entity_type: "note".to_string(),
                id: record_id.to_string(),
            })
        })?;

        let viewed = AuditEvent::now(
            ctx,
            ACTION_ORIGINAL_VIEWED,
            json!({ "record_id": record_id.to_string(), "owner_id": record.user_id }),
        );
        audit::append_event(conn, &viewed).map_err(|e| WorkflowError::Audit(e.to_string()))?;

        Ok(self.cipher.decrypt_note(&record.encrypted_original)?)
    }
}

/// Length bounds, counted in characters. Runs before any side effect.
fn validate_note(note_text: &str) -> Result<(), WorkflowError> {
    let chars = note_text.chars().count();
    if chars < config::NOTE_MIN_CHARS || chars > config::NOTE_MAX_CHARS {
        return Err(WorkflowError::Validation(format!(
            "Note must be between {} and {} characters (got {chars})",
            config::NOTE_MIN_CHARS,
            config::NOTE_MAX_CHARS
        )));
    }
    Ok(())
}
