use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::deid::RemovedEntities;
use crate::models::entity::EntitySpan;
use crate::models::enums::RiskLevel;

/// A persisted processing record. Created once per successful `process` call
/// and immutable thereafter — the note store is an append-only history.
///
/// `encrypted_original` holds the base64 cipher envelope of the raw note;
/// the plaintext never reaches storage or logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub user_id: String,
    pub encrypted_original: String,
    pub note_hash: String,
    pub entities: Vec<EntitySpan>,
    pub risk_classification: RiskLevel,
    pub confidence_score: BTreeMap<String, f64>,
    pub processing_time_ms: f64,
    pub language_detected: String,
    pub removed_entities: RemovedEntities,
    /// RFC-3339 completion timestamp.
    pub processed_at: String,
}

/// Non-sensitive projection of a record for history queries. Carries neither
/// the cipher envelope nor the removed-entity values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: Uuid,
    pub note_hash: String,
    pub entities: Vec<EntitySpan>,
    pub risk_classification: RiskLevel,
    pub confidence_score: BTreeMap<String, f64>,
    pub language_detected: String,
    pub processed_at: String,
}

/// Response view returned to the caller after a successful `process` call.
/// Everything here is derived metadata; the original note is never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedNote {
    pub id: Uuid,
    pub entities: Vec<EntitySpan>,
    pub risk_classification: RiskLevel,
    pub confidence_score: BTreeMap<String, f64>,
    pub processing_time_ms: f64,
    pub language_detected: String,
    pub note_hash: String,
    pub masking_applied: bool,
    pub removed_entities: RemovedEntities,
    pub processed_at: String,
}

impl ProcessedNote {
    /// Build the caller view from a freshly persisted record.
    pub fn from_record(record: &NoteRecord, masking_applied: bool) -> Self {
        Self {
            id: record.id,
            entities: record.entities.clone(),
            risk_classification: record.risk_classification,
            confidence_score: record.confidence_score.clone(),
            processing_time_ms: record.processing_time_ms,
            language_detected: record.language_detected.clone(),
            note_hash: record.note_hash.clone(),
            masking_applied,
            removed_entities: record.removed_entities.clone(),
            processed_at: record.processed_at.clone(),
        }
    }
}
