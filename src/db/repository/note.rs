use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{NoteRecord, NoteSummary, RiskLevel};

/// Persist a freshly processed note record. Insert-only: records are never
/// updated after this point.
pub fn insert_note(conn: &Connection, record: &NoteRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medical_notes (id, user_id, encrypted_original, note_hash,
         entities, risk_classification, confidence_score, processing_time_ms,
         language_detected, removed_entities, processed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id.to_string(),
            record.user_id,
            record.encrypted_original,
            record.note_hash,
            serde_json::to_string(&record.entities)?,
            record.risk_classification.as_str(),
            serde_json::to_string(&record.confidence_score)?,
            record.processing_time_ms,
            record.language_detected,
            serde_json::to_string(&record.removed_entities)?,
            record.processed_at,
        ],
    )?;
    Ok(())
}

/// Fetch a full record by id, including the cipher envelope. Callers decide
/// whether exposing the envelope downstream is appropriate.
pub fn fetch_note(conn: &Connection, id: &Uuid) -> Result<Option<NoteRecord>, DatabaseError> {
    type Row = (
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        f64,
        String,
        String,
        String,
    );

    let row: Option<Row> = conn
        .query_row(
            "SELECT id, user_id, encrypted_original, note_hash, entities,
                    risk_classification, confidence_score, processing_time_ms,
                    language_detected, removed_entities, processed_at
             FROM medical_notes WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                    row.get(10)?,
                ))
            },
        )
        .optional()?;

    let Some((
        id_str,
        user_id,
        encrypted_original,
        note_hash,
        entities,
        risk,
        confidence,
        processing_time_ms,
        language_detected,
        removed,
        processed_at,
    )) = row
    else {
        return Ok(None);
    };

    Ok(Some(NoteRecord {
        id: Uuid::parse_str(&id_str).map_err(|_| DatabaseError::InvalidId(id_str))?,
        user_id,
        encrypted_original,
        note_hash,
        entities: serde_json::from_str(&entities)?,
        risk_classification: RiskLevel::from_str(&risk)?,
        confidence_score: serde_json::from_str(&confidence)?,
        processing_time_ms,
        language_detected,
        removed_entities: serde_json::from_str(&removed)?,
        processed_at,
    }))
}

/// Processing history for one user: non-sensitive fields only, newest first,
/// capped at `limit`.
pub fn fetch_history(
    conn: &Connection,
    user_id: &str,
    limit: usize,
) -> Result<Vec<NoteSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, note_hash, entities, risk_classification, confidence_score,
                language_detected, processed_at
         FROM medical_notes
         WHERE user_id = ?1
         ORDER BY processed_at DESC
         LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(params![user_id, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut summaries = Vec::with_capacity(rows.len());
    for (id_str, note_hash, entities, risk, confidence, language, processed_at) in rows {
        summaries.push(NoteSummary {
            id: Uuid::parse_str(&id_str).map_err(|_| DatabaseError::InvalidId(id_str))?,
            note_hash,
            entities: serde_json::from_str(&entities)?,
            risk_classification: RiskLevel::from_str(&risk)?,
            confidence_score: serde_json::from_str(&confidence)?,
            language_detected: language,
            processed_at,
        });
    }
    Ok(summaries)
}

/// Number of persisted records for one user.
pub fn count_notes(conn: &Connection, user_id: &str) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM medical_notes WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
