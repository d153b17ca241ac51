//! Span redactor: replaces PII spans with fixed tokens.
//!
//! The replacement pass runs in descending start order so earlier offsets
//! stay valid without remapping. Overlapping spans are resolved first: the
//! larger span wins and the contained one is dropped; equal-length overlaps
//! keep the span emitted first.

use crate::models::EntitySpan;

use super::detector::{LABEL_CPF, LABEL_EMAIL, LABEL_NAME, LABEL_PHONE, LABEL_SSN};
use super::types::{MaskingResult, RemovedEntities};

/// Fixed replacement token for a PII label. No length preservation: tokens
/// are chosen so no pattern rule re-matches them, which keeps redaction
/// idempotent.
pub fn redaction_token(label: &str) -> &'static str {
    match label {
        LABEL_CPF => "[CPF]",
        LABEL_SSN => "[SSN]",
        LABEL_EMAIL => "[EMAIL]",
        LABEL_PHONE => "[PHONE]",
        LABEL_NAME => "[PATIENT_NAME]",
        _ => "[REDACTED]",
    }
}

/// Keep only spans that mark PII and can safely index `text`, then resolve
/// overlaps. Returns the surviving spans sorted ascending by start.
fn redactable_spans(text: &str, spans: &[EntitySpan]) -> Vec<EntitySpan> {
    let candidates: Vec<EntitySpan> = spans
        .iter()
        .filter(|s| s.is_pii() && s.is_valid_for(text))
        .cloned()
        .collect();
    resolve_overlaps(candidates)
}

/// Overlap policy: larger span wins, contained span dropped. Sort is stable,
/// so equal-length overlapping spans keep emission order.
pub fn resolve_overlaps(mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    spans.sort_by(|a, b| b.len().cmp(&a.len()).then(a.start.cmp(&b.start)));

    let mut kept: Vec<EntitySpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if !kept.iter().any(|k| k.overlaps(&span)) {
            kept.push(span);
        }
    }
    kept.sort_by_key(|s| s.start);
    kept
}

/// Replace every PII span in `text` with its redaction token. Informational
/// spans and invalid spans are left untouched. Pure function of (text, spans).
pub fn redact_spans(text: &str, spans: &[EntitySpan]) -> String {
    let ordered = redactable_spans(text, spans);

    let mut masked = text.to_string();
    // Descending start order keeps remaining offsets valid.
    for span in ordered.iter().rev() {
        masked.replace_range(span.start..span.end, redaction_token(&span.label));
    }
    masked
}

/// Redact and report: same pass as [`redact_spans`], additionally collecting
/// the removed values per category in document order, deduplicated.
pub fn mask(text: &str, spans: &[EntitySpan]) -> MaskingResult {
    let ordered = redactable_spans(text, spans);

    let mut removed = RemovedEntities::default();
    for span in &ordered {
        removed.record(&span.label, &text[span.start..span.end]);
    }

    let mut masked = text.to_string();
    for span in ordered.iter().rev() {
        masked.replace_range(span.start..span.end, redaction_token(&span.label));
    }

    MaskingResult {
        original_length: text.chars().count(),
        masked_length: masked.chars().count(),
        masked_text: masked,
        removed_entities: removed,
    }
}
