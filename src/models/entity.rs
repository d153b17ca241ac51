use serde::{Deserialize, Serialize};

/// Labels carrying this prefix mark a span for redaction; any other label is
/// informational and left untouched by the redactor.
pub const PII_LABEL_PREFIX: &str = "PII_";

/// A labeled half-open byte range `[start, end)` within a note.
///
/// Offsets are byte offsets into the UTF-8 text, as produced by the pattern
/// scanner and by the external classifier. Spans arriving from outside the
/// crate are treated as untrusted: the redactor skips any span that is empty,
/// out of range, or not aligned to character boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Whether this span is a redaction target.
    pub fn is_pii(&self) -> bool {
        self.label.starts_with(PII_LABEL_PREFIX)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether this span can safely index `text`.
    pub fn is_valid_for(&self, text: &str) -> bool {
        !self.is_empty()
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }

    /// Whether two spans share at least one byte.
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pii_prefix_marks_redaction_targets() {
        assert!(EntitySpan::new(0, 3, "PII_EMAIL").is_pii());
        assert!(!EntitySpan::new(0, 3, "MEDICATION").is_pii());
    }

    #[test]
    fn validity_rejects_empty_and_out_of_range() {
        let text = "short text";
        assert!(!EntitySpan::new(3, 3, "PII_CPF").is_valid_for(text));
        assert!(!EntitySpan::new(5, 2, "PII_CPF").is_valid_for(text));
        assert!(!EntitySpan::new(0, 100, "PII_CPF").is_valid_for(text));
        assert!(EntitySpan::new(0, 5, "PII_CPF").is_valid_for(text));
    }

    #[test]
    fn validity_rejects_mid_char_offsets() {
        let text = "João Silva"; // 'ã' is two bytes, starting at offset 2
        assert!(!EntitySpan::new(0, 3, "PII_NAME").is_valid_for(text));
        assert!(EntitySpan::new(0, 4, "PII_NAME").is_valid_for(text));
    }

    #[test]
    fn overlap_detection() {
        let a = EntitySpan::new(0, 5, "PII_CPF");
        let b = EntitySpan::new(4, 8, "PII_PHONE");
        let c = EntitySpan::new(5, 8, "PII_PHONE");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn deserializes_classifier_wire_format() {
        // The engine also sends the matched text; unknown fields are ignored.
        let json = r#"{"text": "fever", "label": "SYMPTOM", "start": 10, "end": 15}"#;
        let span: EntitySpan = serde_json::from_str(json).unwrap();
        assert_eq!(span.label, "SYMPTOM");
        assert_eq!(span.len(), 5);
    }
}
