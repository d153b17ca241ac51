use serde::{Deserialize, Serialize};

/// PII values stripped from a note, grouped by category. Each vector keeps
/// first-seen document order and never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedEntities {
    #[serde(default)]
    pub cpfs: Vec<String>,
    #[serde(default)]
    pub ssns: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
}

impl RemovedEntities {
    /// File a removed value under the bucket for its label. Labels without a
    /// bucket (informational or foreign PII labels) are dropped silently.
    pub fn record(&mut self, label: &str, value: &str) {
        let bucket = match label {
            super::LABEL_CPF => &mut self.cpfs,
            super::LABEL_SSN => &mut self.ssns,
            super::LABEL_EMAIL => &mut self.emails,
            super::LABEL_PHONE => &mut self.phones,
            super::LABEL_NAME => &mut self.names,
            _ => return,
        };
        if !bucket.iter().any(|v| v == value) {
            bucket.push(value.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpfs.is_empty()
            && self.ssns.is_empty()
            && self.emails.is_empty()
            && self.phones.is_empty()
            && self.names.is_empty()
    }

    /// Total number of distinct removed values across all categories.
    pub fn total(&self) -> usize {
        self.cpfs.len()
            + self.ssns.len()
            + self.emails.len()
            + self.phones.len()
            + self.names.len()
    }
}

/// Outcome of one masking pass. Deterministic given the same (text, spans);
/// lengths are counted in characters.
#[derive(Debug, Clone, Serialize)]
pub struct MaskingResult {
    pub masked_text: String,
    pub removed_entities: RemovedEntities,
    pub original_length: usize,
    pub masked_length: usize,
}
