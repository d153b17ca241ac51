//! Pattern-based PII scanner.
//!
//! Each rule runs independently over the original text and emits its own
//! spans; no rule consumes another rule's output. Overlaps between rules are
//! expected and resolved later by the redactor. Matching is case-sensitive
//! except for the honorific alternation, which explicitly ignores case while
//! the name it introduces stays capitalized.

use regex::Regex;

use crate::models::EntitySpan;

pub const LABEL_CPF: &str = "PII_CPF";
pub const LABEL_SSN: &str = "PII_SSN";
pub const LABEL_EMAIL: &str = "PII_EMAIL";
pub const LABEL_PHONE: &str = "PII_PHONE";
pub const LABEL_NAME: &str = "PII_NAME";

/// Scanner with pre-compiled rules for identifiers, contact details, and
/// honorific-introduced names. Build once, reuse across calls: `detect` is
/// a pure function of the text.
pub struct EntityDetector {
    cpf: Regex,
    ssn: Regex,
    email: Regex,
    phone_br: Regex,
    phone_us: Regex,
    honorific_name: Regex,
}

impl EntityDetector {
    pub fn new() -> Self {
        Self {
            // Brazilian CPF, dotted or bare: 123.456.789-00 / 12345678900
            cpf: Regex::new(r"\d{3}\.?\d{3}\.?\d{3}-?\d{2}").expect("valid CPF pattern"),
            // US SSN, dashed or bare: 123-45-6789 / 123456789
            ssn: Regex::new(r"\d{3}-?\d{2}-?\d{4}").expect("valid SSN pattern"),
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .expect("valid email pattern"),
            // Brazilian phone with optional area code: (11) 98765-4321
            phone_br: Regex::new(r"(?:\(?\d{2}\)?\s?)?\d{4,5}-?\d{4}")
                .expect("valid BR phone pattern"),
            // US phone: (555) 123-4567, 555.123.4567, 555 123 4567
            phone_us: Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
                .expect("valid US phone pattern"),
            // Honorific (case-insensitive) followed by two capitalized words;
            // the span covers only the captured name, so redaction preserves
            // the honorific text verbatim.
            honorific_name: Regex::new(
                r"(?i:paciente|patient|sra\.|sr\.|dra\.|dr\.)\s+([A-ZÁÀÂÃÉÊÍÓÔÕÚÇ][a-záàâãéêíóôõúç]+\s+[A-ZÁÀÂÃÉÊÍÓÔÕÚÇ][a-záàâãéêíóôõúç]+)",
            )
            .expect("valid honorific pattern"),
        }
    }

    /// Scan `text` and return every candidate PII span. Never fails; absence
    /// of matches is an empty vec, not an error.
    pub fn detect(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();

        for m in self.cpf.find_iter(text) {
            spans.push(EntitySpan::new(m.start(), m.end(), LABEL_CPF));
        }
        for m in self.ssn.find_iter(text) {
            spans.push(EntitySpan::new(m.start(), m.end(), LABEL_SSN));
        }
        for m in self.email.find_iter(text) {
            spans.push(EntitySpan::new(m.start(), m.end(), LABEL_EMAIL));
        }
        for m in self.phone_br.find_iter(text) {
            spans.push(EntitySpan::new(m.start(), m.end(), LABEL_PHONE));
        }
        for m in self.phone_us.find_iter(text) {
            spans.push(EntitySpan::new(m.start(), m.end(), LABEL_PHONE));
        }
        for caps in self.honorific_name.captures_iter(text) {
            if let Some(name) = caps.get(1) {
                spans.push(EntitySpan::new(name.start(), name.end(), LABEL_NAME));
            }
        }

        spans
    }
}

impl Default for EntityDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Vec<EntitySpan> {
        EntityDetector::new().detect(text)
    }

    fn labels_at(spans: &[EntitySpan], label: &str) -> usize {
        spans.iter().filter(|s| s.label == label).count()
    }

    #[test]
    fn finds_dotted_cpf() {
        let spans = detect("CPF do paciente: 123.456.789-00, internado ontem");
        assert_eq!(labels_at(&spans, LABEL_CPF), 1);
        let cpf = spans.iter().find(|s| s.label == LABEL_CPF).unwrap();
        assert_eq!(
            &"CPF do paciente: 123.456.789-00, internado ontem"[cpf.start..cpf.end],
            "123.456.789-00"
        );
    }

    #[test]
    fn finds_bare_cpf_digits() {
        let spans = detect("documento 12345678900 anexado");
        assert_eq!(labels_at(&spans, LABEL_CPF), 1);
    }

    #[test]
    fn finds_dashed_ssn() {
        let spans = detect("patient SSN 123-45-6789 on file");
        assert_eq!(labels_at(&spans, LABEL_SSN), 1);
    }

    #[test]
    fn finds_email_address() {
        let text = "contato: maria.souza+hc@clinic-mail.org, retorno em 7 dias";
        let spans = detect(text);
        assert_eq!(labels_at(&spans, LABEL_EMAIL), 1);
        let email = spans.iter().find(|s| s.label == LABEL_EMAIL).unwrap();
        assert_eq!(&text[email.start..email.end], "maria.souza+hc@clinic-mail.org");
    }

    #[test]
    fn finds_brazilian_phone_with_area_code() {
        let spans = detect("telefone (11) 98765-4321 para contato");
        assert!(labels_at(&spans, LABEL_PHONE) >= 1);
    }

    #[test]
    fn finds_us_phone_formats() {
        let spans = detect("call (555) 123-4567 or 555.987.6543 after discharge");
        assert!(labels_at(&spans, LABEL_PHONE) >= 2);
    }

    #[test]
    fn finds_honorific_name_span_excluding_honorific() {
        let text = "Paciente João Silva apresenta febre alta";
        let spans = detect(text);
        let name = spans.iter().find(|s| s.label == LABEL_NAME).unwrap();
        assert_eq!(&text[name.start..name.end], "João Silva");
    }

    #[test]
    fn honorific_alternation_ignores_case() {
        let text = "PACIENTE Maria Souza em observação";
        let spans = detect(text);
        assert_eq!(labels_at(&spans, LABEL_NAME), 1);
    }

    #[test]
    fn lowercase_name_after_honorific_not_matched() {
        // The name part stays case-sensitive: two capitalized words required.
        let spans = detect("paciente joão silva apresenta febre");
        assert_eq!(labels_at(&spans, LABEL_NAME), 0);
    }

    #[test]
    fn doctor_honorific_matches() {
        let text = "Encaminhado pela Dra. Ana Costa para avaliação";
        let spans = detect(text);
        let name = spans.iter().find(|s| s.label == LABEL_NAME).unwrap();
        assert_eq!(&text[name.start..name.end], "Ana Costa");
    }

    #[test]
    fn clean_text_yields_no_spans() {
        let spans = detect("Febre e tosse há três dias, sem outros sintomas relevantes.");
        assert!(spans.is_empty());
    }

    #[test]
    fn rules_emit_overlapping_spans_independently() {
        // A bare 11-digit CPF also contains a 9-digit SSN-shaped run; both
        // rules fire and the redactor resolves the overlap.
        let spans = detect("id 12345678900 cadastrado");
        assert!(labels_at(&spans, LABEL_CPF) >= 1);
        assert!(labels_at(&spans, LABEL_SSN) >= 1);
    }

    #[test]
    fn empty_input_is_not_an_error() {
        assert!(detect("").is_empty());
    }
}
