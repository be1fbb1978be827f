use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use summa_core::{ClassifiedAmount, Currency, DetectorConfig, DigitCorrections, ValidationReport};

use crate::classify::Classifier;
use crate::extract::{ExtractInput, TokenExtractor};
use crate::normalize::Normalizer;

pub const NO_AMOUNTS_REASON: &str = "document too noisy or contains no numeric amounts";
pub const NORMALIZATION_FAILED_REASON: &str =
    "extracted tokens could not be parsed into numeric amounts";

/// Stage confidences and counters for a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMetadata {
    pub extraction_confidence: f32,
    pub normalization_confidence: f32,
    pub classification_confidence: f32,
    pub total_tokens_extracted: usize,
    pub amounts_normalized: usize,
    pub amounts_classified: usize,
}

/// Terminal result of one pipeline run. Guardrail outcomes are ordinary
/// values carrying whatever partial context the stages produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Ok {
        currency: Currency,
        amounts: Vec<ClassifiedAmount>,
        validation: ValidationReport,
        metadata: PipelineMetadata,
    },
    NoAmountsFound {
        reason: String,
        extracted_text: String,
    },
    NormalizationFailed {
        reason: String,
        raw_tokens: Vec<String>,
        extracted_text: String,
    },
}

/// Sequences extraction → normalization → classification over one input.
/// Stateless across runs; safe to share between requests.
pub struct AmountPipeline {
    extractor: TokenExtractor,
    normalizer: Normalizer,
    classifier: Classifier,
}

impl AmountPipeline {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            extractor: TokenExtractor::new(config, DigitCorrections::standard()),
            normalizer: Normalizer::new(config, DigitCorrections::standard()),
            classifier: Classifier::new(config, DigitCorrections::standard()),
        }
    }

    pub fn run(&self, input: &ExtractInput) -> PipelineOutcome {
        let extraction = self.extractor.extract(input);
        tracing::debug!(
            tokens = extraction.raw_tokens.len(),
            confidence = extraction.confidence,
            "extraction complete"
        );

        if extraction.raw_tokens.is_empty() {
            return PipelineOutcome::NoAmountsFound {
                reason: NO_AMOUNTS_REASON.to_string(),
                extracted_text: extraction.extracted_text,
            };
        }

        let normalization = self.normalizer.normalize(&extraction.raw_tokens);
        tracing::debug!(
            amounts = normalization.amounts.len(),
            confidence = normalization.confidence,
            "normalization complete"
        );

        if normalization.amounts.is_empty() {
            return PipelineOutcome::NormalizationFailed {
                reason: NORMALIZATION_FAILED_REASON.to_string(),
                raw_tokens: extraction.raw_tokens,
                extracted_text: extraction.extracted_text,
            };
        }

        // Classification reads the full extracted text so provenance snippets
        // reflect the scanned layout, not the caller's raw input.
        let values: Vec<Decimal> = normalization.amounts.iter().map(|a| a.value).collect();
        let classification = self.classifier.classify(&extraction.extracted_text, &values);
        let validation = self.classifier.validate(&classification.amounts);
        tracing::debug!(
            classified = classification.amounts.len(),
            confidence = classification.confidence,
            valid = validation.valid,
            "classification complete"
        );

        PipelineOutcome::Ok {
            currency: extraction.currency_hint.unwrap_or(Currency::Usd),
            metadata: PipelineMetadata {
                extraction_confidence: extraction.confidence,
                normalization_confidence: normalization.confidence,
                classification_confidence: classification.confidence,
                total_tokens_extracted: extraction.raw_tokens.len(),
                amounts_normalized: values.len(),
                amounts_classified: classification.amounts.len(),
            },
            amounts: classification.amounts,
            validation,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use summa_core::AmountType;

    fn pipeline() -> AmountPipeline {
        AmountPipeline::new(&DetectorConfig::default())
    }

    fn text_input(text: &str) -> ExtractInput<'_> {
        ExtractInput { text: Some(text), ocr_text: None, ocr_confidence: None }
    }

    #[test]
    fn full_run_classifies_a_simple_bill() {
        let outcome = pipeline().run(&text_input(
            "City Hospital\nRs Total: 2000\nPaid: 1500\nDue: 500\nThank you",
        ));
        let PipelineOutcome::Ok { currency, amounts, validation, metadata } = outcome else {
            panic!("expected ok outcome");
        };
        assert_eq!(currency, Currency::Inr);
        let types: Vec<AmountType> = amounts.iter().map(|a| a.amount_type).collect();
        assert_eq!(types, [AmountType::TotalBill, AmountType::Paid, AmountType::Due]);
        assert!(validation.valid);
        assert_eq!(metadata.total_tokens_extracted, 3);
        assert_eq!(metadata.amounts_normalized, 3);
        assert_eq!(metadata.amounts_classified, 3);
    }

    #[test]
    fn noisy_document_short_circuits() {
        let outcome =
            pipeline().run(&text_input("This is a document with no numbers or amounts in it at all."));
        let PipelineOutcome::NoAmountsFound { reason, extracted_text } = outcome else {
            panic!("expected no_amounts_found");
        };
        assert_eq!(reason, NO_AMOUNTS_REASON);
        assert!(extracted_text.contains("no numbers"));
    }

    #[test]
    fn degenerate_input_short_circuits() {
        let outcome = pipeline().run(&ExtractInput::default());
        assert!(matches!(outcome, PipelineOutcome::NoAmountsFound { .. }));
    }

    #[test]
    fn unparsable_tokens_fail_normalization_with_context() {
        // Alternating corruption keeps the line clear of the long-ID
        // exclusion, but the corrected digit run overflows Decimal, so
        // extraction keeps the token and normalization cannot parse it.
        let token = "l1".repeat(16);
        let outcome = pipeline().run(&text_input(&format!("Total: {token}")));
        let PipelineOutcome::NormalizationFailed { reason, raw_tokens, extracted_text } = outcome
        else {
            panic!("expected normalization_failed");
        };
        assert_eq!(reason, NORMALIZATION_FAILED_REASON);
        assert_eq!(raw_tokens, [token]);
        assert!(extracted_text.starts_with("Total:"));
    }

    #[test]
    fn classification_runs_over_ocr_text_not_caller_text() {
        let outcome = pipeline().run(&ExtractInput {
            text: Some("Total: 1111"),
            ocr_text: Some("Total: 2222"),
            ocr_confidence: Some(0.85),
        });
        let PipelineOutcome::Ok { amounts, .. } = outcome else {
            panic!("expected ok outcome");
        };
        assert_eq!(amounts.len(), 1);
        assert_eq!(amounts[0].value, Decimal::from(2222));
        assert_eq!(amounts[0].source, "text: 'Total: 2222'");
    }

    #[test]
    fn inconsistent_amounts_still_return_ok_with_findings() {
        let outcome = pipeline().run(&text_input("Total: 2000\nPaid: 1500\nDue: 600"));
        let PipelineOutcome::Ok { validation, amounts, .. } = outcome else {
            panic!("expected ok outcome");
        };
        assert_eq!(amounts.len(), 3);
        assert!(!validation.valid);
        assert_eq!(validation.issues.len(), 1);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = pipeline().run(&text_input("Total: 5000"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["amounts"][0]["type"], "total_bill");
        let noisy = pipeline().run(&text_input("nothing here"));
        let json = serde_json::to_value(&noisy).unwrap();
        assert_eq!(json["status"], "no_amounts_found");
    }
}
