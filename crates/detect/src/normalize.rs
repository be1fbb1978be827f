use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use summa_core::{
    parse_cleaned, DetectorConfig, DigitCorrections, NormalizedAmount, SkipReason, TokenRecord,
};

/// Smallest value the normalizer accepts.
fn min_value() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationResult {
    pub amounts: Vec<NormalizedAmount>,
    pub confidence: f32,
    pub details: Vec<TokenRecord>,
}

/// Repairs OCR-corrupted tokens and parses them into deduplicated values.
pub struct Normalizer {
    corrections: DigitCorrections,
    min_confidence: f32,
}

impl Normalizer {
    pub fn new(config: &DetectorConfig, corrections: DigitCorrections) -> Self {
        Self { corrections, min_confidence: config.min_normalization_confidence }
    }

    /// Parse one token into a rounded amount. None for percentages and
    /// anything that cleans down to an unparsable or sub-cent string.
    pub fn parse_numeric(&self, token: &str) -> Option<NormalizedAmount> {
        if token.contains('%') {
            return None;
        }
        let normalized = self.corrections.clean(token);
        let value = parse_cleaned(&normalized).filter(|v| *v >= min_value())?;
        Some(NormalizedAmount { value, original: token.to_string(), normalized })
    }

    /// Parse every token, keeping the first token per rounded value and
    /// recording why the rest produced nothing. Never aborts the batch.
    pub fn normalize(&self, tokens: &[String]) -> NormalizationResult {
        let mut amounts: Vec<NormalizedAmount> = Vec::new();
        let mut details: Vec<TokenRecord> = Vec::new();

        for token in tokens {
            let normalized = self.corrections.clean(token);

            if token.contains('%') {
                details.push(TokenRecord {
                    original: token.clone(),
                    normalized,
                    value: None,
                    success: false,
                    reason: Some(SkipReason::Percentage),
                });
                continue;
            }

            match parse_cleaned(&normalized).filter(|v| *v >= min_value()) {
                None => details.push(TokenRecord {
                    original: token.clone(),
                    normalized,
                    value: None,
                    success: false,
                    reason: Some(SkipReason::InvalidFormat),
                }),
                Some(value) if amounts.iter().any(|a| a.value == value) => {
                    details.push(TokenRecord {
                        original: token.clone(),
                        normalized,
                        value: Some(value),
                        success: false,
                        reason: Some(SkipReason::Duplicate),
                    });
                }
                Some(value) => {
                    amounts.push(NormalizedAmount {
                        value,
                        original: token.clone(),
                        normalized: normalized.clone(),
                    });
                    details.push(TokenRecord {
                        original: token.clone(),
                        normalized,
                        value: Some(value),
                        success: true,
                        reason: None,
                    });
                }
            }
        }

        let confidence = self.confidence(&amounts, &details);
        NormalizationResult { amounts, confidence, details }
    }

    fn confidence(&self, amounts: &[NormalizedAmount], details: &[TokenRecord]) -> f32 {
        if amounts.is_empty() {
            return 0.0;
        }
        let successes = details.iter().filter(|d| d.success).count();
        let mut c = 0.5 + 0.4 * (successes as f32 / details.len() as f32);
        if (2..=10).contains(&amounts.len()) {
            c += 0.1;
        }
        if amounts.len() == 1 {
            c *= 0.9;
        }
        c.clamp(self.min_confidence, 0.99)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
