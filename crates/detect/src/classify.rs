use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use summa_core::{
    parse_cleaned, AmountType, ClassifiedAmount, DetectorConfig, DigitCorrections,
    ValidationReport,
};

use crate::scan;

const SNIPPET_TRUNCATE_CHARS: usize = 80;

/// One semantic-role rule: keyword substrings score `priority` each, a
/// pattern hit scores `priority × 2` once.
pub struct ClassificationRule {
    pub amount_type: AmountType,
    pub priority: i32,
    pub keywords: &'static [&'static str],
    patterns: Vec<Regex>,
}

impl ClassificationRule {
    fn new(
        amount_type: AmountType,
        priority: i32,
        keywords: &'static [&'static str],
        patterns: &[&str],
    ) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p).expect("invalid rule pattern"))
            .collect();
        Self { amount_type, priority, keywords, patterns }
    }

    /// The seven built-in rules. Declaration order doubles as the tie-break
    /// order, so it is part of the contract.
    pub fn builtin() -> Vec<ClassificationRule> {
        vec![
            ClassificationRule::new(
                AmountType::TotalBill,
                10,
                &["total", "total amount", "grand total", "net amount", "net payable", "amount payable", "bill amount"],
                &[r"(?i)\b(?:grand\s+)?total\b", r"(?i)\bnet\s+(?:amount|payable)\b"],
            ),
            ClassificationRule::new(
                AmountType::Paid,
                9,
                &["paid", "amount paid", "payment", "received", "advance"],
                &[r"(?i)\bpaid\b", r"(?i)\b(?:payment|received|advance)\b"],
            ),
            ClassificationRule::new(
                AmountType::Due,
                9,
                &["due", "amount due", "balance", "balance due", "outstanding"],
                &[r"(?i)\bdue\b", r"(?i)\b(?:balance|outstanding)\b"],
            ),
            ClassificationRule::new(
                AmountType::Subtotal,
                8,
                &["subtotal", "sub total", "sub-total"],
                &[r"(?i)\bsub\s*-?\s*total\b"],
            ),
            ClassificationRule::new(
                AmountType::Tax,
                7,
                &["tax", "gst", "cgst", "sgst", "igst", "vat"],
                &[r"(?i)\b(?:tax|gst|cgst|sgst|igst|vat)\b"],
            ),
            ClassificationRule::new(
                AmountType::Discount,
                6,
                &["discount", "concession", "rebate"],
                &[r"(?i)\bdiscount\b", r"(?i)\b(?:concession|rebate)\b"],
            ),
            ClassificationRule::new(
                AmountType::ServiceCharge,
                5,
                &["service charge", "service fee", "convenience fee", "processing fee"],
                &[r"(?i)\b(?:service|convenience|processing)\s*(?:charge|fee)\b"],
            ),
        ]
    }
}

/// A snippet's winning rule with its raw score and derived confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnippetMatch {
    pub amount_type: AmountType,
    pub score: i32,
    pub confidence: f32,
}

/// Per-assignment trace kept alongside the classified amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationDetail {
    pub snippet: String,
    #[serde(rename = "type")]
    pub amount_type: AmountType,
    pub value: Decimal,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub amounts: Vec<ClassifiedAmount>,
    pub confidence: f32,
    pub classification_details: Vec<ClassificationDetail>,
}

/// Assigns semantic roles to normalized values from their text context.
pub struct Classifier {
    rules: Vec<ClassificationRule>,
    corrections: DigitCorrections,
    min_confidence: f32,
}

impl Classifier {
    pub fn new(config: &DetectorConfig, corrections: DigitCorrections) -> Self {
        Self {
            rules: ClassificationRule::builtin(),
            corrections,
            min_confidence: config.min_classification_confidence,
        }
    }

    /// Split source text into trimmed, non-empty context snippets.
    pub fn find_context_snippets<'a>(&self, text: &'a str) -> Vec<&'a str> {
        scan::split_segments(text).collect()
    }

    /// Candidate values in one snippet: the shared two-pattern scan with the
    /// same digit correction, percentages rejected, deduplicated by value.
    pub fn extract_amounts_from_snippet(&self, snippet: &str) -> Vec<Decimal> {
        let mut values: Vec<Decimal> = Vec::new();
        for hit in scan::scan_segment(snippet) {
            if hit.raw.contains('%') {
                continue;
            }
            let Some(value) = parse_cleaned(&self.corrections.clean(&hit.raw)) else {
                continue;
            };
            if !values.contains(&value) {
                values.push(value);
            }
        }
        values
    }

    /// Score every rule against the snippet; the strictly highest total wins
    /// and ties keep the earliest-declared rule.
    pub fn match_snippet_to_type(&self, snippet: &str) -> Option<SnippetMatch> {
        let lower = snippet.to_lowercase();
        let mut best: Option<(AmountType, i32)> = None;

        for rule in &self.rules {
            let mut score = 0;
            if rule.patterns.iter().any(|p| p.is_match(snippet)) {
                score += rule.priority * 2;
            }
            let keyword_hits = rule.keywords.iter().filter(|kw| lower.contains(*kw)).count();
            score += rule.priority * keyword_hits as i32;

            if score > 0 && best.map_or(true, |(_, b)| score > b) {
                best = Some((rule.amount_type, score));
            }
        }

        best.map(|(amount_type, score)| SnippetMatch {
            amount_type,
            score,
            confidence: (0.5 + score as f32 / 30.0).min(0.95),
        })
    }

    /// Walk snippets in source order and pin each candidate amount to a
    /// normalized value and a role. A `(type, value)` pair is assigned at
    /// most once per call.
    pub fn classify(&self, text: &str, normalized: &[Decimal]) -> ClassificationResult {
        let tolerance = Decimal::new(1, 2);
        let mut amounts: Vec<ClassifiedAmount> = Vec::new();
        let mut classification_details: Vec<ClassificationDetail> = Vec::new();

        for snippet in self.find_context_snippets(text) {
            for candidate in self.extract_amounts_from_snippet(snippet) {
                let Some(value) =
                    normalized.iter().copied().find(|n| (*n - candidate).abs() <= tolerance)
                else {
                    continue;
                };
                let Some(matched) = self.match_snippet_to_type(snippet) else {
                    continue;
                };
                if matched.confidence <= 0.5 {
                    continue;
                }
                if amounts
                    .iter()
                    .any(|a| a.amount_type == matched.amount_type && a.value == value)
                {
                    continue;
                }

                let truncated = truncate_snippet(snippet);
                classification_details.push(ClassificationDetail {
                    snippet: truncated.clone(),
                    amount_type: matched.amount_type,
                    value,
                    score: matched.score,
                });
                amounts.push(ClassifiedAmount {
                    amount_type: matched.amount_type,
                    value,
                    source: format!("text: '{truncated}'"),
                    confidence: matched.confidence,
                });
            }
        }

        let confidence = self.aggregate_confidence(normalized.len(), &amounts);
        ClassificationResult { amounts, confidence, classification_details }
    }

    fn aggregate_confidence(&self, total_amounts: usize, amounts: &[ClassifiedAmount]) -> f32 {
        if total_amounts == 0 {
            return 0.0;
        }
        let classified = amounts.len();
        let mut c = 0.4 + (classified as f32 / total_amounts as f32) * 0.3;
        if classified > 0 {
            // Every assignment comes from an explicit context match; the rule
            // set has no heuristic path.
            let explicit = classified;
            c += (explicit as f32 / classified as f32) * 0.3;
        }
        for t in [AmountType::TotalBill, AmountType::Paid, AmountType::Due] {
            if amounts.iter().any(|a| a.amount_type == t) {
                c += 0.05;
            }
        }
        c.clamp(self.min_confidence, 0.95)
    }

    /// Advisory consistency checks. Findings never fail a run.
    pub fn validate(&self, amounts: &[ClassifiedAmount]) -> ValidationReport {
        let mut issues: Vec<String> = Vec::new();

        for t in [AmountType::TotalBill, AmountType::Subtotal, AmountType::Paid] {
            let mut values: Vec<Decimal> = Vec::new();
            for a in amounts.iter().filter(|a| a.amount_type == t) {
                if !values.contains(&a.value) {
                    values.push(a.value);
                }
            }
            if values.len() > 1 {
                let listed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                issues.push(format!("multiple values for {t}: {}", listed.join(", ")));
            }
        }

        let first_of = |t: AmountType| amounts.iter().find(|a| a.amount_type == t).map(|a| a.value);
        let max_due = amounts
            .iter()
            .filter(|a| a.amount_type == AmountType::Due)
            .map(|a| a.value)
            .max();

        if let (Some(total), Some(paid), Some(due)) =
            (first_of(AmountType::TotalBill), first_of(AmountType::Paid), max_due)
        {
            if ((total - paid) - due).abs() > Decimal::ONE {
                issues.push(format!(
                    "inconsistent amounts: total {total} - paid {paid} = {}, but due is {due}",
                    total - paid
                ));
            }
        }

        ValidationReport { valid: issues.is_empty(), issues }
    }
}

fn truncate_snippet(snippet: &str) -> String {
    if snippet.chars().count() > SNIPPET_TRUNCATE_CHARS {
        let head: String = snippet.chars().take(SNIPPET_TRUNCATE_CHARS).collect();
        format!("{head}...")
    } else {
        snippet.to_string()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
