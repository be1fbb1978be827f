use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use summa_core::{parse_cleaned, Currency, DetectorConfig, DigitCorrections};

use crate::scan::{self, re};

// ── Exclusion patterns ───────────────────────────────────────────────────────
// Lines matching any of these carry numbers that are never money: record
// identifiers, dates, clock times, phone numbers.

re!(re_long_id, r"\d{10,}");
re!(re_date, r"\b\d{1,4}[/-]\d{1,2}[/-]\d{1,4}\b");
re!(re_time, r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?(?:\s*(?:am|pm))?\b");
re!(re_id_label,
    r"(?i)\b(?:patient|doctor|dr|room|ward|bed|reg|mrn|uhid)\b[\s.]*(?:no|num|number|id)?[\s.#:\-]*\d");
re!(re_ref_no,
    r"(?i)\b(?:bill|invoice|receipt|order|txn|transaction)\s*(?:no|num|number|id)\b[\s.#:\-]*\d");
re!(re_phone_label, r"(?i)\b(?:phone|mobile|tel|contact|helpline)\b[\s.#:\-]*\+?\d");
re!(re_phone_shape, r"\(?\d{3}\)?[\s\-]\d{3}[\s\-]\d{4}");

// ── Monetary triggers ────────────────────────────────────────────────────────

re!(re_currency_marker, r"(?i)[₹$€£]|\brs\.?");
re!(re_colon_number, r"(?i):\s*[₹$€£]?\s*[0-9oOdDiIlLsSzZbBgGtT,.]*\d");

const MONETARY_KEYWORDS: [&str; 15] = [
    "total", "amount", "paid", "due", "balance", "subtotal", "tax", "gst", "vat", "discount",
    "charge", "fee", "payable", "bill", "net",
];

// ── Currency detection ───────────────────────────────────────────────────────

re!(re_inr, r"(?i)₹|\brs\.?|\binr\b|rupee");
re!(re_usd, r"(?i)\$|\busd\b|dollar");
re!(re_eur, r"(?i)€|\beur\b|euro");
re!(re_gbp, r"(?i)£|\bgbp\b|pound");

// ── Public extraction API ────────────────────────────────────────────────────

/// What the caller hands the pipeline: raw text, OCR output, or both.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractInput<'a> {
    pub text: Option<&'a str>,
    pub ocr_text: Option<&'a str>,
    pub ocr_confidence: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub raw_tokens: Vec<String>,
    pub currency_hint: Option<Currency>,
    pub confidence: f32,
    /// The text the scan actually ran over — OCR output when present.
    pub extracted_text: String,
}

pub struct TokenExtractor {
    corrections: DigitCorrections,
    min_confidence: f32,
}

impl TokenExtractor {
    pub fn new(config: &DetectorConfig, corrections: DigitCorrections) -> Self {
        Self { corrections, min_confidence: config.min_ocr_confidence }
    }

    pub fn extract(&self, input: &ExtractInput) -> ExtractionResult {
        let source = [input.ocr_text, input.text]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty());

        let Some(source) = source else {
            return ExtractionResult {
                raw_tokens: Vec::new(),
                currency_hint: None,
                confidence: 0.0,
                extracted_text: String::new(),
            };
        };

        let raw_tokens = self.extract_numeric_tokens(source);
        let confidence = self.confidence(source, raw_tokens.len(), input.ocr_confidence);

        ExtractionResult {
            raw_tokens,
            currency_hint: Some(Self::detect_currency(source)),
            confidence,
            extracted_text: source.to_string(),
        }
    }

    /// A line is monetary when it hits none of the exclusion patterns and
    /// carries at least one monetary trigger.
    pub fn is_monetary_line(&self, line: &str) -> bool {
        if re_long_id().is_match(line)
            || re_date().is_match(line)
            || re_time().is_match(line)
            || re_id_label().is_match(line)
            || re_ref_no().is_match(line)
            || re_phone_label().is_match(line)
            || re_phone_shape().is_match(line)
        {
            return false;
        }

        let lower = line.to_lowercase();
        MONETARY_KEYWORDS.iter().any(|kw| lower.contains(kw))
            || re_currency_marker().is_match(line)
            || re_colon_number().is_match(line)
    }

    /// Scan every monetary segment for numeral-like runs, keeping the
    /// first-seen raw token per distinct corrected value in source order.
    pub fn extract_numeric_tokens(&self, text: &str) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        let mut seen_values: Vec<Decimal> = Vec::new();
        // Runs the correction table cannot parse share one dedup slot; they
        // survive to normalization and are reported there.
        let mut seen_unparsed = false;

        for segment in scan::split_segments(text) {
            if !self.is_monetary_line(segment) {
                continue;
            }
            for hit in scan::scan_segment(segment) {
                if hit.raw.contains('%') {
                    continue;
                }
                match parse_cleaned(&self.corrections.clean(&hit.raw)) {
                    Some(value) => {
                        if value < Decimal::ONE || seen_values.contains(&value) {
                            continue;
                        }
                        seen_values.push(value);
                        tokens.push(hit.raw);
                    }
                    None => {
                        if !seen_unparsed {
                            seen_unparsed = true;
                            tokens.push(hit.raw);
                        }
                    }
                }
            }
        }
        tokens
    }

    /// Count pattern hits for each currency over the whole text; highest
    /// count wins, first-evaluated wins ties, USD when nothing matches.
    pub fn detect_currency(text: &str) -> Currency {
        let counts = [
            (Currency::Inr, re_inr().find_iter(text).count()),
            (Currency::Usd, re_usd().find_iter(text).count()),
            (Currency::Eur, re_eur().find_iter(text).count()),
            (Currency::Gbp, re_gbp().find_iter(text).count()),
        ];
        // Strictly-greater comparison so the first-evaluated pattern keeps
        // ties; max_by_key would hand them to the last.
        let mut best: Option<(Currency, usize)> = None;
        for (currency, count) in counts {
            if count > 0 && best.map_or(true, |(_, b)| count > b) {
                best = Some((currency, count));
            }
        }
        best.map(|(c, _)| c).unwrap_or(Currency::Usd)
    }

    fn confidence(&self, text: &str, token_count: usize, ocr_confidence: Option<f32>) -> f32 {
        let mut c = ocr_confidence.unwrap_or(0.8);
        if (2..=10).contains(&token_count) {
            c = (c + 0.1).min(0.95);
        }
        if token_count == 1 {
            c *= 0.9;
        }
        if token_count > 15 {
            c *= 0.8;
        }
        let lower = text.to_lowercase();
        let distinct_keywords = MONETARY_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
        if distinct_keywords >= 2 {
            c += 0.05;
        }
        c.clamp(self.min_confidence, 0.95)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TokenExtractor {
        TokenExtractor::new(&DetectorConfig::default(), DigitCorrections::standard())
    }

    fn text_input(text: &str) -> ExtractInput<'_> {
        ExtractInput { text: Some(text), ..Default::default() }
    }

    // ── Monetary line gate ───────────────────────────────────────────────────

    #[test]
    fn keyword_and_currency_lines_are_monetary() {
        let e = extractor();
        assert!(e.is_monetary_line("Total Amount: 5000"));
        assert!(e.is_monetary_line("₹ 1200 received"));
        assert!(e.is_monetary_line("Rs. 350 only"));
        assert!(e.is_monetary_line("Net: 99.50"));
    }

    #[test]
    fn identifier_lines_are_excluded() {
        let e = extractor();
        assert!(!e.is_monetary_line("Patient ID: 48291"));
        assert!(!e.is_monetary_line("Room No: 302"));
        assert!(!e.is_monetary_line("Bill No: 2023/1187"));
        assert!(!e.is_monetary_line("UHID 99231"));
    }

    #[test]
    fn date_time_and_phone_lines_are_excluded() {
        let e = extractor();
        assert!(!e.is_monetary_line("Date: 12/04/2023"));
        assert!(!e.is_monetary_line("Checked out 10:45 am"));
        assert!(!e.is_monetary_line("(555) 123-4567"));
        assert!(!e.is_monetary_line("Contact: 9876543210"));
    }

    #[test]
    fn room_rent_is_monetary_despite_room_word() {
        // "Room" followed by a charge, not a number, is a billable line.
        let e = extractor();
        assert!(e.is_monetary_line("Room Rent Charges: 2000"));
    }

    // ── Token extraction ─────────────────────────────────────────────────────

    #[test]
    fn extracts_tokens_in_source_order() {
        let e = extractor();
        let tokens = e.extract_numeric_tokens("Total: 5000\nPaid: 3000\nDue: 2000");
        assert_eq!(tokens, ["5000", "3000", "2000"]);
    }

    #[test]
    fn duplicate_values_keep_first_raw_token() {
        let e = extractor();
        // "l200" corrects to 1200 — the later clean "1200" is the same value.
        let tokens = e.extract_numeric_tokens("Total: l200\nAmount: 1200");
        assert_eq!(tokens, ["l200"]);
    }

    #[test]
    fn percentage_and_subunit_tokens_are_rejected() {
        let e = extractor();
        assert!(e.extract_numeric_tokens("GST: 18%").is_empty());
        assert!(e.extract_numeric_tokens("Rounding: 0.49").is_empty());
    }

    #[test]
    fn non_monetary_segments_are_never_scanned() {
        let e = extractor();
        let tokens = e.extract_numeric_tokens("Invoice No: 7731 | Total: 980");
        assert_eq!(tokens, ["980"]);
    }

    // ── Currency detection ───────────────────────────────────────────────────

    #[test]
    fn detect_currency_by_majority() {
        assert_eq!(
            TokenExtractor::detect_currency("Rs 100 | Rs 200 | $5 fee"),
            Currency::Inr
        );
        assert_eq!(TokenExtractor::detect_currency("Total €80, paid €80"), Currency::Eur);
    }

    #[test]
    fn detect_currency_tie_is_deterministic() {
        // One hit each for USD, EUR, GBP — the first-evaluated of the tied
        // patterns must win, every time.
        let text = "Total: $100 | Paid: €80 | Due: £20";
        for _ in 0..3 {
            assert_eq!(TokenExtractor::detect_currency(text), Currency::Usd);
        }
    }

    #[test]
    fn detect_currency_defaults_to_usd() {
        assert_eq!(TokenExtractor::detect_currency("Total: 5000"), Currency::Usd);
    }

    // ── Extraction result ────────────────────────────────────────────────────

    #[test]
    fn degenerate_input_yields_empty_result() {
        let r = extractor().extract(&ExtractInput::default());
        assert!(r.raw_tokens.is_empty());
        assert_eq!(r.currency_hint, None);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.extracted_text, "");
    }

    #[test]
    fn ocr_text_is_preferred_over_caller_text() {
        let e = extractor();
        let r = e.extract(&ExtractInput {
            text: Some("Total: 111"),
            ocr_text: Some("Total: 222"),
            ocr_confidence: Some(0.9),
        });
        assert_eq!(r.extracted_text, "Total: 222");
        assert_eq!(r.raw_tokens, ["222"]);
    }

    #[test]
    fn confidence_rises_with_a_healthy_token_count() {
        let e = extractor();
        let few = e.extract(&text_input("Total: 5000"));
        let healthy = e.extract(&text_input("Total: 5000\nPaid: 3000\nDue: 2000"));
        assert!(healthy.confidence > few.confidence);
        assert!(healthy.confidence <= 0.95);
    }

    #[test]
    fn single_token_confidence_is_damped() {
        let e = extractor();
        // One token, one keyword: 0.8 × 0.9, no bonuses.
        let r = e.extract(&text_input("Total: 5000"));
        assert!((r.confidence - 0.72).abs() < 1e-6);
    }

    #[test]
    fn ocr_confidence_feeds_the_base() {
        let e = extractor();
        let r = e.extract(&ExtractInput {
            text: None,
            ocr_text: Some("Total: 5000\nPaid: 3000"),
            ocr_confidence: Some(0.6),
        });
        // 0.6 + 0.1 (2..=10 tokens) + 0.05 (two keywords).
        assert!((r.confidence - 0.75).abs() < 1e-6);
    }
}
