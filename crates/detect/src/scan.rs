// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        pub(crate) fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub(crate) use re;

// The numeral-like run in both patterns admits digits plus the letters the
// correction table can repair, separators, and `%` so percentages can be
// caught and rejected.
//
// The two token patterns shared by extraction and snippet classification:
// a currency-marker-prefixed run, and a colon-prefixed optionally-currency run.
re!(re_after_currency,
    r"(?i)(?:[₹$€£]|\brs\.?)\s*([0-9OoDIilLSsZzBbGgTt][0-9OoDIilLSsZzBbGgTt,.%]*)");
re!(re_after_colon,
    r"(?i):\s*(?:[₹$€£]|\brs\.?)?\s*([0-9OoDIilLSsZzBbGgTt][0-9OoDIilLSsZzBbGgTt,.%]*)");

/// One captured numeral-like run and where it started in the segment.
#[derive(Debug, Clone)]
pub(crate) struct ScanHit {
    pub start: usize,
    pub raw: String,
}

/// Run both token patterns over one segment, in text order.
///
/// Captures without a single real digit are discarded — a bare run of
/// correctable letters is a word, not a corrupted number.
pub(crate) fn scan_segment(segment: &str) -> Vec<ScanHit> {
    let mut hits: Vec<ScanHit> = Vec::new();
    for pattern in [re_after_currency(), re_after_colon()] {
        for caps in pattern.captures_iter(segment) {
            let m = caps.get(1).expect("token capture group");
            if !m.as_str().chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            hits.push(ScanHit { start: m.start(), raw: m.as_str().to_string() });
        }
    }
    hits.sort_by_key(|h| h.start);
    hits
}

/// Split source text into trimmed, non-empty context segments.
/// Pipe, newline and carriage-return all act as separators.
pub(crate) fn split_segments(text: &str) -> impl Iterator<Item = &str> {
    text.split(['|', '\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_prefixed_run_is_captured() {
        let hits = scan_segment("Paid $450.00 by card");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].raw, "450.00");
    }

    #[test]
    fn colon_prefixed_run_is_captured() {
        let hits = scan_segment("Total: 5000");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].raw, "5000");
    }

    #[test]
    fn corrupted_run_is_captured() {
        let hits = scan_segment("Total: l200");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].raw, "l200");
    }

    #[test]
    fn both_patterns_keep_text_order() {
        let hits = scan_segment("Amount: 300 then ₹500 extra");
        let raws: Vec<&str> = hits.iter().map(|h| h.raw.as_str()).collect();
        assert_eq!(raws, ["300", "500"]);
    }

    #[test]
    fn plain_words_after_colon_are_not_runs() {
        // 'o'/'S' are correctable letters but the runs hold no real digit.
        assert!(scan_segment("Name: John").is_empty());
        assert!(scan_segment("Status: SOS").is_empty());
    }

    #[test]
    fn percent_run_is_still_captured_for_rejection() {
        let hits = scan_segment("GST: 18%");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].raw, "18%");
    }

    #[test]
    fn split_segments_on_pipe_and_newlines() {
        let segments: Vec<&str> = split_segments("Total: 100 | Paid: 60\r\n Due: 40 ").collect();
        assert_eq!(segments, ["Total: 100", "Paid: 60", "Due: 40"]);
    }
}
