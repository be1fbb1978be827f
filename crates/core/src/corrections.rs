use rust_decimal::Decimal;
use std::str::FromStr;

/// Letter-to-digit substitutions for OCR-corrupted numerals.
///
/// Built once at startup and handed to each pipeline component; a correction
/// only applies when the letter sits next to an actual digit, so ordinary
/// words are never coerced into numbers.
#[derive(Debug, Clone)]
pub struct DigitCorrections {
    table: Vec<(char, char)>,
}

impl DigitCorrections {
    /// The documented correction set: l/L/I/i→1, O/o/D→0, S/s→5, Z/z→2,
    /// B/b→8, G/g→6, T/t→7.
    pub fn standard() -> Self {
        Self {
            table: vec![
                ('l', '1'),
                ('L', '1'),
                ('I', '1'),
                ('i', '1'),
                ('O', '0'),
                ('o', '0'),
                ('D', '0'),
                ('S', '5'),
                ('s', '5'),
                ('Z', '2'),
                ('z', '2'),
                ('B', '8'),
                ('b', '8'),
                ('G', '6'),
                ('g', '6'),
                ('T', '7'),
                ('t', '7'),
            ],
        }
    }

    pub fn lookup(&self, c: char) -> Option<char> {
        self.table.iter().find(|(from, _)| *from == c).map(|(_, to)| *to)
    }

    /// Repair OCR-corrupted digits in a token and strip it down to a
    /// parseable numeric string.
    ///
    /// Currency markers and whitespace are removed first — a leading `Rs`
    /// would otherwise put its `s` next to a digit and turn into a 5. A
    /// mapped letter is corrected only when the previous or next character
    /// is a real digit. Digits, `.` and `,` survive the scan, everything
    /// else is dropped; commas are then stripped, and if more than one `.`
    /// remains the first is kept as the decimal point and the remaining
    /// groups concatenated.
    pub fn clean(&self, token: &str) -> String {
        let stripped: Vec<char> = strip_rs_marker(token)
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '₹' | '$' | '€' | '£'))
            .collect();

        let mut out = String::with_capacity(stripped.len());
        for (i, &c) in stripped.iter().enumerate() {
            if c.is_ascii_digit() || c == '.' || c == ',' {
                out.push(c);
                continue;
            }
            if let Some(digit) = self.lookup(c) {
                let prev_digit = i > 0 && stripped[i - 1].is_ascii_digit();
                let next_digit = stripped.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                if prev_digit || next_digit {
                    out.push(digit);
                }
            }
        }

        let mut out = out.replace(',', "");

        if out.matches('.').count() > 1 {
            let mut parts = out.split('.');
            let head = parts.next().unwrap_or("").to_string();
            let tail: String = parts.collect();
            out = format!("{head}.{tail}");
        }
        // Decimal's parser wants digits on both sides of the point.
        if out.ends_with('.') {
            out.pop();
        }
        if out.starts_with('.') {
            out.insert(0, '0');
        }
        out
    }
}

fn strip_rs_marker(token: &str) -> &str {
    let t = token.trim_start();
    for marker in ["Rs.", "RS.", "rs.", "Rs", "RS", "rs"] {
        if let Some(rest) = t.strip_prefix(marker) {
            return rest;
        }
    }
    t
}

/// Parse a cleaned numeric string into a two-decimal value.
/// Returns None for anything Decimal cannot represent.
pub fn parse_cleaned(cleaned: &str) -> Option<Decimal> {
    Decimal::from_str(cleaned).ok().map(|d| d.round_dp(2))
}
