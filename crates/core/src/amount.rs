use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Semantic role of a classified amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AmountType {
    TotalBill,
    Paid,
    Due,
    Subtotal,
    Tax,
    Discount,
    ServiceCharge,
}

impl std::fmt::Display for AmountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountType::TotalBill => write!(f, "total_bill"),
            AmountType::Paid => write!(f, "paid"),
            AmountType::Due => write!(f, "due"),
            AmountType::Subtotal => write!(f, "subtotal"),
            AmountType::Tax => write!(f, "tax"),
            AmountType::Discount => write!(f, "discount"),
            AmountType::ServiceCharge => write!(f, "service_charge"),
        }
    }
}

/// A numeric value recovered from one raw token, rounded to two decimals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedAmount {
    pub value: Decimal,
    /// The token exactly as extracted, corruption and all.
    pub original: String,
    /// The token after digit correction and separator stripping.
    pub normalized: String,
}

/// Why a token produced no new normalized amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Duplicate,
    Percentage,
    InvalidFormat,
}

/// Per-token normalization outcome, kept even for failed tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub original: String,
    pub normalized: String,
    pub value: Option<Decimal>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
}

/// An amount with its semantic role, provenance snippet and rule confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedAmount {
    #[serde(rename = "type")]
    pub amount_type: AmountType,
    pub value: Decimal,
    /// Evidence of origin, e.g. `text: 'Total: 5000'`.
    pub source: String,
    pub confidence: f32,
}

/// Advisory consistency findings over one classification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_type_display_matches_wire_name() {
        assert_eq!(AmountType::TotalBill.to_string(), "total_bill");
        assert_eq!(AmountType::ServiceCharge.to_string(), "service_charge");
    }

    #[test]
    fn amount_type_serializes_snake_case() {
        let json = serde_json::to_string(&AmountType::TotalBill).unwrap();
        assert_eq!(json, "\"total_bill\"");
    }

    #[test]
    fn classified_amount_serializes_type_field() {
        let a = ClassifiedAmount {
            amount_type: AmountType::Due,
            value: Decimal::new(60000, 2),
            source: "text: 'Due: 600'".to_string(),
            confidence: 0.9,
        };
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"type\":\"due\""));
        assert!(json.contains("\"value\":\"600.00\""));
    }

    #[test]
    fn skip_reason_wire_names() {
        assert_eq!(serde_json::to_string(&SkipReason::InvalidFormat).unwrap(), "\"invalid_format\"");
        assert_eq!(serde_json::to_string(&SkipReason::Duplicate).unwrap(), "\"duplicate\"");
    }
}
