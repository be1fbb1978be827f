pub mod amount;
pub mod config;
pub mod corrections;
pub mod currency;

pub use amount::{
    AmountType, ClassifiedAmount, NormalizedAmount, SkipReason, TokenRecord, ValidationReport,
};
pub use config::{ConfigError, DetectorConfig};
pub use corrections::{parse_cleaned, DigitCorrections};
pub use currency::Currency;
