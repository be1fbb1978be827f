use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML config: {0}")]
    Parse(String),
    #[error("{field} must be within [0.0, 1.0], got {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Confidence floors applied by the three pipeline stages.
///
/// Constructed once (defaults or TOML) and injected into each component;
/// nothing reads the environment at detection time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Lower clamp on extraction confidence when tokens were found.
    pub min_ocr_confidence: f32,
    /// Lower clamp on normalization confidence when amounts were parsed.
    pub min_normalization_confidence: f32,
    /// Lower clamp on aggregate classification confidence.
    pub min_classification_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_ocr_confidence: 0.2,
            min_normalization_confidence: 0.3,
            min_classification_confidence: 0.3,
        }
    }
}

impl DetectorConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(toml_content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_ocr_confidence", self.min_ocr_confidence),
            ("min_normalization_confidence", self.min_normalization_confidence),
            ("min_classification_confidence", self.min_classification_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }
}
