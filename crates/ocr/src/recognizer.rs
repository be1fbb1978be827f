use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Recognized text plus the engine's own confidence in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognized {
    pub text: String,
    /// Engine confidence in [0.0, 1.0] — feeds the extraction base score.
    pub confidence: f32,
}

/// Abstraction over an OCR engine.
/// Implementations accept raw PNG/JPEG image bytes and a language hint and
/// return the recognized text with a confidence score.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8], lang: &str) -> Result<Recognized, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set recognition — useful for exercising the detection
/// pipeline without Tesseract installed.
pub struct MockRecognizer {
    pub text: String,
    pub confidence: f32,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8], _lang: &str) -> Result<Recognized, OcrError> {
        Ok(Recognized { text: self.text.clone(), confidence: self.confidence })
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, Recognized};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>) -> Self {
            Self { data_path }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8], lang: &str) -> Result<Recognized, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            // Tesseract reports mean confidence as 0–100.
            let confidence = (lt.mean_text_conf() as f32 / 100.0).clamp(0.0, 1.0);
            Ok(Recognized { text, confidence })
        }
    }
}
