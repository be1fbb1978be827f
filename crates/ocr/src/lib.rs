pub mod recognizer;

pub use recognizer::{MockRecognizer, OcrBackend, OcrError, Recognized};
