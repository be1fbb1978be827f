use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use summa_core::DetectorConfig;
use summa_detect::{AmountPipeline, ExtractInput, PipelineOutcome};
use summa_llm::{LlmConfig, LlmValidator};

#[derive(Parser)]
#[command(name = "summa", about = "Detect and classify financial amounts in bill text")]
#[command(group = clap::ArgGroup::new("input").required(true).args(["text", "image"]))]
struct Cli {
    /// Plain-text bill/receipt file to scan
    #[arg(long, value_name = "FILE")]
    text: Option<PathBuf>,

    /// Bill image to OCR before scanning (requires the `tesseract` feature)
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// OCR language hint
    #[arg(long, default_value = "eng")]
    lang: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliConfig {
    detector: DetectorConfig,
    llm: LlmConfig,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: CliConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config.detector.validate()?;
    Ok(config)
}

#[cfg(feature = "tesseract")]
fn recognize_image(path: &PathBuf, lang: &str) -> anyhow::Result<summa_ocr::Recognized> {
    use summa_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    use summa_ocr::OcrBackend;

    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let recognizer = TesseractRecognizer::new(None);
    Ok(recognizer.recognize(&bytes, lang)?)
}

#[cfg(not(feature = "tesseract"))]
fn recognize_image(_path: &PathBuf, _lang: &str) -> anyhow::Result<summa_ocr::Recognized> {
    anyhow::bail!("image input requires a build with the `tesseract` feature")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let pipeline = AmountPipeline::new(&config.detector);

    // Resolve the input: OCR the image, or read the text file as-is.
    let (text, recognized) = match (&cli.text, &cli.image) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            (text, None)
        }
        (None, Some(path)) => {
            let r = recognize_image(path, &cli.lang)?;
            tracing::info!(confidence = r.confidence, "OCR complete");
            (r.text.clone(), Some(r))
        }
        (None, None) => unreachable!("clap enforces one input"),
    };

    let input = match &recognized {
        Some(r) => ExtractInput {
            text: None,
            ocr_text: Some(&r.text),
            ocr_confidence: Some(r.confidence),
        },
        None => ExtractInput { text: Some(&text), ocr_text: None, ocr_confidence: None },
    };

    let outcome = pipeline.run(&input);
    let mut output = serde_json::to_value(&outcome)?;

    // The validator is a critique bolted onto a successful run; it never
    // alters the amounts and its absence leaves the output untouched.
    if let PipelineOutcome::Ok { amounts, .. } = &outcome {
        if !amounts.is_empty() {
            if let Some(validator) = LlmValidator::from_config(config.llm) {
                let verdict = validator.validate(&text, amounts).await?;
                output["llm_validation"] = serde_json::to_value(&verdict)?;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
