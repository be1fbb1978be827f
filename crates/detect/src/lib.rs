pub mod classify;
pub mod extract;
pub mod normalize;
pub mod pipeline;
mod scan;

pub use classify::{
    ClassificationDetail, ClassificationResult, ClassificationRule, Classifier, SnippetMatch,
};
pub use extract::{ExtractInput, ExtractionResult, TokenExtractor};
pub use normalize::{NormalizationResult, Normalizer};
pub use pipeline::{
    AmountPipeline, PipelineMetadata, PipelineOutcome, NORMALIZATION_FAILED_REASON,
    NO_AMOUNTS_REASON,
};
