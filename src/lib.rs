pub mod annotator;
pub mod batch;
pub mod cleaner;
pub mod config;
pub mod discovery;
pub mod masker;
pub mod normalizer;
pub mod pipeline;
pub mod protected;
pub mod reader;
pub mod segmenter;

// Re-export main types for convenient access
pub use config::{PreprocessConfig, StageOrder};
pub use pipeline::{NormalizedDocument, TextPreprocessor};

// Re-export the individual rewrite stages
pub use cleaner::BoilerplateCleaner;
pub use masker::PiiMasker;
pub use normalizer::{ContentNormalizer, HomoglyphMap};
pub use segmenter::{AbbreviationSet, SentenceSegmenter};

// Re-export the placeholder-span primitives and the collaborator contract
pub use annotator::{LinguisticAnnotator, LinguisticFeatures};
pub use protected::{split_protected, Segment, PLACEHOLDER_TOKENS};
