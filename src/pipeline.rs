use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cleaner::BoilerplateCleaner;
use crate::config::{PreprocessConfig, StageOrder};
use crate::masker::PiiMasker;
use crate::normalizer::{ContentNormalizer, HomoglyphMap};
use crate::segmenter::{AbbreviationSet, SentenceSegmenter};

/// The structured result of preprocessing one review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    /// Raw input, untouched.
    pub original: String,
    /// Fully cleaned, masked and normalized text.
    pub clean_normalized: String,
    /// Ordered, trimmed, non-empty sentences of `clean_normalized`.
    pub sentences: Vec<String>,
    /// Always equal to `sentences.len()`.
    pub sentence_count: usize,
}

impl NormalizedDocument {
    fn empty() -> Self {
        Self {
            original: String::new(),
            clean_normalized: String::new(),
            sentences: Vec::new(),
            sentence_count: 0,
        }
    }
}

/// The pipeline orchestrator. Owns the four rewrite stages and fixes their
/// order; construction compiles every pattern once, after which the
/// preprocessor is immutable and safe to share across threads.
pub struct TextPreprocessor {
    cleaner: BoilerplateCleaner,
    masker: PiiMasker,
    normalizer: ContentNormalizer,
    segmenter: SentenceSegmenter,
    stage_order: StageOrder,
}

impl TextPreprocessor {
    pub fn new(config: PreprocessConfig) -> Result<Self> {
        let abbreviations = AbbreviationSet::from_entries(&config.abbreviations);
        let cleaner = BoilerplateCleaner::with_phrases(&config.boilerplate_phrases)?;
        let masker =
            PiiMasker::with_rules(config.unit_suffixes.clone(), config.id_cue_words.clone())?;
        let normalizer = ContentNormalizer::new(
            HomoglyphMap::from_pairs(config.homoglyphs.iter().map(|(k, v)| (*k, *v))),
            abbreviations.clone(),
            config.unit_suffixes.clone(),
        );
        let segmenter = SentenceSegmenter::new(abbreviations)?;

        Ok(Self {
            cleaner,
            masker,
            normalizer,
            segmenter,
            stage_order: config.stage_order,
        })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(PreprocessConfig::default())
    }

    /// Run the full pipeline: clean, mask, normalize, segment.
    ///
    /// The default order masks before normalizing so PII patterns see the
    /// original casing and script; the normalizer then protects the inserted
    /// placeholders. No input can make this fail; empty input short-circuits
    /// to an all-empty document.
    pub fn preprocess(&self, text: &str) -> NormalizedDocument {
        if text.is_empty() {
            return NormalizedDocument::empty();
        }

        let cleaned = self.cleaner.clean(text);
        let rewritten = match self.stage_order {
            StageOrder::MaskThenNormalize => self.normalizer.normalize(&self.masker.mask(&cleaned)),
            StageOrder::NormalizeThenMask => self.masker.mask(&self.normalizer.normalize(&cleaned)),
        };
        let sentences = self.segmenter.segment(&rewritten);
        debug!(
            input_len = text.len(),
            sentence_count = sentences.len(),
            "preprocessed review"
        );

        NormalizedDocument {
            original: text.to_string(),
            sentence_count: sentences.len(),
            clean_normalized: rewritten,
            sentences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preprocessor() -> TextPreprocessor {
        TextPreprocessor::with_default_config().unwrap()
    }

    #[test]
    fn test_empty_input_all_empty_document() {
        let doc = preprocessor().preprocess("");
        assert_eq!(doc.original, "");
        assert_eq!(doc.clean_normalized, "");
        assert!(doc.sentences.is_empty());
        assert_eq!(doc.sentence_count, 0);
    }

    #[test]
    fn test_original_preserved_verbatim() {
        let raw = "  СУПЕР&#33;  пишіть на test@mail.com ";
        let doc = preprocessor().preprocess(raw);
        assert_eq!(doc.original, raw);
        assert_ne!(doc.clean_normalized, raw);
    }

    #[test]
    fn test_sentence_count_matches() {
        let doc = preprocessor().preprocess("Перше речення. Друге речення. Третє!");
        assert_eq!(doc.sentence_count, doc.sentences.len());
        assert_eq!(doc.sentence_count, 3);
    }

    #[test]
    fn test_stage_composition_masks_then_normalizes() {
        let doc = preprocessor().preprocess("ЗАМОВЛЯВ на rozetka.com.ua СУПЕР!!!");
        assert!(doc.clean_normalized.contains("<URL>"));
        assert!(doc.clean_normalized.contains("замовляв"));
        assert!(doc.clean_normalized.ends_with("!!"));
    }

    #[test]
    fn test_alternative_stage_order() {
        let config = PreprocessConfig {
            stage_order: StageOrder::NormalizeThenMask,
            ..PreprocessConfig::default()
        };
        let pre = TextPreprocessor::new(config).unwrap();
        let doc = pre.preprocess("пишіть на test@mail.com або olx.ua");
        assert!(doc.clean_normalized.contains("<EMAIL>"));
        assert!(doc.clean_normalized.contains("<URL>"));
    }

    #[test]
    fn test_document_serializes_to_json() {
        let doc = preprocessor().preprocess("Все добре. Дякую!");
        let json = serde_json::to_string(&doc).unwrap();
        let back: NormalizedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_preprocessor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TextPreprocessor>();
    }
}
