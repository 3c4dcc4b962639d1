use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::cleaner::BOILERPLATE_PHRASES;
use crate::masker::{ID_CUE_WORDS, UNIT_SUFFIXES};
use crate::normalizer::LATIN_TO_CYRILLIC;
use crate::segmenter::abbreviations::UKRAINIAN_ABBREVIATIONS;

/// Precedence between PII masking and content normalization.
///
/// Masking first matches PII patterns against the original casing and script
/// before folding erases them, at the cost of placeholder-span protection in
/// the normalizer. Normalizing first simplifies the normalizer but can miss
/// homoglyph-obfuscated PII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOrder {
    #[default]
    MaskThenNormalize,
    NormalizeThenMask,
}

/// The full rule set driving the pipeline, as plain data.
///
/// Every list ships with a Ukrainian-marketplace default but can be replaced
/// from a JSON file, so rule updates never require recompilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Tokens whose trailing period does not end a sentence.
    pub abbreviations: Vec<String>,
    /// Directional Latin-to-Cyrillic look-alike substitutions.
    pub homoglyphs: HashMap<char, char>,
    /// UI phrases stripped by the cleaner.
    pub boilerplate_phrases: Vec<String>,
    /// Currency/unit suffixes that exempt digit runs from ID masking and
    /// drive numeral-unit spacing repair.
    pub unit_suffixes: Vec<String>,
    /// Words that mark a following digit run as an order number or code.
    pub id_cue_words: Vec<String>,
    /// Masking/normalization precedence policy.
    pub stage_order: StageOrder,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            abbreviations: to_strings(UKRAINIAN_ABBREVIATIONS),
            homoglyphs: LATIN_TO_CYRILLIC.iter().copied().collect(),
            boilerplate_phrases: to_strings(BOILERPLATE_PHRASES),
            unit_suffixes: to_strings(UNIT_SUFFIXES),
            id_cue_words: to_strings(ID_CUE_WORDS),
            stage_order: StageOrder::default(),
        }
    }
}

impl PreprocessConfig {
    /// Load a rule set from a JSON file. Omitted fields fall back to the
    /// defaults, so a partial override file is enough to adjust one list.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
