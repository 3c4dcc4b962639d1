// WHY: Lemmatization and POS tagging live in an external NLP pipeline; only
// the exchange contract is modeled here so the preprocessor never depends on
// model internals.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-sentence morphological annotation returned by the external pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinguisticFeatures {
    /// Lowercased lemmas, space-joined.
    pub lemma_text: String,
    /// UPOS tags, space-joined ("ADJ NOUN").
    pub pos_seq: String,
    /// UPOS tags, underscore-joined ("ADJ_NOUN").
    pub pos_text: String,
}

/// Contract for the lemmatization/POS collaborator: one cleaned sentence in,
/// aligned lemma and tag sequences out. Empty input must yield all-empty
/// fields.
pub trait LinguisticAnnotator {
    fn annotate(&self, sentence: &str) -> LinguisticFeatures;

    /// Keep only the lemmas whose UPOS tag is in `allowed`, space-joined.
    /// Relies on `annotate` returning lemma and tag sequences of equal
    /// length; a mismatched backend degrades to the shorter of the two.
    fn filter_by_pos(&self, sentence: &str, allowed: &HashSet<String>) -> String {
        if sentence.is_empty() {
            return String::new();
        }
        let features = self.annotate(sentence);
        features
            .lemma_text
            .split_whitespace()
            .zip(features.pos_seq.split_whitespace())
            .filter(|(_, tag)| allowed.contains(*tag))
            .map(|(lemma, _)| lemma)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in: every whitespace token becomes its own
    /// lowercased lemma, nouns are faked by an initial capital.
    struct StubAnnotator;

    impl LinguisticAnnotator for StubAnnotator {
        fn annotate(&self, sentence: &str) -> LinguisticFeatures {
            if sentence.is_empty() {
                return LinguisticFeatures::default();
            }
            let mut lemmas = Vec::new();
            let mut tags = Vec::new();
            for token in sentence.split_whitespace() {
                lemmas.push(token.to_lowercase());
                let tag = if token.chars().next().is_some_and(char::is_uppercase) {
                    "NOUN"
                } else {
                    "X"
                };
                tags.push(tag.to_string());
            }
            LinguisticFeatures {
                lemma_text: lemmas.join(" "),
                pos_seq: tags.join(" "),
                pos_text: tags.join("_"),
            }
        }
    }

    #[test]
    fn test_empty_sentence_all_empty() {
        let features = StubAnnotator.annotate("");
        assert_eq!(features, LinguisticFeatures::default());
    }

    #[test]
    fn test_joined_field_shapes() {
        let features = StubAnnotator.annotate("Телефон працює добре");
        assert_eq!(features.lemma_text, "телефон працює добре");
        assert_eq!(features.pos_seq, "NOUN X X");
        assert_eq!(features.pos_text, "NOUN_X_X");
    }

    #[test]
    fn test_filter_by_pos() {
        let allowed: HashSet<String> = ["NOUN".to_string()].into_iter().collect();
        let filtered = StubAnnotator.filter_by_pos("Телефон працює Добре так", &allowed);
        assert_eq!(filtered, "телефон добре");
    }

    #[test]
    fn test_filter_empty_input() {
        let allowed = HashSet::new();
        assert_eq!(StubAnnotator.filter_by_pos("", &allowed), "");
    }

    #[test]
    fn test_features_serialize() {
        let features = StubAnnotator.annotate("Все ок");
        let json = serde_json::to_string(&features).unwrap();
        let back: LinguisticFeatures = serde_json::from_str(&json).unwrap();
        assert_eq!(back, features);
    }
}
