// WHY: Candidate boundaries come from a compiled pattern scan, but
// suppression is an explicit variable-length lookback against the
// abbreviation set. Lookaround assertions cannot express "the token before
// this mark" because abbreviation length varies per entry.

use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::debug;

pub mod abbreviations;

pub use abbreviations::AbbreviationSet;

/// Sentence splitter for normalized review text.
///
/// A candidate boundary is a sentence-final mark (`.`, `!`, `?`) followed by
/// whitespace and an uppercase Ukrainian or Latin letter. A candidate is
/// suppressed when the token before the mark is a known abbreviation.
pub struct SentenceSegmenter {
    boundary: Regex,
    abbreviations: AbbreviationSet,
}

impl SentenceSegmenter {
    pub fn new(abbreviations: AbbreviationSet) -> Result<Self> {
        // The uppercase class spells out the Ukrainian letters that sit
        // outside the base А-Я range
        let boundary = Regex::new(r"[.!?]\s+[А-ЯІЇЄҐA-Z]")?;
        Ok(Self {
            boundary,
            abbreviations,
        })
    }

    pub fn with_default_abbreviations() -> Result<Self> {
        Self::new(AbbreviationSet::new())
    }

    /// Split `text` into trimmed sentences. Fragments of one character or
    /// less are discarded. Text with no candidate boundaries comes back as a
    /// single sentence; empty text yields an empty vector.
    pub fn segment(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut sentences = Vec::new();
        let mut start = 0;
        for m in self.boundary.find_iter(text) {
            // the matched mark is the last of its run; everything before it
            // is the literal lookback context
            if self.abbreviations.ends_with_abbreviation(&text[..m.start()]) {
                continue;
            }

            let mark_end = m.start() + 1;
            let upper_len = text[..m.end()]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            push_sentence(&mut sentences, &text[start..mark_end]);
            start = m.end() - upper_len;
        }
        push_sentence(&mut sentences, &text[start..]);

        debug!(count = sentences.len(), "segmented sentences");
        sentences
    }
}

fn push_sentence(out: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.chars().count() > 1 {
        out.push(trimmed.to_string());
    }
}
