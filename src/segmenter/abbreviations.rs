// WHY: Centralized abbreviation handling for sentence boundary detection
// A trailing period after these tokens does not end a sentence

use std::collections::HashSet;

/// Ukrainian abbreviations commonly found in marketplace reviews, stored
/// without the trailing period. "вул. Шевченка" and "100 грн. за шт." must
/// not produce sentence boundaries at the abbreviation periods.
pub const UKRAINIAN_ABBREVIATIONS: &[&str] = &[
    "ім", "вул", "грн", "обл", "р", "див", "п", "с", "м",
    "т.д", "т.п", "напр", "важ", "кг", "шт", "гр",
    "буд", "кв", "тел", "просп", "пров",
];

/// Immutable abbreviation lookup with case-insensitive, whole-token matching.
#[derive(Debug, Clone)]
pub struct AbbreviationSet {
    entries: HashSet<String>,
}

impl AbbreviationSet {
    /// Create the set with the default Ukrainian entries.
    pub fn new() -> Self {
        Self::from_entries(UKRAINIAN_ABBREVIATIONS.iter().copied())
    }

    /// Build a set from externally supplied entries.
    /// Entries are canonicalized: lowercased, trailing periods stripped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|e| e.as_ref().trim_end_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries }
    }

    /// Check if a single token is a known abbreviation.
    /// Surrounding periods are stripped so "вул", "вул." and ".вул" all
    /// resolve to the same entry, while interior periods ("т.д") survive.
    pub fn is_abbreviation(&self, token: &str) -> bool {
        let clean = token.trim_matches('.').to_lowercase();
        !clean.is_empty() && self.entries.contains(&clean)
    }

    /// Check if text ends with an abbreviation token.
    ///
    /// This is the variable-length lookback used at candidate sentence
    /// boundaries: the caller passes the literal text preceding the
    /// sentence-final mark, and the last whole token decides suppression.
    /// Token length depends on content, so no fixed-width window works here.
    pub fn ends_with_abbreviation(&self, text: &str) -> bool {
        match last_token(text) {
            Some(token) => self.is_abbreviation(token),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AbbreviationSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the trailing token of `text`: the maximal trailing run of
/// alphanumeric characters, periods and apostrophes. Periods are token
/// characters so multi-segment abbreviations like "т.д" come back whole.
fn last_token(text: &str) -> Option<&str> {
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        if ch.is_alphanumeric() || ch == '.' || ch == '\'' {
            start = idx;
        } else {
            break;
        }
    }
    if start == text.len() {
        None
    } else {
        Some(&text[start..])
    }
}
