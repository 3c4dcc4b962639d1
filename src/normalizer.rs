use std::collections::HashMap;

use crate::protected::map_content;
use crate::segmenter::abbreviations::AbbreviationSet;

/// Latin code points that render near-identically to Cyrillic letters in the
/// fonts marketplace users type with. The mapping is directional: Latin
/// characters become their Cyrillic look-alikes, never the reverse.
pub const LATIN_TO_CYRILLIC: &[(char, char)] = &[
    ('a', 'а'),
    ('e', 'е'),
    ('o', 'о'),
    ('p', 'р'),
    ('x', 'х'),
    ('c', 'с'),
    ('i', 'і'),
    ('y', 'у'),
    ('A', 'А'),
    ('E', 'Е'),
    ('O', 'О'),
    ('P', 'Р'),
    ('X', 'Х'),
    ('C', 'С'),
    ('I', 'І'),
    ('H', 'Н'),
    ('M', 'М'),
    ('T', 'Т'),
];

/// Immutable one-to-one Latin-to-Cyrillic substitution table.
#[derive(Debug, Clone)]
pub struct HomoglyphMap {
    map: HashMap<char, char>,
}

impl HomoglyphMap {
    pub fn new() -> Self {
        Self::from_pairs(LATIN_TO_CYRILLIC.iter().copied())
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, char)>,
    {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    pub fn substitute(&self, ch: char) -> char {
        self.map.get(&ch).copied().unwrap_or(ch)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for HomoglyphMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Character-level normalization: homoglyph substitution, apostrophe
/// unification, spacing repair, caps-lock folding and punctuation-run
/// compression. Placeholder tokens pass through byte-for-byte.
pub struct ContentNormalizer {
    homoglyphs: HomoglyphMap,
    abbreviations: AbbreviationSet,
    unit_suffixes: Vec<String>,
}

impl ContentNormalizer {
    pub fn new(
        homoglyphs: HomoglyphMap,
        abbreviations: AbbreviationSet,
        unit_suffixes: Vec<String>,
    ) -> Self {
        Self {
            homoglyphs,
            abbreviations,
            // spacing repair applies to spelled-out units only; symbols like
            // ₴ and % stay glued to their numbers
            unit_suffixes: unit_suffixes
                .into_iter()
                .map(|s| s.to_lowercase())
                .filter(|s| s.chars().all(char::is_alphabetic))
                .collect(),
        }
    }

    /// Normalize the content spans of `text`, leaving placeholder spans
    /// untouched. Idempotent on its own output.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        map_content(text, |span| self.normalize_span(span))
    }

    /// Substage order inside one content span. Homoglyphs go first so every
    /// later comparison sees the canonical script; spacing repair goes before
    /// caps folding so a unit glued to a shouted number ("500ГРН") is split
    /// and then folded in the same pass, keeping the whole function
    /// idempotent.
    fn normalize_span(&self, span: &str) -> String {
        let step = self.substitute_homoglyphs(span);
        let step = unify_apostrophes(&step);
        let step = self.repair_abbreviation_spacing(&step);
        let step = self.repair_unit_spacing(&step);
        let step = fold_caps_tokens(&step);
        compress_punctuation_runs(&step)
    }

    /// Total character substitution, except inside digit-bearing tokens:
    /// those are product codes and article numbers ("QE55Q90") whose Latin
    /// letters are genuine.
    fn substitute_homoglyphs(&self, span: &str) -> String {
        let mut out = String::with_capacity(span.len());
        for token in split_word_tokens(span) {
            match token {
                WordToken::Word(word) if !word.chars().any(|c| c.is_ascii_digit()) => {
                    for ch in word.chars() {
                        out.push(self.homoglyphs.substitute(ch));
                    }
                }
                WordToken::Word(word) => out.push_str(word),
                WordToken::Other(other) => out.push_str(other),
            }
        }
        out
    }

    /// Insert a missing space after an abbreviation period that directly
    /// abuts a capitalized word: "вул.Київ" becomes "вул. Київ".
    fn repair_abbreviation_spacing(&self, span: &str) -> String {
        let mut out = String::with_capacity(span.len() + 4);
        let mut iter = span.char_indices().peekable();
        while let Some((idx, ch)) = iter.next() {
            out.push(ch);
            if ch == '.' {
                let follows_upper = iter
                    .peek()
                    .map_or(false, |(_, next)| next.is_uppercase() && next.is_alphabetic());
                if follows_upper && self.abbreviations.ends_with_abbreviation(&span[..idx]) {
                    out.push(' ');
                }
            }
        }
        out
    }

    /// Insert a missing space between a numeral and an immediately following
    /// spelled-out unit: "500грн" becomes "500 грн".
    fn repair_unit_spacing(&self, span: &str) -> String {
        let mut out = String::with_capacity(span.len() + 4);
        let mut prev_is_digit = false;
        for (idx, ch) in span.char_indices() {
            if prev_is_digit && ch.is_alphabetic() {
                let run: String = span[idx..]
                    .chars()
                    .take_while(|c| c.is_alphabetic())
                    .collect::<String>()
                    .to_lowercase();
                if self.unit_suffixes.contains(&run) {
                    out.push(' ');
                }
            }
            out.push(ch);
            prev_is_digit = ch.is_ascii_digit();
        }
        out
    }
}

/// Collapse every apostrophe-like mark to the plain ASCII apostrophe.
fn unify_apostrophes(span: &str) -> String {
    span.chars()
        .map(|ch| match ch {
            '`' | '´' | '’' | '‘' | 'ʼ' => '\'',
            other => other,
        })
        .collect()
}

/// Lowercase whole-word shouting. A token qualifies when it has at least two
/// letters, every letter is uppercase, and no digit is present; digit-bearing
/// tokens are product codes and keep their case.
fn fold_caps_tokens(span: &str) -> String {
    let mut out = String::with_capacity(span.len());
    for token in split_word_tokens(span) {
        match token {
            WordToken::Word(word) => {
                let letters = word.chars().filter(|c| c.is_alphabetic());
                let has_digit = word.chars().any(|c| c.is_ascii_digit());
                let letter_count = letters.clone().count();
                let all_upper = letters.clone().all(char::is_uppercase);
                if !has_digit && letter_count >= 2 && all_upper {
                    out.extend(word.chars().flat_map(char::to_lowercase));
                } else {
                    out.push_str(word);
                }
            }
            WordToken::Other(other) => out.push_str(other),
        }
    }
    out
}

/// Compress shouting punctuation: `!` and `?` runs cap at two, period runs
/// of four or more become a three-dot ellipsis. Shorter runs keep their
/// length so "..." and ".." survive as written.
fn compress_punctuation_runs(span: &str) -> String {
    let mut out = String::with_capacity(span.len());
    let mut chars = span.chars().peekable();
    while let Some(ch) = chars.next() {
        if matches!(ch, '!' | '?' | '.') {
            let mut run_len = 1;
            while chars.peek() == Some(&ch) {
                chars.next();
                run_len += 1;
            }
            let keep = match ch {
                '!' | '?' => run_len.min(2),
                _ => {
                    if run_len >= 4 {
                        3
                    } else {
                        run_len
                    }
                }
            };
            for _ in 0..keep {
                out.push(ch);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// A word token (letters, digits, apostrophes) or the separator text
/// between word tokens.
enum WordToken<'a> {
    Word(&'a str),
    Other(&'a str),
}

/// Split a span into word tokens and separators, losslessly.
fn split_word_tokens(span: &str) -> impl Iterator<Item = WordToken<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_word = false;
    for (idx, ch) in span.char_indices() {
        let word_char = ch.is_alphanumeric() || ch == '\'';
        if word_char != in_word {
            if idx > start {
                tokens.push(if in_word {
                    WordToken::Word(&span[start..idx])
                } else {
                    WordToken::Other(&span[start..idx])
                });
            }
            start = idx;
            in_word = word_char;
        }
    }
    if start < span.len() {
        tokens.push(if in_word {
            WordToken::Word(&span[start..])
        } else {
            WordToken::Other(&span[start..])
        });
    }
    tokens.into_iter()
}
