use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::debug;

/// UI boilerplate injected by marketplace frontends into scraped review text.
/// Matched case-insensitively as whole words and replaced with a space.
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "розгорнутим",
    "розгорнути",
    "згорнути",
    "читати далі",
    "відповідь",
    "показати більше",
    "детальніше",
];

/// First pipeline stage: HTML-entity decoding, boilerplate phrase removal and
/// whitespace canonicalization.
pub struct BoilerplateCleaner {
    phrase_pattern: Option<Regex>,
}

impl BoilerplateCleaner {
    /// Create a cleaner with the default marketplace phrase set.
    pub fn new() -> Result<Self> {
        Self::with_phrases(BOILERPLATE_PHRASES.iter().copied())
    }

    /// Create a cleaner with an externally supplied phrase set.
    pub fn with_phrases<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let escaped: Vec<String> = phrases
            .into_iter()
            .map(|p| escape_literal(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();

        let phrase_pattern = if escaped.is_empty() {
            None
        } else {
            // WHY: alternation of whole-word literals; \b is Unicode-aware so
            // Cyrillic word boundaries behave the same as Latin ones
            let pattern = format!(r"(?i)\b(?:{})\b", escaped.join("|"));
            Some(Regex::new(&pattern)?)
        };

        Ok(Self { phrase_pattern })
    }

    /// Decode HTML character references, drop boilerplate phrases and
    /// invisible characters, collapse whitespace. Empty input yields an empty
    /// string; no input can make this fail.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let decoded = decode_entities(text);

        let stripped = match &self.phrase_pattern {
            Some(pattern) => {
                let mut out = String::with_capacity(decoded.len());
                let mut last = 0;
                for m in pattern.find_iter(&decoded) {
                    out.push_str(&decoded[last..m.start()]);
                    out.push(' ');
                    last = m.end();
                }
                out.push_str(&decoded[last..]);
                out
            }
            None => decoded,
        };

        let visible: String = stripped
            .chars()
            .filter(|ch| !matches!(ch, '\u{200B}' | '\u{FEFF}' | '\u{00AD}'))
            .collect();

        let cleaned = collapse_whitespace(&visible);
        debug!(input_len = text.len(), output_len = cleaned.len(), "cleaned review text");
        cleaned
    }
}

/// Collapse every whitespace run into a single space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Backslash-escape regex metacharacters so configured phrases are always
/// treated as literals.
fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() && !ch.is_ascii_alphanumeric() && !ch.is_ascii_whitespace() {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Decode HTML character references into literal Unicode.
/// Handles the named entities seen in marketplace dumps plus numeric
/// `&#NNN;` / `&#xHH;` forms; unknown references pass through unchanged.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        // An entity body is short; a distant semicolon means a bare ampersand
        match tail[1..].find(';').filter(|&semi| semi <= 10) {
            Some(semi) => match decode_entity(&tail[1..1 + semi]) {
                Some(decoded) => {
                    out.push_str(&decoded);
                    rest = &tail[semi + 2..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "laquo" => "«",
        "raquo" => "»",
        "ndash" => "–",
        "mdash" => "—",
        "hellip" => "…",
        // soft hyphen carries no content
        "shy" => "",
        _ => return None,
    };
    Some(decoded.to_string())
}
