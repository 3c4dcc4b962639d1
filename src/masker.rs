use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::debug;

use crate::cleaner::collapse_whitespace;

/// Currency and unit suffixes that mark a digit run as a price or quantity
/// rather than an identifier.
pub const UNIT_SUFFIXES: &[&str] = &[
    "грн", "uah", "₴", "шт", "кг", "г", "мл", "л", "см", "мм", "км", "%",
];

/// Cue words that mark a following digit run as an order number or code.
pub const ID_CUE_WORDS: &[&str] = &[
    "замовлення", "номер", "код", "артикул", "ттн", "order", "no",
];

/// Pattern-based PII redaction. Categories are applied in a fixed precedence
/// order: email, URL, identifier, phone. Earlier categories are the more
/// specific ones; running them first keeps a later, broader pattern from
/// swallowing an already-disambiguated match (a phone-like digit run inside
/// an email, an email domain re-matched as a bare URL).
pub struct PiiMasker {
    email: Regex,
    url: Regex,
    digit_run: Regex,
    phone: Regex,
    duplicate_collapse: Vec<(Regex, &'static str)>,
    unit_suffixes: Vec<String>,
    id_cue_words: Vec<String>,
}

impl PiiMasker {
    pub fn new() -> Result<Self> {
        Self::with_rules(
            UNIT_SUFFIXES.iter().map(|s| s.to_string()),
            ID_CUE_WORDS.iter().map(|s| s.to_string()),
        )
    }

    /// Build a masker with externally supplied unit-suffix and cue-word lists.
    pub fn with_rules<U, C>(unit_suffixes: U, id_cue_words: C) -> Result<Self>
    where
        U: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        let email = Regex::new(r"\S+@\S+")?;

        // scheme-prefixed, www-prefixed, or bare domain with a known TLD
        let url = Regex::new(
            r"(?i)(?:https?://\S+|www\.\S+|[a-z0-9][a-z0-9\-]*(?:\.[a-z0-9\-]+)*\.(?:ua|com|net|org|info|biz|shop|store|site|online)(?:/\S*)?)",
        )?;

        let digit_run = Regex::new(r"[0-9]{5,}")?;

        // The original grouping: optional country prefix, 3-3-2-2 digit
        // groups, tolerant of space/dot/dash separators and parentheses
        let phone =
            Regex::new(r"(?:\+?38)?\s?\(?[0-9]{3}\)?[\s.-]?[0-9]{3}[\s.-]?[0-9]{2}[\s.-]?[0-9]{2}")?;

        let duplicate_collapse = crate::protected::PLACEHOLDER_TOKENS
            .iter()
            .map(|token| {
                let pattern = format!(r"{token}(?:\s+{token})+");
                Regex::new(&pattern).map(|re| (re, *token))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            email,
            url,
            digit_run,
            phone,
            duplicate_collapse,
            unit_suffixes: unit_suffixes.into_iter().map(|s| s.to_lowercase()).collect(),
            id_cue_words: id_cue_words
                .into_iter()
                .map(|s| s.trim_end_matches('.').to_lowercase())
                .collect(),
        })
    }

    /// Replace every detected PII span with its space-padded placeholder
    /// token, collapse consecutive same-kind placeholders, collapse
    /// whitespace. Unmatched text passes through unchanged; never fails.
    pub fn mask(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let masked = replace_all(&self.email, text, " <EMAIL> ");
        let masked = replace_all(&self.url, &masked, " <URL> ");
        let masked = self.mask_identifiers(&masked);
        let masked = self.mask_phones(&masked);

        let mut collapsed = masked;
        for (pattern, token) in &self.duplicate_collapse {
            collapsed = replace_all(pattern, &collapsed, token);
        }

        let result = collapse_whitespace(&collapsed);
        debug!(input_len = text.len(), output_len = result.len(), "masked pii");
        result
    }

    /// Mask order numbers and other numeric identifiers.
    ///
    /// A digit run is an identifier when a cue word or `№`/`#` precedes it,
    /// or when it is a free-standing run of 5-9 digits (or 13+, card-number
    /// territory). Runs followed by a currency/unit suffix are prices or
    /// quantities and stay. Runs of 10-12 digits without a cue are left for
    /// the phone stage, which understands their grouping.
    fn mask_identifiers(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.digit_run.find_iter(text) {
            let digits = m.end() - m.start();
            let cued = self.has_id_cue(&text[..m.start()]);
            let unit_follows = self.unit_suffix_follows(&text[m.end()..]);
            let glued_to_letter = touches_letter(text, m.start(), m.end());

            let is_id = if cued {
                true
            } else if unit_follows || glued_to_letter {
                // price, quantity, or the numeric tail of a product code
                false
            } else {
                (5..=9).contains(&digits) || digits >= 13
            };

            if is_id {
                out.push_str(&text[last..m.start()]);
                out.push_str(" <ID> ");
                last = m.end();
            }
        }
        out.push_str(&text[last..]);
        out
    }

    /// Mask phone numbers, guarding against partial matches inside longer
    /// digit runs the identifier stage deliberately skipped.
    fn mask_phones(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.phone.find_iter(text) {
            if digit_adjacent(text, m.start(), m.end()) {
                continue;
            }
            out.push_str(&text[last..m.start()]);
            out.push_str(" <PHONE> ");
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }

    /// Variable-length lookback for an identifier cue: `№`/`#` directly
    /// before the run, or a cue word one token back.
    fn has_id_cue(&self, before: &str) -> bool {
        let trimmed = before.trim_end();
        if trimmed.ends_with('№') || trimmed.ends_with('#') {
            return true;
        }
        let tail = trimmed
            .trim_end_matches(|c| matches!(c, '№' | '#' | ':'))
            .trim_end();
        let word_start = tail
            .char_indices()
            .rev()
            .take_while(|(_, ch)| ch.is_alphabetic() || *ch == '.')
            .last()
            .map(|(idx, _)| idx);
        match word_start {
            Some(idx) => {
                let word = tail[idx..].trim_end_matches('.').to_lowercase();
                self.id_cue_words.contains(&word)
            }
            None => false,
        }
    }

    /// Check whether the text after a digit run starts with a currency or
    /// unit suffix at a token boundary, ignoring intervening spaces.
    fn unit_suffix_follows(&self, after: &str) -> bool {
        let rest = after.trim_start_matches(' ');
        let window: String = rest.chars().take(8).collect::<String>().to_lowercase();
        self.unit_suffixes.iter().any(|suffix| {
            window.starts_with(suffix.as_str())
                && window[suffix.len()..]
                    .chars()
                    .next()
                    .map_or(true, |ch| !ch.is_alphanumeric())
        })
    }
}

/// True when the span at `start..end` directly touches a letter on either
/// side (no separating whitespace or punctuation).
fn touches_letter(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(char::is_alphabetic) || after.is_some_and(char::is_alphabetic)
}

/// True when the span at `start..end` has a digit directly on either side.
fn digit_adjacent(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
}

/// Replace every match of `pattern` in `text` with `replacement`.
/// regex-automata exposes match iteration only, so substitution is an
/// explicit rebuild.
fn replace_all(pattern: &Regex, text: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in pattern.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        out.push_str(replacement);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masker() -> PiiMasker {
        PiiMasker::new().unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(masker().mask(""), "");
    }

    #[test]
    fn test_email_masked() {
        let out = masker().mask("Пишіть на test@mail.com будь ласка");
        assert_eq!(out, "Пишіть на <EMAIL> будь ласка");
    }

    #[test]
    fn test_email_not_rematched_as_url() {
        let out = masker().mask("test@rozetka.com.ua");
        assert_eq!(out, "<EMAIL>");
        assert!(!out.contains("<URL>"));
    }

    #[test]
    fn test_scheme_url_masked() {
        let out = masker().mask("Дивіться https://prom.ua/product/123456 тут");
        assert_eq!(out, "Дивіться <URL> тут");
    }

    #[test]
    fn test_www_url_masked() {
        assert_eq!(masker().mask("на www.rozetka.com.ua є"), "на <URL> є");
    }

    #[test]
    fn test_bare_domain_masked() {
        assert_eq!(masker().mask("сайт olx.ua норм"), "сайт <URL> норм");
        assert_eq!(masker().mask("на rozetka.com.ua замовив"), "на <URL> замовив");
    }

    #[test]
    fn test_plain_words_not_urls() {
        let out = masker().mask("це не сайт, і т.д. і т.п.");
        assert!(!out.contains("<URL>"), "output: {out}");
    }

    #[test]
    fn test_phone_with_country_prefix() {
        let out = masker().mask("телефонуйте +380501234567");
        assert_eq!(out, "телефонуйте <PHONE>");
    }

    #[test]
    fn test_phone_with_separators() {
        let cases = [
            "050 123 45 67",
            "(050) 123-45-67",
            "050.123.45.67",
            "38 050 123 45 67",
        ];
        for case in cases {
            let out = masker().mask(case);
            assert_eq!(out, "<PHONE>", "input: {case}");
        }
    }

    #[test]
    fn test_order_number_masked() {
        let out = masker().mask("замовлення №49012345 прийшло");
        assert_eq!(out, "замовлення № <ID> прийшло");
    }

    #[test]
    fn test_cue_word_masked() {
        let out = masker().mask("код 12345 не спрацював");
        assert_eq!(out, "код <ID> не спрацював");
    }

    #[test]
    fn test_bare_digit_run_masked() {
        let out = masker().mask("трек 1234567890123 для відстеження");
        assert_eq!(out, "трек <ID> для відстеження");
        assert_eq!(masker().mask("це 123456"), "це <ID>");
    }

    #[test]
    fn test_price_not_masked() {
        assert_eq!(masker().mask("коштує 15000 грн"), "коштує 15000 грн");
        assert_eq!(masker().mask("вага 10000 г"), "вага 10000 г");
        assert_eq!(masker().mask("заряд 20000%"), "заряд 20000%");
    }

    #[test]
    fn test_glued_price_not_masked() {
        assert_eq!(masker().mask("віддав 15000грн"), "віддав 15000грн");
    }

    #[test]
    fn test_cue_overrides_unit_suffix() {
        // the cue word wins over a unit suffix that happens to follow
        let out = masker().mask("номер 123456 г");
        assert!(out.contains("<ID>"), "output: {out}");
    }

    #[test]
    fn test_product_code_digits_not_masked() {
        let out = masker().mask("модель ABC123456 супер");
        assert_eq!(out, "модель ABC123456 супер");
    }

    #[test]
    fn test_short_digit_runs_untouched() {
        assert_eq!(masker().mask("оцінка 10 з 10, рік 2024"), "оцінка 10 з 10, рік 2024");
    }

    #[test]
    fn test_email_and_phone_together() {
        let out = masker().mask("Пишіть на test@mail.com або +380501234567");
        assert_eq!(out.matches("<EMAIL>").count(), 1);
        assert_eq!(out.matches("<PHONE>").count(), 1);
        assert!(!out.contains("test@mail.com"));
        assert!(!out.contains("0501234567"));
    }

    #[test]
    fn test_duplicate_placeholders_collapse() {
        let out = masker().mask("050 123 45 67 066 765 43 21");
        assert_eq!(out, "<PHONE>");
    }

    #[test]
    fn test_different_placeholders_not_collapsed() {
        let out = masker().mask("olx.ua 050 123 45 67");
        assert_eq!(out, "<URL> <PHONE>");
    }

    #[test]
    fn test_placeholders_space_separated() {
        let out = masker().mask("сайтhttps://olx.ua,тел.0501234567");
        assert!(out.contains(" <URL>") || out.starts_with("<URL>") || out.contains("<URL> "));
        // no placeholder ever fuses with adjacent content
        for token in crate::protected::PLACEHOLDER_TOKENS {
            for (idx, _) in out.match_indices(token) {
                let before_ok = idx == 0 || out[..idx].ends_with(' ');
                let tail = &out[idx + token.len()..];
                let after_ok = tail.is_empty() || tail.starts_with(' ');
                assert!(before_ok && after_ok, "fused placeholder in: {out}");
            }
        }
    }

    #[test]
    fn test_no_pii_passes_through() {
        let text = "Чудовий товар, якість на висоті!";
        assert_eq!(masker().mask(text), text);
    }
}
