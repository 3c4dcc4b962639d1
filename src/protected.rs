// WHY: Placeholder tokens inserted by the masker must survive every later
// rewrite stage byte-for-byte. Splitting text into tagged segments makes that
// guarantee a data-structure property instead of a regex convention.

/// The closed placeholder vocabulary emitted by the PII masker.
pub const PLACEHOLDER_TOKENS: &[&str] = &["<URL>", "<EMAIL>", "<PHONE>", "<ID>"];

/// One span of input text: either an opaque placeholder token or ordinary
/// content that rewrite stages may transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub protected: bool,
    pub text: &'a str,
}

/// Split `text` into alternating content and placeholder segments, preserving
/// order and adjacency. Concatenating the segment texts reproduces the input
/// exactly.
pub fn split_protected(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match find_next_placeholder(rest) {
            Some((start, token_len)) => {
                if start > 0 {
                    segments.push(Segment {
                        protected: false,
                        text: &rest[..start],
                    });
                }
                segments.push(Segment {
                    protected: true,
                    text: &rest[start..start + token_len],
                });
                rest = &rest[start + token_len..];
            }
            None => {
                segments.push(Segment {
                    protected: false,
                    text: rest,
                });
                break;
            }
        }
    }

    segments
}

/// Apply `transform` to every content segment, pass placeholder segments
/// through verbatim, and join the results back in order.
pub fn map_content<F>(text: &str, mut transform: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    for segment in split_protected(text) {
        if segment.protected {
            out.push_str(segment.text);
        } else {
            out.push_str(&transform(segment.text));
        }
    }
    out
}

/// Find the earliest placeholder occurrence in `text`.
/// Returns the byte offset and the token length.
fn find_next_placeholder(text: &str) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for token in PLACEHOLDER_TOKENS {
        if let Some(pos) = text.find(token) {
            let candidate = (pos, token.len());
            best = match best {
                Some(current) if current.0 <= pos => Some(current),
                _ => Some(candidate),
            };
        }
    }
    best
}
