// ABOUTME: Locates `{{...}}` tokens in template text
// ABOUTME: Honours backslash escapes and quoted filter arguments when searching for the closing braces

use std::ops::Range;

/// Byte ranges of every `{{...}}` token, in document order.
///
/// A `{{` with no closing `}}` is left as plain text. Inside a variable
/// token, quotes only matter within filter-argument parentheses, and a
/// `|default=` literal is taken verbatim up to the next `}}`.
pub(crate) fn scan(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find("{{") {
        let start = pos + offset;
        let body_start = start + 2;

        match find_close(text.as_bytes(), body_start) {
            Some(end) => {
                spans.push(start..end);
                pos = end;
            }
            None => pos = body_start,
        }

        if pos >= text.len() {
            break;
        }
    }

    spans
}

const DEFAULT_MARKER: &[u8] = b"|default=";

fn find_braces(bytes: &[u8], from: usize) -> Option<usize> {
    bytes[from..]
        .windows(2)
        .position(|w| w == b"}}")
        .map(|p| from + p + 2)
}

/// Returns the offset just past the closing `}}`.
fn find_close(bytes: &[u8], body_start: usize) -> Option<usize> {
    let variable_form = bytes.get(body_start) == Some(&b'$');
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = body_start;

    while i < bytes.len() {
        let b = bytes[i];

        if b == b'\\' {
            i += 2;
            continue;
        }

        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'|' if variable_form && depth == 0 && bytes[i..].starts_with(DEFAULT_MARKER) => {
                return find_braces(bytes, i + DEFAULT_MARKER.len());
            }
            b'"' | b'\'' if variable_form && depth > 0 => quote = Some(b),
            b'(' if variable_form => depth += 1,
            b')' if variable_form => depth = depth.saturating_sub(1),
            b'}' if bytes.get(i + 1) == Some(&b'}') => return Some(i + 2),
            _ => {}
        }
        i += 1;
    }

    None
}
