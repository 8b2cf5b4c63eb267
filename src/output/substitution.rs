// ABOUTME: Single pass that replaces placeholder occurrences with resolved text
// ABOUTME: Replays parsed spans in document order so resolved text is never rescanned

use tracing::debug;

use crate::engine::ResolutionCache;
use crate::parser::ParsedTemplate;

pub fn substitute(parsed: &ParsedTemplate, cache: &ResolutionCache) -> String {
    let text = parsed.text();
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;

    for occurrence in parsed.occurrences() {
        output.push_str(&text[cursor..occurrence.span.start]);
        let raw = &parsed.placeholder_at(occurrence).raw;
        match cache.get(raw) {
            Some(resolved) => output.push_str(resolved),
            None => {
                debug!("No resolution cached for {}; leaving it in place", raw);
                output.push_str(raw);
            }
        }
        cursor = occurrence.span.end;
    }

    output.push_str(&text[cursor..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_occurrence_replaced() {
        let parsed = ParsedTemplate::parse("{{$a}} and {{$b}} and {{$a}}");
        let mut cache = ResolutionCache::new();
        cache.insert("{{$a}}", "A");
        cache.insert("{{$b}}", "{{$a}}");

        // Resolved text that looks like a placeholder stays literal.
        assert_eq!(substitute(&parsed, &cache), "A and {{$a}} and A");
    }

    #[test]
    fn test_no_placeholders_is_verbatim() {
        let parsed = ParsedTemplate::parse("plain {{ text");
        assert_eq!(substitute(&parsed, &ResolutionCache::new()), "plain {{ text");
    }
}
