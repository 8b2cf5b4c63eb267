// ABOUTME: Filter functions shared by text-producing variable types
// ABOUTME: Includes case conversion, truncation, affixes, replacement, and argument helpers

use super::error::{Result, VariableError};
use super::{Candidate, Filter};

pub const TEXT_FILTERS: &[&str] = &[
    "upper", "lower", "trim", "truncate", "lines", "prefix", "suffix", "replace",
];

pub fn text_filter(name: &str) -> Option<Filter> {
    let filter: Filter = match name {
        "upper" => upper,
        "lower" => lower,
        "trim" => trim,
        "truncate" => truncate,
        "lines" => lines,
        "prefix" => prefix,
        "suffix" => suffix,
        "replace" => replace,
        _ => return None,
    };
    Some(filter)
}

fn map_text(candidates: Vec<Candidate>, f: impl Fn(&str) -> String) -> Vec<Candidate> {
    candidates
        .into_iter()
        .map(|candidate| match candidate {
            Candidate::Text(text) => Candidate::Text(f(&text)),
            other => other,
        })
        .collect()
}

fn upper(candidates: Vec<Candidate>, _arg: Option<&str>) -> Result<Vec<Candidate>> {
    Ok(map_text(candidates, str::to_uppercase))
}

fn lower(candidates: Vec<Candidate>, _arg: Option<&str>) -> Result<Vec<Candidate>> {
    Ok(map_text(candidates, str::to_lowercase))
}

fn trim(candidates: Vec<Candidate>, _arg: Option<&str>) -> Result<Vec<Candidate>> {
    Ok(map_text(candidates, |s| s.trim().to_string()))
}

fn truncate(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let count = count_argument("truncate", arg)?;
    Ok(map_text(candidates, |s| s.chars().take(count).collect()))
}

fn lines(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let count = count_argument("lines", arg)?;
    Ok(map_text(candidates, |s| {
        s.lines().take(count).collect::<Vec<_>>().join("\n")
    }))
}

fn prefix(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let value = text_argument("prefix", arg)?;
    Ok(map_text(candidates, |s| format!("{}{}", value, s)))
}

fn suffix(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let value = text_argument("suffix", arg)?;
    Ok(map_text(candidates, |s| format!("{}{}", s, value)))
}

fn replace(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let raw = arg.ok_or_else(|| VariableError::MissingArgument {
        filter: "replace".to_string(),
    })?;
    let parts = split_arguments(raw);
    let [from, to] = parts.as_slice() else {
        return Err(VariableError::InvalidArgument {
            filter: "replace".to_string(),
            message: format!("expected two arguments, got {}", parts.len()),
        });
    };
    if from.is_empty() {
        return Err(VariableError::InvalidArgument {
            filter: "replace".to_string(),
            message: "search text cannot be empty".to_string(),
        });
    }
    Ok(map_text(candidates, |s| s.replace(from.as_str(), to)))
}

/// Parse a non-negative count such as `5` or `"5"`.
pub fn count_argument(filter: &str, arg: Option<&str>) -> Result<usize> {
    let raw = arg.ok_or_else(|| VariableError::MissingArgument {
        filter: filter.to_string(),
    })?;
    let value = unquote(raw.trim());
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| VariableError::InvalidArgument {
            filter: filter.to_string(),
            message: format!("'{}' is not a non-negative integer", raw),
        })
}

/// A single textual argument, unquoted when wrapped in quotes.
pub fn text_argument(filter: &str, arg: Option<&str>) -> Result<String> {
    let raw = arg.ok_or_else(|| VariableError::MissingArgument {
        filter: filter.to_string(),
    })?;
    Ok(unquote(raw.trim()))
}

/// Strip one pair of matching quotes and resolve backslash escapes inside.
/// Unquoted input is returned unchanged.
pub fn unquote(raw: &str) -> String {
    let mut chars = raw.chars();
    let quote = match chars.next() {
        Some(q @ ('"' | '\'')) if raw.len() >= 2 && raw.ends_with(q) => q,
        _ => return raw.to_string(),
    };

    let inner = &raw[quote.len_utf8()..raw.len() - quote.len_utf8()];
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Split on commas that sit outside quotes, then unquote each part.
pub fn split_arguments(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in raw.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => {
                current.push(c);
                escaped = true;
            }
            (Some(q), c) if c == q => {
                current.push(c);
                quote = None;
            }
            (None, '"' | '\'') => {
                current.push(c);
                quote = Some(c);
            }
            (None, ',') => {
                parts.push(unquote(current.trim()));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(unquote(current.trim()));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Vec<Candidate> {
        vec![Candidate::Text(s.to_string())]
    }

    fn apply(name: &str, input: &str, arg: Option<&str>) -> String {
        let filter = text_filter(name).unwrap();
        match filter(text(input), arg).unwrap().remove(0) {
            Candidate::Text(s) => s,
            other => panic!("unexpected candidate {:?}", other),
        }
    }

    #[test]
    fn test_case_filters() {
        assert_eq!(apply("upper", "Hello", None), "HELLO");
        assert_eq!(apply("lower", "Hello", None), "hello");
        assert_eq!(apply("trim", "  hi \n", None), "hi");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(apply("truncate", "hello world", Some("5")), "hello");
        assert_eq!(apply("truncate", "héllo", Some("\"2\"")), "hé");
        assert_eq!(apply("truncate", "ab", Some("10")), "ab");
    }

    #[test]
    fn test_lines() {
        assert_eq!(apply("lines", "a\nb\nc", Some("2")), "a\nb");
    }

    #[test]
    fn test_affixes_unquote_arguments() {
        assert_eq!(apply("prefix", "x", Some("'> '")), "> x");
        assert_eq!(apply("suffix", "x", Some(r#""\"!""#)), "x\"!");
        assert_eq!(apply("suffix", "x", Some("!")), "x!");
    }

    #[test]
    fn test_replace_with_quoted_comma() {
        assert_eq!(apply("replace", "a,b", Some(r#"",", " + ""#)), "a + b");
        assert_eq!(apply("replace", "foo", Some("o, 0")), "f00");
    }

    #[test]
    fn test_argument_errors() {
        let truncate = text_filter("truncate").unwrap();
        assert!(matches!(
            truncate(text("x"), None),
            Err(VariableError::MissingArgument { .. })
        ));
        assert!(matches!(
            truncate(text("x"), Some("five")),
            Err(VariableError::InvalidArgument { .. })
        ));

        let replace = text_filter("replace").unwrap();
        assert!(matches!(
            replace(text("x"), Some("only-one")),
            Err(VariableError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_non_text_candidates_pass_through() {
        let filter = text_filter("upper").unwrap();
        let path = Candidate::Path("a/b.md".into());
        assert_eq!(filter(vec![path.clone()], None).unwrap(), vec![path]);
    }

    #[test]
    fn test_unknown_filter() {
        assert!(text_filter("reverse").is_none());
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(split_arguments("a, 'b,c' ,d"), vec!["a", "b,c", "d"]);
        assert_eq!(split_arguments("single"), vec!["single"]);
    }
}
