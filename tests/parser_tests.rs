// ABOUTME: Integration tests for the placeholder parser
// ABOUTME: Tests whole templates mixing file literals, variables, malformed tokens and plain text

use promptweave::parser::{FilterCall, ParseError, ParsedTemplate, PlaceholderKind};

#[test]
fn test_parse_realistic_template() {
    let text = r#"# Review for {{$config.project_name:upper}}

Branch: {{$command.git_branch|default=main}}
Generated {{$timestamp:format('%Y-%m-%d')}}

## Readme
{{/README.md}}

## Sources
{{$file.src/**/*.rs:exclude("**/tests/**"):limit(3)}}

Again: {{$config.project_name:upper}}
"#;

    let parsed = ParsedTemplate::parse(text);

    assert_eq!(parsed.placeholders().len(), 5);
    assert_eq!(parsed.occurrences().len(), 6);
    assert_eq!(parsed.parse_errors().count(), 0);

    let kinds: Vec<&PlaceholderKind> = parsed.placeholders().iter().map(|p| &p.kind).collect();

    assert_eq!(
        kinds[0],
        &PlaceholderKind::Variable {
            type_name: "config".to_string(),
            key: "project_name".to_string(),
            filters: vec![FilterCall {
                name: "upper".to_string(),
                arg: None,
            }],
            default: None,
        }
    );
    assert_eq!(
        kinds[1],
        &PlaceholderKind::Variable {
            type_name: "command".to_string(),
            key: "git_branch".to_string(),
            filters: vec![],
            default: Some("main".to_string()),
        }
    );
    assert_eq!(
        kinds[2],
        &PlaceholderKind::Variable {
            type_name: "timestamp".to_string(),
            key: "timestamp".to_string(),
            filters: vec![FilterCall {
                name: "format".to_string(),
                arg: Some("'%Y-%m-%d'".to_string()),
            }],
            default: None,
        }
    );
    assert_eq!(
        kinds[3],
        &PlaceholderKind::File {
            path: "/README.md".to_string(),
        }
    );
    match kinds[4] {
        PlaceholderKind::Variable {
            type_name,
            key,
            filters,
            ..
        } => {
            assert_eq!(type_name, "file");
            assert_eq!(key, "src/**/*.rs");
            assert_eq!(filters.len(), 2);
            assert_eq!(filters[0].arg.as_deref(), Some(r#""**/tests/**""#));
            assert_eq!(filters[1].arg.as_deref(), Some("3"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_occurrence_spans_point_at_raw_text() {
    let text = "a {{$x}} b {{/p}} c {{$x}}";
    let parsed = ParsedTemplate::parse(text);

    for occurrence in parsed.occurrences() {
        let placeholder = parsed.placeholder_at(occurrence);
        assert_eq!(&text[occurrence.span.clone()], placeholder.raw);
    }
    let starts: Vec<usize> = parsed.occurrences().iter().map(|o| o.span.start).collect();
    assert_eq!(starts, vec![2, 11, 20]);
}

#[test]
fn test_malformed_tokens_are_tagged_not_fatal() {
    let parsed =
        ParsedTemplate::parse("{{}} {{plain}} {{$}} {{$x:(a)}} {{$x:f(a(b))}} {{$ok}}");

    let errors: Vec<&ParseError> = parsed
        .placeholders()
        .iter()
        .filter_map(|p| match &p.kind {
            PlaceholderKind::Malformed { error } => Some(error),
            _ => None,
        })
        .collect();

    assert_eq!(errors.len(), 5);
    assert_eq!(errors[0], &ParseError::Empty);
    assert_eq!(errors[1], &ParseError::UnknownForm);
    assert_eq!(errors[2], &ParseError::MissingIdentifier);
    assert!(matches!(errors[3], ParseError::MissingFilterName { .. }));
    assert_eq!(
        errors[4],
        &ParseError::NestedParentheses {
            filter: "f".to_string()
        }
    );
    assert!(!parsed.placeholders().last().unwrap().is_malformed());
}

#[test]
fn test_quoted_argument_may_contain_delimiters() {
    let parsed = ParsedTemplate::parse(r#"{{$config.x:replace("}}|:(", 'a\'b')}}"#);

    assert_eq!(parsed.placeholders().len(), 1);
    match &parsed.placeholders()[0].kind {
        PlaceholderKind::Variable { filters, .. } => {
            assert_eq!(filters[0].name, "replace");
            assert_eq!(
                filters[0].arg.as_deref(),
                Some(r#""}}|:(", 'a\'b'"#)
            );
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_default_runs_to_closing_braces() {
    let parsed = ParsedTemplate::parse("{{$name|default=a:b(c) | d}}");

    match &parsed.placeholders()[0].kind {
        PlaceholderKind::Variable { default, filters, .. } => {
            assert!(filters.is_empty());
            assert_eq!(default.as_deref(), Some("a:b(c) | d"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unclosed_placeholder_is_plain_text() {
    let parsed = ParsedTemplate::parse("start {{$never closed\nand more text");
    assert!(parsed.is_empty());
    assert!(parsed.occurrences().is_empty());
}

#[test]
fn test_first_closing_braces_end_the_token() {
    let parsed = ParsedTemplate::parse("start {{$never closed and {{$x}} end");

    assert_eq!(parsed.placeholders().len(), 1);
    assert_eq!(parsed.placeholders()[0].raw, "{{$never closed and {{$x}}");
    assert!(parsed.placeholders()[0].is_malformed());
}
