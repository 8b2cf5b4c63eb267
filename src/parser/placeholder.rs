// ABOUTME: Placeholder descriptors and the parsed-template structure
// ABOUTME: Deduplicates placeholders by raw text while keeping every occurrence position

use std::collections::HashMap;
use std::ops::Range;

use super::error::ParseError;
use super::grammar;
use super::scanner;

/// One `:name(arg)` step of a filter chain. The argument is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCall {
    pub name: String,
    pub arg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// `{{/path}}`, path keeps its leading slash with `\}` unescaped.
    File { path: String },
    /// `{{$type(.key)?(:filter(arg))*(|default=literal)?}}`
    Variable {
        type_name: String,
        key: String,
        filters: Vec<FilterCall>,
        default: Option<String>,
    },
    Malformed { error: ParseError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The full token including braces; identity of the placeholder.
    pub raw: String,
    pub kind: PlaceholderKind,
}

impl Placeholder {
    pub fn parse(raw: &str) -> Self {
        let body = raw
            .strip_prefix("{{")
            .and_then(|s| s.strip_suffix("}}"))
            .unwrap_or(raw);

        Self {
            raw: raw.to_string(),
            kind: grammar::parse_body(body),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.kind, PlaceholderKind::Malformed { .. })
    }

    /// Type name for variables, `file` for file literals.
    pub fn type_name(&self) -> Option<&str> {
        match &self.kind {
            PlaceholderKind::File { .. } => Some("file"),
            PlaceholderKind::Variable { type_name, .. } => Some(type_name),
            PlaceholderKind::Malformed { .. } => None,
        }
    }
}

/// Position of one placeholder token in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub span: Range<usize>,
    /// Index into [`ParsedTemplate::placeholders`].
    pub placeholder: usize,
}

#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    text: String,
    placeholders: Vec<Placeholder>,
    occurrences: Vec<Occurrence>,
}

impl ParsedTemplate {
    pub fn parse(text: &str) -> Self {
        let mut placeholders: Vec<Placeholder> = Vec::new();
        let mut index_by_raw: HashMap<&str, usize> = HashMap::new();
        let mut occurrences = Vec::new();

        for span in scanner::scan(text) {
            let raw = &text[span.clone()];
            let index = *index_by_raw.entry(raw).or_insert_with(|| {
                placeholders.push(Placeholder::parse(raw));
                placeholders.len() - 1
            });
            occurrences.push(Occurrence {
                span,
                placeholder: index,
            });
        }

        Self {
            text: text.to_string(),
            placeholders,
            occurrences,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Unique placeholders in order of first appearance.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn placeholder_at(&self, occurrence: &Occurrence) -> &Placeholder {
        &self.placeholders[occurrence.placeholder]
    }

    pub fn parse_errors(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders.iter().filter(|p| p.is_malformed())
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }
}
