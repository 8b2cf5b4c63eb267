// ABOUTME: Static whole-word substitutions applied to template text before parsing
// ABOUTME: Rules run in configuration order and never expand capture references

use indexmap::IndexMap;
use regex::{NoExpand, Regex};

use super::error::{ParserError, Result};

#[derive(Debug, Clone, Default)]
pub struct StaticSubstitutions {
    rules: Vec<(Regex, String)>,
}

impl StaticSubstitutions {
    pub fn new(map: &IndexMap<String, String>) -> Result<Self> {
        let mut rules = Vec::with_capacity(map.len());
        for (key, value) in map {
            rules.push((word_pattern(key)?, value.clone()));
        }
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for (pattern, value) in &self.rules {
            current = pattern
                .replace_all(&current, NoExpand(value.as_str()))
                .into_owned();
        }
        current
    }
}

/// `\b` only makes sense next to word characters, so keys like `$ROOT` get
/// a boundary on the word side only.
fn word_pattern(key: &str) -> Result<Regex> {
    let first = key.chars().next().ok_or(ParserError::EmptySubstitutionKey)?;
    let last = key.chars().last().unwrap_or(first);

    let mut pattern = String::new();
    if is_word(first) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(key));
    if is_word(last) {
        pattern.push_str(r"\b");
    }

    Regex::new(&pattern).map_err(|source| ParserError::InvalidSubstitution {
        key: key.to_string(),
        source,
    })
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
