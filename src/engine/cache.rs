// ABOUTME: Per-compile cache of resolved placeholder text
// ABOUTME: Keyed by raw placeholder text so duplicate occurrences share one resolution

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, String>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: impl Into<String>, resolved: impl Into<String>) {
        self.entries.insert(raw.into(), resolved.into());
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }
}
