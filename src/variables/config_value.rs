// ABOUTME: Variable type for static values declared in the configuration file
// ABOUTME: Looks keys up in a fixed map and exposes the shared text filters

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::Result;
use super::filters::{text_filter, TEXT_FILTERS};
use super::{Candidate, Filter, VariableType};
use crate::engine::ResolveContext;

pub struct ConfigVariable {
    values: HashMap<String, String>,
}

impl ConfigVariable {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl VariableType for ConfigVariable {
    async fn discover(&self, key: &str, _context: &ResolveContext) -> Result<Vec<Candidate>> {
        Ok(self
            .values
            .get(key)
            .map(|value| vec![Candidate::Text(value.clone())])
            .unwrap_or_default())
    }

    fn render(&self, candidate: &Candidate) -> Result<String> {
        Ok(match candidate {
            Candidate::Text(text) => text.clone(),
            Candidate::Path(path) => path.to_string_lossy().into_owned(),
            Candidate::Record(value) => value.to_string(),
        })
    }

    fn filter(&self, name: &str) -> Option<Filter> {
        text_filter(name)
    }

    fn filter_names(&self) -> Vec<&'static str> {
        TEXT_FILTERS.to_vec()
    }

    fn description(&self) -> &'static str {
        "Static values from the `variables` section of the configuration"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup() {
        let mut values = HashMap::new();
        values.insert("project_name".to_string(), "promptweave".to_string());
        let variable = ConfigVariable::new(values);
        let context = ResolveContext::new(".");

        let found = variable.discover("project_name", &context).await.unwrap();
        assert_eq!(found, vec![Candidate::Text("promptweave".to_string())]);
        assert!(variable.discover("missing", &context).await.unwrap().is_empty());
    }
}
