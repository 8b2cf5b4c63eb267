// ABOUTME: Variable type providers and the registry that maps type names to them
// ABOUTME: Defines the discover/render/validate/filter contract every provider implements

pub mod command;
pub mod config_value;
pub mod error;
pub mod file;
pub mod filters;
pub mod timestamp;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::engine::ResolveContext;

pub use command::CommandVariable;
pub use config_value::ConfigVariable;
pub use error::{Result, VariableError};
pub use file::FileVariable;
pub use timestamp::TimestampVariable;

/// A unit produced by discovery. What it means is up to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Text(String),
    Path(PathBuf),
    Record(serde_json::Value),
}

impl Candidate {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Candidate::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            Candidate::Path(path) => Some(path),
            _ => None,
        }
    }
}

/// Outcome of [`VariableType::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    /// Rejected with an explanation shown in the compiled output.
    Message(String),
    /// Rejected without explanation.
    Rejected,
}

/// Filters receive the whole candidate list and may narrow or transform it.
pub type Filter = fn(Vec<Candidate>, Option<&str>) -> Result<Vec<Candidate>>;

#[async_trait]
pub trait VariableType: Send + Sync {
    async fn discover(&self, key: &str, context: &ResolveContext) -> Result<Vec<Candidate>>;

    fn render(&self, candidate: &Candidate) -> Result<String>;

    async fn validate(
        &self,
        _candidate: &Candidate,
        _key: &str,
        _context: &ResolveContext,
    ) -> Validation {
        Validation::Accepted
    }

    fn filter(&self, _name: &str) -> Option<Filter> {
        None
    }

    fn filter_names(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// When true, the rendered value is a path whose contents get embedded.
    fn embeds_file_contents(&self) -> bool {
        false
    }

    fn description(&self) -> &'static str;
}

/// How the resolver reaches a provider for one placeholder.
#[derive(Clone)]
pub enum ProviderLookup {
    /// `{{/path}}` always goes to the built-in file provider.
    File,
    /// Unregistered type: only default and environment fallbacks remain.
    EnvironmentFallback,
    Registered {
        name: String,
        provider: Arc<dyn VariableType>,
    },
}

pub struct VariableRegistry {
    providers: HashMap<String, Arc<dyn VariableType>>,
}

impl VariableRegistry {
    /// Registry with only the built-in `file` provider.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("file", Arc::new(FileVariable::new()));
        registry
    }

    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Last registration wins.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn VariableType>) {
        let name = name.into();
        if self.providers.insert(name.clone(), provider).is_some() {
            warn!("Variable type '{}' was already registered; replacing it", name);
        } else {
            debug!("Registered variable type '{}'", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn VariableType>> {
        self.providers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn lookup(&self, type_name: &str) -> ProviderLookup {
        match self.get(type_name) {
            Some(provider) => ProviderLookup::Registered {
                name: type_name.to_string(),
                provider,
            },
            None => ProviderLookup::EnvironmentFallback,
        }
    }

    /// Registered type names, sorted.
    pub fn list_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for VariableRegistry {
    fn default() -> Self {
        Self::new()
    }
}
