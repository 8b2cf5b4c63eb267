// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides temporary project directories and scripted variable providers

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::fs;

use promptweave::engine::{ResolveContext, Resolver};
use promptweave::variables::{
    Candidate, ConfigVariable, Filter, Result, Validation, VariableError, VariableRegistry,
    VariableType,
};

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("out")
    }

    pub async fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .expect("Failed to create parent directory");
        }
        fs::write(&path, content)
            .await
            .expect("Failed to write test file");
        path
    }

    pub async fn write_template(&self, name: &str, content: &str) -> PathBuf {
        self.write_file(&format!("templates/{}.md", name), content)
            .await
    }

    pub async fn write_config(&self, yaml: &str) -> PathBuf {
        self.write_file("promptweave.yaml", yaml).await
    }
}

/// Registry builder for tests; starts with the built-in `file` provider.
pub struct TestRegistryBuilder {
    registry: VariableRegistry,
}

impl TestRegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: VariableRegistry::new(),
        }
    }

    pub fn with_config(mut self, values: &[(&str, &str)]) -> Self {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.registry
            .register("config", Arc::new(ConfigVariable::new(values)));
        self
    }

    pub fn with(mut self, name: &str, provider: impl VariableType + 'static) -> Self {
        self.registry.register(name, Arc::new(provider));
        self
    }

    pub fn resolver(self, root: &Path) -> Resolver {
        Resolver::new(Arc::new(self.registry), root)
    }
}

/// Returns a fixed candidate list and counts discovery calls.
pub struct StaticVariable {
    values: Vec<String>,
    pub calls: Arc<AtomicUsize>,
}

impl StaticVariable {
    pub fn new(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

fn reverse(candidates: Vec<Candidate>, _arg: Option<&str>) -> Result<Vec<Candidate>> {
    Ok(candidates.into_iter().rev().collect())
}

fn drop_first(candidates: Vec<Candidate>, _arg: Option<&str>) -> Result<Vec<Candidate>> {
    Ok(candidates.into_iter().skip(1).collect())
}

fn always_fails(_candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    Err(VariableError::InvalidArgument {
        filter: "explode".to_string(),
        message: format!("refused {:?}", arg),
    })
}

#[async_trait]
impl VariableType for StaticVariable {
    async fn discover(&self, _key: &str, _context: &ResolveContext) -> Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.values.iter().cloned().map(Candidate::Text).collect())
    }

    fn render(&self, candidate: &Candidate) -> Result<String> {
        candidate
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| VariableError::Unrenderable(format!("{:?}", candidate)))
    }

    fn filter(&self, name: &str) -> Option<Filter> {
        match name {
            "reverse" => Some(reverse as Filter),
            "drop_first" => Some(drop_first as Filter),
            "explode" => Some(always_fails as Filter),
            _ => None,
        }
    }

    fn description(&self) -> &'static str {
        "Fixed values for tests"
    }
}

/// Discovery always errors.
pub struct FailingVariable;

#[async_trait]
impl VariableType for FailingVariable {
    async fn discover(&self, key: &str, _context: &ResolveContext) -> Result<Vec<Candidate>> {
        Err(VariableError::CommandFailed {
            name: key.to_string(),
            message: "backend unavailable".to_string(),
        })
    }

    fn render(&self, _candidate: &Candidate) -> Result<String> {
        Ok(String::new())
    }

    fn description(&self) -> &'static str {
        "Always fails discovery"
    }
}

/// Panics inside discovery.
pub struct PanickingVariable;

#[async_trait]
impl VariableType for PanickingVariable {
    async fn discover(&self, _key: &str, _context: &ResolveContext) -> Result<Vec<Candidate>> {
        panic!("provider blew up");
    }

    fn render(&self, _candidate: &Candidate) -> Result<String> {
        Ok(String::new())
    }

    fn description(&self) -> &'static str {
        "Panics during discovery"
    }
}

/// Sleeps before returning a single candidate.
pub struct SlowVariable {
    pub delay: Duration,
}

#[async_trait]
impl VariableType for SlowVariable {
    async fn discover(&self, _key: &str, _context: &ResolveContext) -> Result<Vec<Candidate>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![Candidate::Text("late".to_string())])
    }

    fn render(&self, candidate: &Candidate) -> Result<String> {
        Ok(candidate.as_text().unwrap_or_default().to_string())
    }

    fn description(&self) -> &'static str {
        "Slow discovery"
    }
}

/// Validation outcome depends on the key: `explain` gives a message, anything else is rejected.
pub struct PickyVariable;

#[async_trait]
impl VariableType for PickyVariable {
    async fn discover(&self, key: &str, _context: &ResolveContext) -> Result<Vec<Candidate>> {
        Ok(vec![Candidate::Text(key.to_string())])
    }

    fn render(&self, candidate: &Candidate) -> Result<String> {
        Ok(candidate.as_text().unwrap_or_default().to_string())
    }

    async fn validate(
        &self,
        candidate: &Candidate,
        key: &str,
        _context: &ResolveContext,
    ) -> Validation {
        match (key, candidate.as_text()) {
            ("ok", _) => Validation::Accepted,
            ("explain", Some(text)) => Validation::Message(format!("'{}' is not allowed", text)),
            _ => Validation::Rejected,
        }
    }

    fn description(&self) -> &'static str {
        "Validates by key"
    }
}
