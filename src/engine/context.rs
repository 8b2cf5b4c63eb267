// ABOUTME: Per-compile context handed to variable type providers
// ABOUTME: Carries the project root and an identifier for correlating log lines

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ResolveContext {
    pub project_root: PathBuf,
    pub compile_id: String,
    pub start_time: DateTime<Utc>,
}

impl ResolveContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            compile_id: uuid::Uuid::new_v4().to_string(),
            start_time: Utc::now(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }
}
