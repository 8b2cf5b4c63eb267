// ABOUTME: Per-placeholder resolution results and compile-level aggregation
// ABOUTME: Records how each placeholder was resolved, with errors and warnings for reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::ResolveError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// First candidate left after filtering.
    Discovered,
    /// The `|default=` literal.
    Default,
    /// Environment variable named after the key.
    Environment,
    /// Replaced by an inline error marker.
    Failed,
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionSource::Discovered => write!(f, "discovered"),
            ResolutionSource::Default => write!(f, "default"),
            ResolutionSource::Environment => write!(f, "environment"),
            ResolutionSource::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaceholderResult {
    pub raw: String,
    pub type_name: Option<String>,
    pub source: ResolutionSource,
    /// Text substituted for every occurrence of `raw`.
    pub value: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ResolveError>,
    /// Discovery error that was swallowed before fallback ran.
    pub discovery_error: Option<String>,
    pub warnings: Vec<String>,
    pub candidates: usize,
    pub duration: Duration,
}

fn serialize_error<S>(error: &Option<ResolveError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

impl PlaceholderResult {
    pub fn succeed(raw: impl Into<String>, source: ResolutionSource, value: String) -> Self {
        Self {
            raw: raw.into(),
            type_name: None,
            source,
            value,
            error: None,
            discovery_error: None,
            warnings: Vec::new(),
            candidates: 0,
            duration: Duration::ZERO,
        }
    }

    pub fn fail(raw: impl Into<String>, error: ResolveError) -> Self {
        Self {
            raw: raw.into(),
            type_name: None,
            source: ResolutionSource::Failed,
            value: error.to_marker(),
            error: Some(error),
            discovery_error: None,
            warnings: Vec::new(),
            candidates: 0,
            duration: Duration::ZERO,
        }
    }

    pub fn with_type(mut self, type_name: Option<&str>) -> Self {
        self.type_name = type_name.map(str::to_string);
        self
    }

    pub fn is_failed(&self) -> bool {
        self.source == ResolutionSource::Failed
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompileSummary {
    pub total_placeholders: usize,
    pub occurrences: usize,
    pub discovered: usize,
    pub defaulted: usize,
    pub from_environment: usize,
    pub failed: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub compile_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    /// The document after substitution.
    pub output: String,
    pub placeholders: Vec<PlaceholderResult>,
    pub summary: CompileSummary,
}

impl CompileResult {
    pub fn new(compile_id: String, start_time: DateTime<Utc>) -> Self {
        Self {
            compile_id,
            start_time,
            end_time: None,
            duration: None,
            output: String::new(),
            placeholders: Vec::new(),
            summary: CompileSummary::default(),
        }
    }

    pub fn mark_completed(&mut self, occurrences: usize) {
        self.end_time = Some(Utc::now());
        self.duration = Some(
            (Utc::now() - self.start_time)
                .to_std()
                .unwrap_or(Duration::ZERO),
        );
        self.update_summary(occurrences);
    }

    pub fn get(&self, raw: &str) -> Option<&PlaceholderResult> {
        self.placeholders.iter().find(|p| p.raw == raw)
    }

    pub fn has_failures(&self) -> bool {
        self.placeholders.iter().any(PlaceholderResult::is_failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PlaceholderResult> {
        self.placeholders.iter().filter(|p| p.is_failed())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.placeholders
            .iter()
            .flat_map(|p| p.warnings.iter().map(String::as_str))
    }

    fn update_summary(&mut self, occurrences: usize) {
        let count = |source: ResolutionSource| {
            self.placeholders
                .iter()
                .filter(|p| p.source == source)
                .count()
        };

        self.summary = CompileSummary {
            total_placeholders: self.placeholders.len(),
            occurrences,
            discovered: count(ResolutionSource::Discovered),
            defaulted: count(ResolutionSource::Default),
            from_environment: count(ResolutionSource::Environment),
            failed: count(ResolutionSource::Failed),
            warnings: self.placeholders.iter().map(|p| p.warnings.len()).sum(),
        };
    }
}
