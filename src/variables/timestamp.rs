// ABOUTME: Variable type producing the current UTC time
// ABOUTME: Supports a format filter plus the shared text filters once formatted

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::fmt::Write as _;

use super::error::{Result, VariableError};
use super::filters::{text_argument, text_filter, TEXT_FILTERS};
use super::{Candidate, Filter, VariableType};
use crate::engine::ResolveContext;

pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct TimestampVariable;

impl TimestampVariable {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimestampVariable {
    fn default() -> Self {
        Self::new()
    }
}

fn format_time(time: &DateTime<Utc>, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", time.format(pattern)).map_err(|_| VariableError::InvalidArgument {
        filter: "format".to_string(),
        message: format!("invalid time format '{}'", pattern),
    })?;
    Ok(out)
}

fn record_time(value: &serde_json::Value) -> Result<DateTime<Utc>> {
    value["utc"]
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| VariableError::Unrenderable(value.to_string()))
}

/// Turns timestamp records into formatted text so later filters see a string.
fn format(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let pattern = text_argument("format", arg)?;
    candidates
        .into_iter()
        .map(|candidate| match candidate {
            Candidate::Record(value) => {
                Ok(Candidate::Text(format_time(&record_time(&value)?, &pattern)?))
            }
            other => Ok(other),
        })
        .collect()
}

#[async_trait]
impl VariableType for TimestampVariable {
    async fn discover(&self, _key: &str, _context: &ResolveContext) -> Result<Vec<Candidate>> {
        Ok(vec![Candidate::Record(json!({
            "utc": Utc::now().to_rfc3339(),
        }))])
    }

    fn render(&self, candidate: &Candidate) -> Result<String> {
        match candidate {
            Candidate::Record(value) => format_time(&record_time(value)?, DEFAULT_FORMAT),
            Candidate::Text(text) => Ok(text.clone()),
            Candidate::Path(path) => Err(VariableError::Unrenderable(path.display().to_string())),
        }
    }

    fn filter(&self, name: &str) -> Option<Filter> {
        match name {
            "format" => Some(format as Filter),
            other => text_filter(other),
        }
    }

    fn filter_names(&self) -> Vec<&'static str> {
        let mut names = vec!["format"];
        names.extend_from_slice(TEXT_FILTERS);
        names
    }

    fn description(&self) -> &'static str {
        "Current UTC time, formatted with `format(pattern)`"
    }
}
