// ABOUTME: Built-in file variable type resolving paths and glob patterns against the project root
// ABOUTME: Validates existence and extensions and loads file contents with size limits

use async_trait::async_trait;
use globset::{Glob, GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::error::{Result, VariableError};
use super::filters::{count_argument, text_argument};
use super::{Candidate, Filter, Validation, VariableType};
use crate::engine::ResolveContext;

/// Files above this size are included in full with a warning.
pub const WARN_THRESHOLD_BYTES: u64 = 100 * 1024;
/// Files above this size are truncated.
pub const TRUNCATE_THRESHOLD_BYTES: u64 = 500 * 1024;
pub const TRUNCATED_CHARS: usize = 50_000;

const IGNORED_DIRS: &[&str] = &[".git"];

#[derive(Debug, Clone, Default)]
pub struct FileVariable;

/// File contents ready to be spliced into a document.
#[derive(Debug, Clone)]
pub struct EmbeddedFile {
    pub content: String,
    pub size: u64,
    pub truncated: bool,
    pub warnings: Vec<String>,
}

impl FileVariable {
    pub fn new() -> Self {
        Self
    }

    /// A leading `/` is relative to the project root; the absolute path is
    /// only used when nothing exists under the root.
    pub fn resolve_path(key: &str, root: &Path) -> PathBuf {
        let joined = root.join(key.trim_start_matches('/'));
        let absolute = Path::new(key);
        if !joined.exists() && absolute.is_absolute() && absolute.exists() {
            absolute.to_path_buf()
        } else {
            joined
        }
    }

    fn glob(pattern: &str, root: &Path) -> Result<Vec<Candidate>> {
        let matcher = GlobBuilder::new(pattern.trim_start_matches('/'))
            .literal_separator(true)
            .build()?
            .compile_matcher();

        let mut found = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry during glob: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                if matcher.is_match(relative) {
                    found.push(Candidate::Path(entry.path().to_path_buf()));
                }
            }
        }

        debug!("Glob '{}' matched {} files", pattern, found.len());
        Ok(found)
    }

    /// Read a file for embedding, truncating very large files. Invalid
    /// UTF-8 is replaced with U+FFFD and reported as a warning.
    pub async fn load(path: &Path) -> Result<EmbeddedFile> {
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len() as u64;
        let mut warnings = Vec::new();
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warnings.push(format!(
                    "{} is not valid UTF-8; invalid bytes were replaced",
                    path.display()
                ));
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        if size > TRUNCATE_THRESHOLD_BYTES {
            let head: String = text.chars().take(TRUNCATED_CHARS).collect();
            let banner = format!(
                "[Truncated: {} is {} bytes ({:.1} KB); showing the first {} characters]\n\n",
                path.display(),
                size,
                kilobytes(size),
                TRUNCATED_CHARS
            );
            warnings.push(format!(
                "{} ({:.1} KB) was truncated to {} characters",
                path.display(),
                kilobytes(size),
                TRUNCATED_CHARS
            ));
            return Ok(EmbeddedFile {
                content: banner + &head,
                size,
                truncated: true,
                warnings,
            });
        }

        if size > WARN_THRESHOLD_BYTES {
            warnings.push(format!(
                "{} is large ({:.1} KB) and was included in full",
                path.display(),
                kilobytes(size)
            ));
        }

        Ok(EmbeddedFile {
            content: text,
            size,
            truncated: false,
            warnings,
        })
    }
}

#[async_trait]
impl VariableType for FileVariable {
    async fn discover(&self, key: &str, context: &ResolveContext) -> Result<Vec<Candidate>> {
        let root = &context.project_root;
        if has_glob_meta(key) {
            Self::glob(key, root)
        } else {
            Ok(vec![Candidate::Path(Self::resolve_path(key, root))])
        }
    }

    fn render(&self, candidate: &Candidate) -> Result<String> {
        match candidate {
            Candidate::Path(path) => Ok(path.to_string_lossy().into_owned()),
            Candidate::Text(text) => Ok(text.clone()),
            Candidate::Record(value) => Err(VariableError::Unrenderable(value.to_string())),
        }
    }

    async fn validate(
        &self,
        candidate: &Candidate,
        key: &str,
        context: &ResolveContext,
    ) -> Validation {
        let Some(path) = candidate.as_path() else {
            return Validation::Rejected;
        };
        let shown = path
            .strip_prefix(&context.project_root)
            .unwrap_or(path)
            .display()
            .to_string();

        match tokio::fs::metadata(path).await {
            Err(_) => Validation::Message(format!("File not found: {}", shown)),
            Ok(meta) if meta.is_dir() => {
                Validation::Message(format!("Path is a directory, not a file: {}", shown))
            }
            Ok(_) => match expected_extension(key) {
                Some(expected) if !has_extension(path, &expected) => Validation::Message(
                    format!("Expected a .{} file but resolved {}", expected, shown),
                ),
                _ => Validation::Accepted,
            },
        }
    }

    fn filter(&self, name: &str) -> Option<Filter> {
        let filter: Filter = match name {
            "limit" => limit,
            "match" => keep_matching,
            "exclude" => exclude_matching,
            "ext" => with_extension,
            _ => return None,
        };
        Some(filter)
    }

    fn filter_names(&self) -> Vec<&'static str> {
        vec!["limit", "match", "exclude", "ext"]
    }

    fn embeds_file_contents(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Embed files by path or glob pattern relative to the project root"
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| IGNORED_DIRS.contains(&name))
            .unwrap_or(false)
}

fn has_glob_meta(key: &str) -> bool {
    key.contains(['*', '?', '[', '{'])
}

fn expected_extension(key: &str) -> Option<String> {
    let ext = Path::new(key).extension()?.to_str()?;
    if ext.is_empty() || has_glob_meta(ext) {
        return None;
    }
    Some(ext.to_string())
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

fn kilobytes(size: u64) -> f64 {
    size as f64 / 1024.0
}

fn path_matcher(filter: &str, arg: Option<&str>) -> Result<GlobMatcher> {
    let pattern = text_argument(filter, arg)?;
    Ok(Glob::new(&pattern)?.compile_matcher())
}

fn matches_path(matcher: &GlobMatcher, candidate: &Candidate) -> bool {
    match candidate {
        Candidate::Path(path) => {
            matcher.is_match(path)
                || path
                    .file_name()
                    .map(|name| matcher.is_match(name))
                    .unwrap_or(false)
        }
        Candidate::Text(text) => matcher.is_match(text),
        Candidate::Record(_) => false,
    }
}

fn limit(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let count = count_argument("limit", arg)?;
    Ok(candidates.into_iter().take(count).collect())
}

fn keep_matching(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let matcher = path_matcher("match", arg)?;
    Ok(candidates
        .into_iter()
        .filter(|c| matches_path(&matcher, c))
        .collect())
}

fn exclude_matching(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let matcher = path_matcher("exclude", arg)?;
    Ok(candidates
        .into_iter()
        .filter(|c| !matches_path(&matcher, c))
        .collect())
}

fn with_extension(candidates: Vec<Candidate>, arg: Option<&str>) -> Result<Vec<Candidate>> {
    let expected = text_argument("ext", arg)?;
    let expected = expected.trim_start_matches('.');
    Ok(candidates
        .into_iter()
        .filter(|c| c.as_path().map(|p| has_extension(p, expected)).unwrap_or(false))
        .collect())
}
