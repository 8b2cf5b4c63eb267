// ABOUTME: Output writers for compiled documents (files, stdout)
// ABOUTME: File output goes through a temporary file so a failed write leaves nothing behind

use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::config::{OutputNaming, OutputSettings};
use super::error::{OutputError, Result};
use super::naming::{file_name, next_sequence_number, numbered_file_name, sequence_exhausted};

/// Attempts at claiming a sequence number before giving up.
const MAX_NUMBER_ATTEMPTS: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct WrittenOutput {
    /// `None` when the document went to stdout.
    pub path: Option<PathBuf>,
    pub bytes: usize,
}

#[async_trait]
pub trait OutputWriter: Send + Sync {
    /// Persist `content`; `name` is the document stem (usually the template's).
    async fn write(&self, name: &str, content: &str) -> Result<WrittenOutput>;
}

pub struct StdoutWriter;

impl Default for StdoutWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl StdoutWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputWriter for StdoutWriter {
    async fn write(&self, _name: &str, content: &str) -> Result<WrittenOutput> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(content.as_bytes()).await?;
        if !content.ends_with('\n') {
            stdout.write_all(b"\n").await?;
        }
        stdout.flush().await?;

        debug!("Output written to stdout ({} chars)", content.len());
        Ok(WrittenOutput {
            path: None,
            bytes: content.len(),
        })
    }
}

pub struct FileWriter {
    settings: OutputSettings,
}

impl FileWriter {
    pub fn new(settings: OutputSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &OutputSettings {
        &self.settings
    }
}

#[async_trait]
impl OutputWriter for FileWriter {
    async fn write(&self, name: &str, content: &str) -> Result<WrittenOutput> {
        let dir = self.settings.dir.clone();
        let extension = self.settings.extension().to_string();

        fs::create_dir_all(&dir)
            .await
            .map_err(|source| OutputError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let naming = self.settings.naming();
        let number = match naming {
            OutputNaming::Numbered => next_sequence_number(&dir, &extension).await?,
            OutputNaming::Fixed => 0,
        };
        let target = dir.join(file_name(naming, number, name, &extension));

        let name = name.to_string();
        let content = content.to_string();
        let bytes = content.len();
        let path = tokio::task::spawn_blocking(move || match naming {
            OutputNaming::Numbered => persist_numbered(&dir, &name, &extension, number, &content),
            OutputNaming::Fixed => persist_fixed(&dir, &target, &content),
        })
        .await
        .map_err(|e| OutputError::Write {
            path: self.settings.dir.clone(),
            source: io::Error::new(io::ErrorKind::Other, e),
        })??;

        info!("Output written to file: {} ({} bytes)", path.display(), bytes);
        Ok(WrittenOutput {
            path: Some(path),
            bytes,
        })
    }
}

fn staged(dir: &Path, target: &Path, content: &str) -> Result<NamedTempFile> {
    let write_error = |source| OutputError::Write {
        path: target.to_path_buf(),
        source,
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(content.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)?;
    Ok(file)
}

fn persist_fixed(dir: &Path, target: &Path, content: &str) -> Result<PathBuf> {
    let file = staged(dir, target, content)?;
    file.persist(target).map_err(|e| OutputError::Write {
        path: target.to_path_buf(),
        source: e.error,
    })?;
    Ok(target.to_path_buf())
}

/// Claims `number` without clobbering; moves up if another compile got there first.
fn persist_numbered(
    dir: &Path,
    name: &str,
    extension: &str,
    mut number: u32,
    content: &str,
) -> Result<PathBuf> {
    let mut target = dir.join(numbered_file_name(number, name, extension));
    let mut file = staged(dir, &target, content)?;

    for _ in 0..MAX_NUMBER_ATTEMPTS {
        match file.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{} appeared while writing; trying the next number", target.display());
                file = e.file;
                number = number
                    .checked_add(1)
                    .ok_or_else(|| sequence_exhausted(&target))?;
                target = dir.join(numbered_file_name(number, name, extension));
            }
            Err(e) => {
                return Err(OutputError::Write {
                    path: target,
                    source: e.error,
                })
            }
        }
    }

    Err(OutputError::Write {
        path: target,
        source: io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free sequence number in the output directory",
        ),
    })
}
