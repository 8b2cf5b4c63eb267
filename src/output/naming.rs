// ABOUTME: Output file naming for numbered and fixed modes
// ABOUTME: Scans the output directory for the highest existing sequence number

use regex::Regex;
use std::io;
use std::path::Path;
use tracing::debug;

use super::config::OutputNaming;
use super::error::{OutputError, Result};

/// One past the highest `NNN-*.<extension>` in `dir`. Starts at 1 when the
/// directory is missing or unreadable.
pub async fn next_sequence_number(dir: &Path, extension: &str) -> Result<u32> {
    let pattern = Regex::new(&format!(r"^(\d{{3,}})-.*\.{}$", regex::escape(extension)))
        .map_err(|source| OutputError::Extension {
            extension: extension.to_string(),
            source,
        })?;

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read {} ({}); numbering starts at 1", dir.display(), e);
            return Ok(1);
        }
    };

    let mut highest = 0u32;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped scanning {}: {}", dir.display(), e);
                break;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(number) = pattern
            .captures(name)
            .and_then(|caps| caps[1].parse::<u32>().ok())
        {
            highest = highest.max(number);
        }
    }

    highest
        .checked_add(1)
        .ok_or_else(|| sequence_exhausted(dir))
}

pub(crate) fn sequence_exhausted(path: &Path) -> OutputError {
    OutputError::Write {
        path: path.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::Other,
            "sequence numbers in the output directory are exhausted",
        ),
    }
}

pub fn numbered_file_name(number: u32, name: &str, extension: &str) -> String {
    format!("{:03}-{}.{}", number, name, extension)
}

pub fn file_name(naming: OutputNaming, number: u32, name: &str, extension: &str) -> String {
    match naming {
        OutputNaming::Numbered => numbered_file_name(number, name, extension),
        OutputNaming::Fixed => format!("{}.{}", name, extension),
    }
}
