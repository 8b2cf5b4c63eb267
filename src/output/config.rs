// ABOUTME: Configuration types for where and how compiled documents are written
// ABOUTME: Chooses between numbered and fixed file naming

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSettings {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub numbered: bool,
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputNaming {
    /// `NNN-<name>.<ext>`, one higher than anything already in the directory.
    Numbered,
    /// `<name>.<ext>`, overwritten on every compile.
    Fixed,
}

fn default_dir() -> PathBuf {
    PathBuf::from("prompts/out")
}

fn default_true() -> bool {
    true
}

fn default_extension() -> String {
    "md".to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            numbered: default_true(),
            extension: default_extension(),
        }
    }
}

impl OutputSettings {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.numbered = naming == OutputNaming::Numbered;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn naming(&self) -> OutputNaming {
        if self.numbered {
            OutputNaming::Numbered
        } else {
            OutputNaming::Fixed
        }
    }

    /// Extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }
}
