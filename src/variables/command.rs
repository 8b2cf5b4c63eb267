// ABOUTME: Variable type for values derived from configured shell commands
// ABOUTME: Runs the named command in the project root and uses its trimmed stdout

use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use super::error::{Result, VariableError};
use super::filters::{text_filter, TEXT_FILTERS};
use super::{Candidate, Filter, VariableType};
use crate::engine::ResolveContext;

/// Shell-derived values. Keys name entries of the `commands` map; the
/// command line itself never comes from the template.
pub struct CommandVariable {
    commands: HashMap<String, String>,
    shell: String,
}

impl CommandVariable {
    pub fn new(commands: HashMap<String, String>) -> Self {
        Self {
            commands,
            shell: default_shell(),
        }
    }
}

fn default_shell() -> String {
    "sh".to_string()
}

#[async_trait]
impl VariableType for CommandVariable {
    async fn discover(&self, key: &str, context: &ResolveContext) -> Result<Vec<Candidate>> {
        let Some(command_line) = self.commands.get(key) else {
            debug!("No command configured for '{}'", key);
            return Ok(Vec::new());
        };

        info!("Running command for '{}': {}", key, command_line);
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .current_dir(&context.project_root)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| VariableError::CommandFailed {
                name: key.to_string(),
                message: format!("failed to start '{}': {}", self.shell, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VariableError::CommandFailed {
                name: key.to_string(),
                message: format!("{} ({})", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Candidate::Text(stdout)])
    }

    fn render(&self, candidate: &Candidate) -> Result<String> {
        match candidate {
            Candidate::Text(text) => Ok(text.clone()),
            other => Err(VariableError::Unrenderable(format!("{:?}", other))),
        }
    }

    fn filter(&self, name: &str) -> Option<Filter> {
        text_filter(name)
    }

    fn filter_names(&self) -> Vec<&'static str> {
        TEXT_FILTERS.to_vec()
    }

    fn description(&self) -> &'static str {
        "Output of commands from the `commands` section of the configuration"
    }
}
