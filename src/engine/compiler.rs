// ABOUTME: Template compiler tying the resolver to an output writer
// ABOUTME: Reads a template from disk, resolves it and persists the result

use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use super::error::{CompileError, Result};
use super::resolver::Resolver;
use super::result::CompileResult;
use crate::output::OutputWriter;

const FALLBACK_NAME: &str = "prompt";

#[derive(Debug)]
pub struct CompiledDocument {
    pub result: CompileResult,
    /// Where the document went; `None` for stdout.
    pub path: Option<PathBuf>,
}

pub struct Compiler {
    resolver: Resolver,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler").finish()
    }
}

impl Compiler {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Compile `template` and hand the result to `writer`. The document is
    /// named after `name`, or the template's file stem.
    #[instrument(skip(self, writer), fields(template = %template.display()))]
    pub async fn compile_file(
        &self,
        template: &Path,
        name: Option<&str>,
        writer: &dyn OutputWriter,
    ) -> Result<CompiledDocument> {
        let text = tokio::fs::read_to_string(template)
            .await
            .map_err(|source| CompileError::TemplateRead {
                path: template.to_path_buf(),
                source,
            })?;

        let name = match name {
            Some(name) => name.to_string(),
            None => document_name(template),
        };

        let result = self.resolver.compile(&text).await;
        let written = writer.write(&name, &result.output).await?;

        if let Some(path) = &written.path {
            info!(
                "Compiled {} into {} ({} bytes)",
                template.display(),
                path.display(),
                written.bytes
            );
        }

        Ok(CompiledDocument {
            result,
            path: written.path,
        })
    }
}

fn document_name(template: &Path) -> String {
    template
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}
