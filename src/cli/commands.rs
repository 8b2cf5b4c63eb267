// ABOUTME: Command implementations for the promptweave CLI
// ABOUTME: Handles the compile, check and types commands

use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::args::Args;
use super::config::Config;
use crate::engine::{CompiledDocument, Compiler, Resolver};
use crate::output::{FileWriter, OutputNaming, OutputWriter, StdoutWriter};
use crate::parser::{PlaceholderKind, StaticSubstitutions};
use crate::variables::{
    CommandVariable, ConfigVariable, TimestampVariable, VariableRegistry,
};

/// Options for `promptweave compile`.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub template: PathBuf,
    pub output: Option<PathBuf>,
    pub name: Option<String>,
    pub fixed: bool,
    pub stdout: bool,
    pub substitutions: Vec<String>,
    pub json: bool,
    pub strict: bool,
}

/// The built-in file provider plus the configuration-backed ones.
pub fn build_registry(config: &Config) -> VariableRegistry {
    let mut registry = VariableRegistry::new();
    registry.register(
        "config",
        Arc::new(ConfigVariable::new(config.variables.clone())),
    );
    registry.register(
        "command",
        Arc::new(CommandVariable::new(config.commands.clone())),
    );
    registry.register("timestamp", Arc::new(TimestampVariable::new()));
    registry
}

pub fn build_resolver(config: &Config, substitutions: &[String]) -> Result<Resolver> {
    let merged = config.merged_substitutions(Args::parse_substitutions(substitutions)?);
    let substitutions =
        StaticSubstitutions::new(&merged).context("Invalid static substitutions")?;

    Ok(
        Resolver::new(Arc::new(build_registry(config)), &config.project_root)
            .with_substitutions(substitutions)
            .with_timeout(config.placeholder_timeout_secs.map(Duration::from_secs)),
    )
}

/// Execute the compile command
pub async fn compile_template(options: CompileOptions, config: &Config) -> Result<()> {
    info!("Compiling template: {}", options.template.display());

    let resolver = build_resolver(config, &options.substitutions)?;
    let compiler = Compiler::new(resolver);

    let writer: Box<dyn OutputWriter> = if options.stdout {
        Box::new(StdoutWriter::new())
    } else {
        let mut settings = config.output.clone();
        if let Some(dir) = options.output.clone() {
            settings.dir = dir;
        }
        if options.fixed {
            settings = settings.with_naming(OutputNaming::Fixed);
        }
        Box::new(FileWriter::new(settings))
    };

    let document = compiler
        .compile_file(&options.template, options.name.as_deref(), writer.as_ref())
        .await
        .with_context(|| format!("Failed to compile {}", options.template.display()))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&compile_report(&document))?);
    } else {
        print_compile_summary(&document, options.stdout);
    }

    let failed = document.result.summary.failed;
    if options.strict && failed > 0 {
        return Err(anyhow::anyhow!(
            "{} placeholder(s) failed to resolve",
            failed
        ));
    }

    Ok(())
}

fn compile_report(document: &CompiledDocument) -> serde_json::Value {
    let result = &document.result;
    json!({
        "compile_id": result.compile_id,
        "output_path": document.path,
        "start_time": result.start_time,
        "end_time": result.end_time,
        "summary": result.summary,
        "placeholders": result.placeholders,
    })
}

/// Human-readable report. Goes to stderr when the document itself is on stdout.
fn print_compile_summary(document: &CompiledDocument, to_stderr: bool) {
    let result = &document.result;
    let mut lines = Vec::new();

    match &document.path {
        Some(path) => lines.push(format!("✓ Compiled to {}", path.display())),
        None => lines.push("✓ Compiled".to_string()),
    }
    lines.push(format!(
        "  Placeholders: {} ({} occurrences)",
        result.summary.total_placeholders, result.summary.occurrences
    ));
    if result.summary.defaulted + result.summary.from_environment > 0 {
        lines.push(format!(
            "  Fallbacks: {} default, {} environment",
            result.summary.defaulted, result.summary.from_environment
        ));
    }
    for failure in result.failures() {
        if let Some(error) = &failure.error {
            lines.push(format!("  ✗ {}", error));
        }
    }
    for warning in result.warnings() {
        lines.push(format!("  ! {}", warning));
    }

    for line in lines {
        if to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Execute the check command
pub async fn check_template(
    template: PathBuf,
    substitutions: Vec<String>,
    json_output: bool,
    config: &Config,
) -> Result<()> {
    info!("Checking template: {}", template.display());

    let text = tokio::fs::read_to_string(&template)
        .await
        .with_context(|| format!("Failed to read template {}", template.display()))?;
    let resolver = build_resolver(config, &substitutions)?;
    let parsed = resolver.prepare(&text);

    let mut entries = Vec::new();
    let mut problems = 0;
    for placeholder in parsed.placeholders() {
        let count = parsed
            .occurrences()
            .iter()
            .filter(|o| parsed.placeholder_at(o).raw == placeholder.raw)
            .count();

        let entry = match &placeholder.kind {
            PlaceholderKind::File { path } => json!({
                "raw": placeholder.raw,
                "kind": "file",
                "path": path,
                "occurrences": count,
            }),
            PlaceholderKind::Variable {
                type_name,
                key,
                filters,
                default,
            } => {
                let registered = resolver.registry().contains(type_name);
                if !registered {
                    warn!(
                        "Type '{}' in {} is not registered; only fallbacks apply",
                        type_name, placeholder.raw
                    );
                }
                json!({
                    "raw": placeholder.raw,
                    "kind": "variable",
                    "type": type_name,
                    "key": key,
                    "filters": filters
                        .iter()
                        .map(|f| json!({ "name": f.name, "arg": f.arg }))
                        .collect::<Vec<_>>(),
                    "default": default,
                    "registered": registered,
                    "occurrences": count,
                })
            }
            PlaceholderKind::Malformed { error } => {
                problems += 1;
                json!({
                    "raw": placeholder.raw,
                    "kind": "malformed",
                    "error": error.to_string(),
                    "occurrences": count,
                })
            }
        };
        entries.push(entry);
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!(
            "{} placeholder(s) in {}",
            parsed.placeholders().len(),
            template.display()
        );
        for entry in &entries {
            let marker = if entry["kind"] == "malformed" { "✗" } else { "✓" };
            let detail = match entry["kind"].as_str() {
                Some("malformed") => format!("error: {}", entry["error"].as_str().unwrap_or("")),
                Some("variable") if entry["registered"] == false => {
                    "unregistered type (default/environment fallback only)".to_string()
                }
                Some(kind) => kind.to_string(),
                None => String::new(),
            };
            println!(
                "  {} {} x{} ({})",
                marker,
                entry["raw"].as_str().unwrap_or(""),
                entry["occurrences"],
                detail
            );
        }
    }

    if problems > 0 {
        return Err(anyhow::anyhow!(
            "{} malformed placeholder(s) in {}",
            problems,
            template.display()
        ));
    }

    Ok(())
}

/// Execute the types command
pub async fn list_types(config: &Config) -> Result<()> {
    let registry = build_registry(config);

    for name in registry.list_types() {
        let Some(provider) = registry.get(name) else {
            continue;
        };
        println!("{:<10} {}", name, provider.description());
        let filters = provider.filter_names();
        if !filters.is_empty() {
            println!("{:<10} filters: {}", "", filters.join(", "));
        }
    }

    Ok(())
}
