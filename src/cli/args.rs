// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for promptweave

use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptweave")]
#[command(about = "Expands placeholders in prompt templates into concrete project context")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every placeholder in a template and write the result
    Compile {
        #[arg(help = "Path to the template file")]
        template: PathBuf,

        #[arg(short, long, help = "Output directory (overrides configuration)")]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Output document name (defaults to the template name)")]
        name: Option<String>,

        #[arg(long, help = "Write <name>.<ext> instead of a numbered file")]
        fixed: bool,

        #[arg(long, conflicts_with_all = ["output", "fixed", "json"], help = "Print the compiled document instead of writing it")]
        stdout: bool,

        #[arg(
            short = 'S',
            long = "substitute",
            help = "Static whole-word substitution applied before parsing (KEY=VALUE)"
        )]
        substitutions: Vec<String>,

        #[arg(long, help = "Print the compile report as JSON")]
        json: bool,

        #[arg(long, help = "Exit with an error if any placeholder failed to resolve")]
        strict: bool,
    },

    /// Parse a template and list its placeholders without resolving them
    Check {
        #[arg(help = "Path to the template file")]
        template: PathBuf,

        #[arg(
            short = 'S',
            long = "substitute",
            help = "Static whole-word substitution applied before parsing (KEY=VALUE)"
        )]
        substitutions: Vec<String>,

        #[arg(long, help = "Print the placeholder list as JSON")]
        json: bool,
    },

    /// List the registered variable types and their filters
    Types,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse substitutions from KEY=VALUE format, keeping command-line order
    pub fn parse_substitutions(pairs: &[String]) -> anyhow::Result<IndexMap<String, String>> {
        let mut substitutions = IndexMap::new();

        for pair in pairs {
            match pair.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    substitutions.insert(key.to_string(), value.to_string());
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid substitution '{}'. Expected 'KEY=VALUE'",
                        pair
                    ));
                }
            }
        }

        Ok(substitutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_substitutions() {
        let pairs = vec![
            "PROJECT=promptweave".to_string(),
            "EMPTY=".to_string(),
            "EQ=a=b".to_string(),
        ];

        let parsed = Args::parse_substitutions(&pairs).unwrap();

        assert_eq!(parsed.get("PROJECT"), Some(&"promptweave".to_string()));
        assert_eq!(parsed.get("EMPTY"), Some(&String::new()));
        assert_eq!(parsed.get("EQ"), Some(&"a=b".to_string()));
        assert_eq!(parsed.keys().next().map(String::as_str), Some("PROJECT"));
    }

    #[test]
    fn test_parse_substitutions_invalid() {
        assert!(Args::parse_substitutions(&["no_separator".to_string()]).is_err());
        assert!(Args::parse_substitutions(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_stdout_conflicts_with_output() {
        let parsed = Args::try_parse_from([
            "promptweave",
            "compile",
            "t.md",
            "--stdout",
            "-o",
            "out",
        ]);
        assert!(parsed.is_err());
    }
}
