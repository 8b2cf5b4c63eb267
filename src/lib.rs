// ABOUTME: Main library module for the promptweave template compiler
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod output;
pub mod parser;
pub mod variables;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use engine::{CompileResult, Compiler, ResolveContext, ResolveError, Resolver};
pub use output::{FileWriter, OutputSettings, OutputWriter, StdoutWriter};
pub use parser::{ParsedTemplate, Placeholder, PlaceholderKind};
pub use variables::{Candidate, Validation, VariableRegistry, VariableType};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
