// ABOUTME: Parser module for prompt template placeholders
// ABOUTME: Exports the placeholder grammar, parsed-template structure, and static substitutions

pub mod error;
mod grammar;
pub mod placeholder;
mod scanner;
pub mod substitutions;

pub use error::{ParseError, ParserError};
pub use placeholder::{FilterCall, Occurrence, ParsedTemplate, Placeholder, PlaceholderKind};
pub use substitutions::StaticSubstitutions;
