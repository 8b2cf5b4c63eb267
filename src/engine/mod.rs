// ABOUTME: Resolution engine module for the promptweave template compiler
// ABOUTME: Resolves placeholders concurrently and assembles the compiled document

pub mod cache;
pub mod compiler;
pub mod context;
pub mod error;
pub mod resolver;
pub mod result;

pub use cache::ResolutionCache;
pub use compiler::{CompiledDocument, Compiler};
pub use context::ResolveContext;
pub use error::{CompileError, ResolveError, Result};
pub use resolver::Resolver;
pub use result::{CompileResult, CompileSummary, PlaceholderResult, ResolutionSource};
