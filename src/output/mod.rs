// ABOUTME: Output module for substituting resolved text and persisting documents
// ABOUTME: Handles numbered or fixed file naming and stdout output

pub mod config;
pub mod error;
pub mod naming;
pub mod substitution;
pub mod writer;

pub use config::{OutputNaming, OutputSettings};
pub use error::{OutputError, Result};
pub use naming::next_sequence_number;
pub use substitution::substitute;
pub use writer::{FileWriter, OutputWriter, StdoutWriter, WrittenOutput};
