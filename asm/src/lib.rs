pub mod context;
pub mod error;
pub mod label;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod resolve;
pub mod token;

use std::path::Path;

use context::AssemblerContext;
use error::Error;

/// Assembles a source file into an Intel HEX image. Returns the context
/// alongside the image so callers can inspect labels and sections.
pub fn assemble(path: &Path) -> Result<(AssemblerContext, String), Error> {
    let mut ctx = AssemblerContext::new();
    parser::parse_file(&mut ctx, path, 0, 0)?;
    let hex = output::emit(&ctx)?;
    Ok((ctx, hex))
}

/// Assembles in-memory source starting at address zero, for tests and
/// tooling.
pub fn assemble_source(file: &str, source: &str) -> Result<String, Error> {
    let mut ctx = AssemblerContext::new();
    parser::parse_source(&mut ctx, file, source, 0)?;
    output::emit(&ctx)
}
