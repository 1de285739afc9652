use color_print::cprintln;
use indexmap::IndexMap;
use thiserror::Error;

use crate::token::Pos;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{msg}")]
    Lex { pos: Pos, msg: String },

    #[error("{msg}")]
    Directive { pos: Pos, msg: String },

    #[error("unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic { pos: Pos, mnemonic: String },

    #[error("{msg}")]
    BadOperand { pos: Pos, msg: String },

    #[error("undefined label `{label}`")]
    UnresolvedLabel { pos: Pos, label: String },

    #[error("relative address {offset} is not in range of +/- 2K words")]
    BranchOutOfRange { pos: Pos, offset: i32 },

    #[error("import of `{path}` exceeds the nesting limit")]
    ImportDepth { pos: Pos, path: String },

    #[error("failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

impl Error {
    pub fn pos(&self) -> Option<&Pos> {
        match self {
            Error::Lex { pos, .. }
            | Error::Directive { pos, .. }
            | Error::UnknownMnemonic { pos, .. }
            | Error::BadOperand { pos, .. }
            | Error::UnresolvedLabel { pos, .. }
            | Error::BranchOutOfRange { pos, .. }
            | Error::ImportDepth { pos, .. } => Some(pos),
            Error::FileOpen(..) | Error::FileWrite(..) => None,
        }
    }

    /// Prints the error with the offending source line.
    pub fn print_diag(&self, files: &IndexMap<String, Vec<String>>) {
        cprintln!("<red,bold>error</>: {}", self);
        if let Some(pos) = self.pos() {
            print_gutter(pos, files);
        }
    }
}

/// Prints a warning with the offending source line. Warnings never abort.
pub fn warn_diag(msg: &str, pos: &Pos, files: &IndexMap<String, Vec<String>>) {
    cprintln!("<yellow,bold>warn</>: {}", msg);
    print_gutter(pos, files);
}

fn print_gutter(pos: &Pos, files: &IndexMap<String, Vec<String>>) {
    let raw = files
        .get(&pos.file)
        .and_then(|lines| lines.get(pos.line.wrapping_sub(1)))
        .map(String::as_str)
        .unwrap_or("");

    cprintln!("     <blue>--></> <underline>{}</>", pos);
    cprintln!("      <blue>|</>");
    cprintln!(" <blue>{:>4} |</> {}", pos.line, raw);
    cprintln!("      <blue>|</>");
}
