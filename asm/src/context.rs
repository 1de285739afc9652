use indexmap::IndexMap;

use crate::label::Labels;
use crate::token::{Pos, Token};

// ----------------------------------------------------------------------------
// Parsed program

/// One source instruction, not yet encoded. The address is in program
/// words; branch offsets are computed against it.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub mnemonic: String,
    pub operands: Vec<Token>,
    pub address: u16,
    pub pos: Pos,
}

/// A contiguous run of instructions starting at `origin` (program words).
#[derive(Debug)]
pub struct Section {
    pub origin: u16,
    pub insts: Vec<Instruction>,
}

/// Raw bytes emitted by `.db`. The address is in bytes, ready for the
/// Intel HEX boundary.
#[derive(Debug)]
pub struct DataBlob {
    pub address: u16,
    pub data: Vec<u8>,
}

// ----------------------------------------------------------------------------
// Context

/// Everything the parse pass produces and the encode pass reads. Passed
/// by reference through both; there is no global state.
#[derive(Debug, Default)]
pub struct AssemblerContext {
    pub labels: Labels,
    pub macros: IndexMap<String, Vec<Instruction>>,
    pub sections: Vec<Section>,
    pub blobs: Vec<DataBlob>,
    /// Raw lines of every parsed file, for diagnostics.
    pub files: IndexMap<String, Vec<String>>,
}

impl AssemblerContext {
    pub fn new() -> Self {
        Self::default()
    }
}
