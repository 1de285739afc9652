use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::op::{self, Fields, Words};

// ----------------------------------------------------------------------------
// Instruction definitions

/// Encoding family of a mnemonic. The shape selects both the operand
/// resolver and the word-emission function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    TwoRegs,
    /// Single register mirrored into both fields (TST, CLR).
    TwoRegsSame,
    Reg,
    RegGp,
    RegImm,
    WordImm,
    AdvMath,
    RelBranch,
    /// `explicit_s`: the SREG bit is an operand (BRBS/BRBC); the named
    /// conditionals carry it pre-baked in the opcode.
    BranchSreg { explicit_s: bool },
    SkipBit,
    SkipBitIo,
    IoIn,
    IoOut,
    SregBit,
    Constant,
    Lpm { ext: bool },
    /// Two-word LDS/STS. `store` swaps the operand order.
    Mem { store: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct InstDef {
    pub operands: usize,
    pub bytecode: u16,
    pub shape: Shape,
}

impl InstDef {
    pub fn encode(&self, fields: Fields) -> Words {
        op::encode(self.bytecode, fields)
    }

    /// Program words this instruction occupies.
    pub fn words(&self) -> u16 {
        match self.shape {
            Shape::Mem { .. } => 2,
            _ => 1,
        }
    }
}

/// Looks up a mnemonic (upper-cased) in the instruction set.
pub fn get(mnemonic: &str) -> Option<&'static InstDef> {
    INSTRUCTION_SET.get(mnemonic)
}

/// Program words a mnemonic will occupy; unknown mnemonics count one word
/// (they fail at encode time before any address matters).
pub fn width(mnemonic: &str) -> u16 {
    get(mnemonic).map_or(1, InstDef::words)
}

// ----------------------------------------------------------------------------
// Instruction set

macro_rules! inst_set {
    ($($mnemonic:literal: $n:literal, $bytecode:literal, $shape:expr;)*) => {{
        let mut map = IndexMap::new();
        $(
            map.insert($mnemonic, InstDef {
                operands: $n,
                bytecode: $bytecode,
                shape: $shape,
            });
        )*
        map
    }};
}

static INSTRUCTION_SET: Lazy<IndexMap<&'static str, InstDef>> = Lazy::new(|| {
    inst_set! {
        // Arithmetic and logic
        "ADD":  2, 0b0000_1100_0000_0000, Shape::TwoRegs;
        "ADC":  2, 0b0001_1100_0000_0000, Shape::TwoRegs;
        "ADIW": 2, 0b1001_0110_0000_0000, Shape::WordImm;
        "SUB":  2, 0b0001_1000_0000_0000, Shape::TwoRegs;
        "SUBI": 2, 0b0101_0000_0000_0000, Shape::RegImm;
        "SBC":  2, 0b0000_1000_0000_0000, Shape::TwoRegs;
        "SBCI": 2, 0b0100_0000_0000_0000, Shape::RegImm;
        "SBIW": 2, 0b1001_0111_0000_0000, Shape::WordImm;
        "AND":  2, 0b0010_0000_0000_0000, Shape::TwoRegs;
        "ANDI": 2, 0b0111_0000_0000_0000, Shape::RegImm;
        "OR":   2, 0b0010_1000_0000_0000, Shape::TwoRegs;
        "ORI":  2, 0b0110_0000_0000_0000, Shape::RegImm;
        "EOR":  2, 0b0010_0100_0000_0000, Shape::TwoRegs;
        "COM":  1, 0b1001_0100_0000_0000, Shape::Reg;
        "NEG":  1, 0b1001_0100_0000_0001, Shape::Reg;
        "SBR":  2, 0b0110_0000_0000_0000, Shape::RegImm;
        "CBR":  2, 0b0111_0000_0000_0000, Shape::RegImm; // ANDI with complemented K
        "INC":  1, 0b1001_0100_0000_0011, Shape::Reg;
        "DEC":  1, 0b1001_0100_0000_1010, Shape::Reg;
        "TST":  1, 0b0010_0000_0000_0000, Shape::TwoRegsSame; // AND Rd, Rd
        "CLR":  1, 0b0010_0100_0000_0000, Shape::TwoRegsSame; // EOR Rd, Rd
        "SER":  1, 0b1110_1111_0000_1111, Shape::RegGp;
        "MUL":  2, 0b1001_1100_0000_0000, Shape::TwoRegs;
        "MULS": 2, 0b0000_0010_0000_0000, Shape::AdvMath;

        // Change of flow
        "RJMP":  1, 0b1100_0000_0000_0000, Shape::RelBranch;
        "RCALL": 1, 0b1101_0000_0000_0000, Shape::RelBranch;
        "RET":   0, 0b1001_0101_0000_1000, Shape::Constant;
        "RETI":  0, 0b1001_0101_0001_1000, Shape::Constant;
        "CPSE":  2, 0b0001_0000_0000_0000, Shape::TwoRegs;
        "CP":    2, 0b0001_0100_0000_0000, Shape::TwoRegs;
        "CPC":   2, 0b0000_0100_0000_0000, Shape::TwoRegs;
        "CPI":   2, 0b0011_0000_0000_0000, Shape::RegImm;
        "SBRC":  2, 0b1111_1100_0000_0000, Shape::SkipBit;
        "SBRS":  2, 0b1111_1110_0000_0000, Shape::SkipBit;
        "SBIC":  2, 0b1001_1001_0000_0000, Shape::SkipBitIo;
        "SBIS":  2, 0b1001_1011_0000_0000, Shape::SkipBitIo;
        "BRBS":  2, 0b1111_0000_0000_0000, Shape::BranchSreg { explicit_s: true };
        "BRBC":  2, 0b1111_0100_0000_0000, Shape::BranchSreg { explicit_s: true };
        "BREQ":  1, 0b1111_0000_0000_0001, Shape::BranchSreg { explicit_s: false };
        "BRNE":  1, 0b1111_0100_0000_0001, Shape::BranchSreg { explicit_s: false };
        "BRCS":  1, 0b1111_0000_0000_0000, Shape::BranchSreg { explicit_s: false };
        "BRCC":  1, 0b1111_0100_0000_0000, Shape::BranchSreg { explicit_s: false };
        "BRSH":  1, 0b1111_0100_0000_0000, Shape::BranchSreg { explicit_s: false };
        "BRLO":  1, 0b1111_0000_0000_0000, Shape::BranchSreg { explicit_s: false };
        "BRMI":  1, 0b1111_0000_0000_0010, Shape::BranchSreg { explicit_s: false };
        "BRPL":  1, 0b1111_0100_0000_0010, Shape::BranchSreg { explicit_s: false };
        "BRGE":  1, 0b1111_0100_0000_0100, Shape::BranchSreg { explicit_s: false };
        "BRLT":  1, 0b1111_0000_0000_0100, Shape::BranchSreg { explicit_s: false };
        "BRHS":  1, 0b1111_0000_0000_0101, Shape::BranchSreg { explicit_s: false };
        "BRHC":  1, 0b1111_0100_0000_0101, Shape::BranchSreg { explicit_s: false };
        "BRTS":  1, 0b1111_0000_0000_0110, Shape::BranchSreg { explicit_s: false };
        "BRTC":  1, 0b1111_0100_0000_0110, Shape::BranchSreg { explicit_s: false };
        "BRVS":  1, 0b1111_0000_0000_0011, Shape::BranchSreg { explicit_s: false };
        "BRVC":  1, 0b1111_0100_0000_0011, Shape::BranchSreg { explicit_s: false };
        "BRIE":  1, 0b1111_0000_0000_0111, Shape::BranchSreg { explicit_s: false };
        "BRID":  1, 0b1111_0100_0000_0111, Shape::BranchSreg { explicit_s: false };

        // Data transfer
        "MOV":  2, 0b0010_1100_0000_0000, Shape::TwoRegs;
        "MOVW": 2, 0b0000_0001_0000_0000, Shape::AdvMath;
        "LDI":  2, 0b1110_0000_0000_0000, Shape::RegImm;
        "LDS":  2, 0b1001_0000_0000_0000, Shape::Mem { store: false };
        "STS":  2, 0b1001_0010_0000_0000, Shape::Mem { store: true };
        "LPM":  2, 0b1001_0000_0000_0000, Shape::Lpm { ext: false };
        "ELPM": 2, 0b1001_0000_0000_0000, Shape::Lpm { ext: true };
        "IN":   2, 0b1011_0000_0000_0000, Shape::IoIn;
        "OUT":  2, 0b1011_1000_0000_0000, Shape::IoOut;
        "PUSH": 1, 0b1001_0010_0000_1111, Shape::Reg;
        "POP":  1, 0b1001_0000_0000_1111, Shape::Reg;

        // Bit and bit-test
        "LSR":  1, 0b1001_0100_0000_0110, Shape::Reg;
        "ROR":  1, 0b1001_0100_0000_0111, Shape::Reg;
        "ASR":  1, 0b1001_0100_0000_0101, Shape::Reg;
        "BSET": 1, 0b1001_0100_0000_1000, Shape::SregBit;
        "BCLR": 1, 0b1001_0100_1000_1000, Shape::SregBit;

        // MCU control
        "BREAK": 0, 0b1001_0101_1001_1000, Shape::Constant;
        "NOP":   0, 0b0000_0000_0000_0000, Shape::Constant;
        "SLEEP": 0, 0b1001_0101_1000_1000, Shape::Constant;
        "WDR":   0, 0b1001_0101_1010_1000, Shape::Constant;
    }
});

// ----------------------------------------------------------------------------
