// ----------------------------------------------------------------------------
// Resolved operand fields

/// Operand bits after resolution, one variant per encoding family.
/// Branch offsets are kept signed until emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fields {
    None,
    Reg { d: u16 },
    RegGp { d: u16 },
    TwoRegs { d: u16, r: u16 },
    RegImm { d: u16, k: u16 },
    WordImm { d: u16, k: u16 },
    AdvMath { d: u16, r: u16 },
    IoIn { d: u16, a: u16 },
    IoOut { a: u16, r: u16 },
    RelBranch { k: i16 },
    BranchSreg { s: u16, k: i16 },
    SkipBit { r: u16, b: u16 },
    SkipBitIo { a: u16, b: u16 },
    SregBit { s: u16 },
    Lpm { d: u16, zero_form: bool, ext: bool, post_inc: bool },
    Mem { d: u16, k: u16 },
}

/// One or two 16-bit program words. Only LDS/STS produce two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Words {
    One(u16),
    Two(u16, u16),
}

impl Words {
    pub fn count(self) -> u16 {
        match self {
            Words::One(_) => 1,
            Words::Two(..) => 2,
        }
    }
}

// ----------------------------------------------------------------------------
// Field insertion
//
// One function per family. The bytecode is the constant part of the word;
// operand bits are OR-ed in at the positions of the AVR instruction formats.

fn enc_two_regs(bytecode: u16, d: u16, r: u16) -> u16 {
    bytecode | ((d & 0x1f) << 4) | ((r & 0x10) << 5) | (r & 0x0f)
}

fn enc_reg(bytecode: u16, d: u16) -> u16 {
    bytecode | ((d & 0x1f) << 4)
}

fn enc_reg_gp(bytecode: u16, d: u16) -> u16 {
    bytecode | ((d & 0x0f) << 4)
}

fn enc_reg_imm(bytecode: u16, d: u16, k: u16) -> u16 {
    bytecode | ((d & 0x0f) << 4) | ((k & 0xf0) << 4) | (k & 0x0f)
}

fn enc_word_imm(bytecode: u16, d: u16, k: u16) -> u16 {
    bytecode | ((d & 0x03) << 4) | ((k & 0x30) << 2) | (k & 0x0f)
}

fn enc_adv_math(bytecode: u16, d: u16, r: u16) -> u16 {
    bytecode | ((d & 0x0f) << 4) | (r & 0x0f)
}

fn enc_rel_branch(bytecode: u16, k: i16) -> u16 {
    bytecode | (k as u16 & 0x0fff)
}

fn enc_branch_sreg(bytecode: u16, s: u16, k: i16) -> u16 {
    bytecode | ((k as u16 & 0x7f) << 3) | (s & 0x07)
}

fn enc_skip_bit(bytecode: u16, r: u16, b: u16) -> u16 {
    bytecode | ((r & 0x1f) << 4) | (b & 0x07)
}

fn enc_skip_bit_io(bytecode: u16, a: u16, b: u16) -> u16 {
    bytecode | ((a & 0x1f) << 3) | (b & 0x07)
}

fn enc_io(bytecode: u16, reg: u16, a: u16) -> u16 {
    bytecode | ((reg & 0x1f) << 4) | ((a & 0x30) << 5) | (a & 0x0f)
}

fn enc_sreg_bit(bytecode: u16, s: u16) -> u16 {
    bytecode | ((s & 0x07) << 4)
}

// Zero-operand form 1001_0101_110q_1000, load/store form 1001_000d_dddd_01qi.
// q selects ELPM (RAMPZ:Z), i selects Z post-increment.
fn enc_lpm(bytecode: u16, d: u16, zero_form: bool, ext: bool, post_inc: bool) -> u16 {
    if zero_form {
        let mut word = bytecode | 0b0000_0101_1100_1000;
        if ext {
            word |= 1 << 4;
        }
        return word;
    }
    let mut word = enc_reg(bytecode, d) | 0b0100;
    if ext {
        word |= 0b010;
    }
    if post_inc {
        word |= 0b001;
    }
    word
}

// ----------------------------------------------------------------------------

/// Emits the program word(s) for a base opcode and its resolved fields.
pub fn encode(bytecode: u16, fields: Fields) -> Words {
    match fields {
        Fields::None => Words::One(bytecode),
        Fields::Reg { d } => Words::One(enc_reg(bytecode, d)),
        Fields::RegGp { d } => Words::One(enc_reg_gp(bytecode, d)),
        Fields::TwoRegs { d, r } => Words::One(enc_two_regs(bytecode, d, r)),
        Fields::RegImm { d, k } => Words::One(enc_reg_imm(bytecode, d, k)),
        Fields::WordImm { d, k } => Words::One(enc_word_imm(bytecode, d, k)),
        Fields::AdvMath { d, r } => Words::One(enc_adv_math(bytecode, d, r)),
        Fields::IoIn { d, a } => Words::One(enc_io(bytecode, d, a)),
        Fields::IoOut { a, r } => Words::One(enc_io(bytecode, r, a)),
        Fields::RelBranch { k } => Words::One(enc_rel_branch(bytecode, k)),
        Fields::BranchSreg { s, k } => Words::One(enc_branch_sreg(bytecode, s, k)),
        Fields::SkipBit { r, b } => Words::One(enc_skip_bit(bytecode, r, b)),
        Fields::SkipBitIo { a, b } => Words::One(enc_skip_bit_io(bytecode, a, b)),
        Fields::SregBit { s } => Words::One(enc_sreg_bit(bytecode, s)),
        Fields::Lpm {
            d,
            zero_form,
            ext,
            post_inc,
        } => Words::One(enc_lpm(bytecode, d, zero_form, ext, post_inc)),
        Fields::Mem { d, k } => Words::Two(enc_reg(bytecode, d), k),
    }
}

// ----------------------------------------------------------------------------
