use arch::inst::{InstDef, Shape};
use arch::op::Fields;
use arch::reg::{self, Ptr};

use crate::context::Instruction;
use crate::error::Error;
use crate::label::Labels;
use crate::token::{DataType, Token, TokenKind};

// ----------------------------------------------------------------------------
// Shared primitives

/// Parses a numeric token (any of the three bases) as unsigned 16-bit.
pub fn int_value(tok: &Token) -> Result<u16, String> {
    let text = tok.text();
    let parsed = match &tok.kind {
        TokenKind::Decimal(_) => text.parse(),
        TokenKind::Hexadecimal(_) => u16::from_str_radix(&text[2..], 16),
        TokenKind::Binary(_) => u16::from_str_radix(&text[2..], 2),
        _ => return Err(format!("`{text}` is not a number")),
    };
    parsed.map_err(|_| format!("`{text}` does not fit in 16 bits"))
}

fn bad(tok: &Token, msg: String) -> Error {
    Error::BadOperand {
        pos: tok.pos.clone(),
        msg,
    }
}

fn reg5(tok: &Token) -> Result<u16, Error> {
    reg::parse_reg5(tok.text()).map_err(|msg| bad(tok, msg))
}

fn reg4(tok: &Token) -> Result<u16, Error> {
    reg::parse_reg4(tok.text()).map_err(|msg| bad(tok, msg))
}

fn reg_pair(tok: &Token) -> Result<u16, Error> {
    reg::parse_reg_pair(tok.text()).map_err(|msg| bad(tok, msg))
}

/// Immediate with label fallback: a bare identifier resolves to the label
/// address, `LABEL(HIGH)` / `LABEL(LOW)` to one byte of it.
fn imm(tok: &Token, labels: &Labels) -> Result<u16, Error> {
    match &tok.kind {
        kind if kind.data_type() == DataType::Integer => {
            int_value(tok).map_err(|msg| bad(tok, msg))
        }
        TokenKind::Operand(text) => label_value(tok, text, labels),
        _ => Err(bad(tok, format!("`{}` is not a number or label", tok.text()))),
    }
}

fn label_value(tok: &Token, text: &str, labels: &Labels) -> Result<u16, Error> {
    let (name, qual) = match text.split_once('(') {
        Some((name, qual)) => (name, Some(qual)),
        None => (text, None),
    };
    let addr = labels.get(name).ok_or_else(|| Error::UnresolvedLabel {
        pos: tok.pos.clone(),
        label: name.to_string(),
    })?;
    match qual {
        None => Ok(addr),
        Some("HIGH)") => Ok(addr >> 8),
        Some("LOW)") => Ok(addr & 0x00ff),
        Some(qual) => Err(bad(tok, format!("unknown label qualifier `({qual}`"))),
    }
}

fn bounded(tok: &Token, labels: &Labels, max: u16, what: &str) -> Result<u16, Error> {
    let value = imm(tok, labels)?;
    if value > max {
        return Err(bad(tok, format!("{what} [{value}] is not in 0..={max}")));
    }
    Ok(value)
}

/// Word distance from the instruction after the branch to the label.
fn branch_offset(tok: &Token, pc: u16, labels: &Labels) -> Result<i16, Error> {
    let name = match &tok.kind {
        TokenKind::Operand(name) => name,
        _ => {
            return Err(bad(
                tok,
                format!("branch target `{}` is not a label", tok.text()),
            ))
        }
    };
    let target = labels.get(name).ok_or_else(|| Error::UnresolvedLabel {
        pos: tok.pos.clone(),
        label: name.clone(),
    })?;
    let offset = i32::from(target) - i32::from(pc) - 1;
    if !(-2048..=2047).contains(&offset) {
        return Err(Error::BranchOutOfRange {
            pos: tok.pos.clone(),
            offset,
        });
    }
    Ok(offset as i16)
}

// ----------------------------------------------------------------------------
// Shape dispatch

/// Resolves the operand tokens of one instruction into encoder fields.
/// Needs the completed label table.
pub fn resolve(def: &InstDef, inst: &Instruction, labels: &Labels) -> Result<Fields, Error> {
    let ops = &inst.operands;
    if !matches!(def.shape, Shape::Lpm { .. }) && ops.len() != def.operands {
        return Err(Error::BadOperand {
            pos: inst.pos.clone(),
            msg: format!(
                "{} takes {} operand(s), found {}",
                inst.mnemonic,
                def.operands,
                ops.len()
            ),
        });
    }

    let fields = match def.shape {
        Shape::TwoRegs => Fields::TwoRegs {
            d: reg5(&ops[0])?,
            r: reg5(&ops[1])?,
        },
        Shape::TwoRegsSame => {
            let d = reg5(&ops[0])?;
            Fields::TwoRegs { d, r: d }
        }
        Shape::Reg => Fields::Reg { d: reg5(&ops[0])? },
        Shape::RegGp => Fields::RegGp { d: reg4(&ops[0])? },
        Shape::RegImm => Fields::RegImm {
            d: reg4(&ops[0])?,
            k: imm(&ops[1], labels)?,
        },
        Shape::WordImm => Fields::WordImm {
            d: reg_pair(&ops[0])?,
            k: bounded(&ops[1], labels, 63, "immediate")?,
        },
        Shape::AdvMath => Fields::AdvMath {
            d: reg4(&ops[0])?,
            r: reg4(&ops[1])?,
        },
        Shape::RelBranch => Fields::RelBranch {
            k: branch_offset(&ops[0], inst.address, labels)?,
        },
        Shape::BranchSreg { explicit_s: true } => Fields::BranchSreg {
            s: bounded(&ops[0], labels, 7, "status flag")?,
            k: branch_offset(&ops[1], inst.address, labels)?,
        },
        Shape::BranchSreg { explicit_s: false } => Fields::BranchSreg {
            s: 0,
            k: branch_offset(&ops[0], inst.address, labels)?,
        },
        Shape::SkipBit => Fields::SkipBit {
            r: reg5(&ops[0])?,
            b: bounded(&ops[1], labels, 7, "bit index")?,
        },
        Shape::SkipBitIo => Fields::SkipBitIo {
            a: bounded(&ops[0], labels, 31, "io address")?,
            b: bounded(&ops[1], labels, 7, "bit index")?,
        },
        Shape::IoIn => Fields::IoIn {
            d: reg5(&ops[0])?,
            a: bounded(&ops[1], labels, 63, "io address")?,
        },
        Shape::IoOut => Fields::IoOut {
            a: bounded(&ops[0], labels, 63, "io address")?,
            r: reg5(&ops[1])?,
        },
        Shape::SregBit => Fields::SregBit {
            s: bounded(&ops[0], labels, 7, "status flag")?,
        },
        Shape::Constant => Fields::None,
        Shape::Lpm { ext } => resolve_lpm(ext, inst)?,
        Shape::Mem { store: false } => Fields::Mem {
            d: reg5(&ops[0])?,
            k: imm(&ops[1], labels)?,
        },
        Shape::Mem { store: true } => Fields::Mem {
            d: reg5(&ops[1])?,
            k: imm(&ops[0], labels)?,
        },
    };
    Ok(fields)
}

/// LPM/ELPM are shape-polymorphic: `lpm`, `lpm Rd, Z`, `lpm Rd, Z+`.
fn resolve_lpm(ext: bool, inst: &Instruction) -> Result<Fields, Error> {
    let ops = &inst.operands;
    match ops.len() {
        0 => Ok(Fields::Lpm {
            d: 0,
            zero_form: true,
            ext,
            post_inc: false,
        }),
        2 => {
            let d = reg5(&ops[0])?;
            let (ptr, post_inc) =
                reg::parse_ptr(ops[1].text()).map_err(|msg| bad(&ops[1], msg))?;
            if ptr != Ptr::Z {
                return Err(bad(&ops[1], "pointer register must be Z or Z+".to_string()));
            }
            Ok(Fields::Lpm {
                d,
                zero_form: false,
                ext,
                post_inc,
            })
        }
        n => Err(Error::BadOperand {
            pos: inst.pos.clone(),
            msg: format!("{} takes zero or two operands, found {n}", inst.mnemonic),
        }),
    }
}

// ----------------------------------------------------------------------------
