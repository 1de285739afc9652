use std::path::Path;

use crate::context::{AssemblerContext, DataBlob, Instruction, Section};
use crate::error::{self, Error};
use crate::lexer::LineLexer;
use crate::resolve::int_value;
use crate::token::{DataType, Pos, Token, TokenKind};

pub const MAX_IMPORT_DEPTH: usize = 64;

/// Parses a source file into the context, starting at `origin` (program
/// words). Returns the program counter after the last emitted word, which
/// an importing file continues from.
pub fn parse_file(
    ctx: &mut AssemblerContext,
    path: &Path,
    origin: u16,
    depth: usize,
) -> Result<u16, Error> {
    let source = std::fs::read_to_string(path)
        .map_err(|err| Error::FileOpen(path.display().to_string(), err))?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let file = path.display().to_string();
    FileParser::new(ctx, &dir, depth, origin).run(&file, &source)
}

/// Parses in-memory source, for tests and tooling. Import paths resolve
/// against the current directory.
pub fn parse_source(
    ctx: &mut AssemblerContext,
    file: &str,
    source: &str,
    origin: u16,
) -> Result<u16, Error> {
    FileParser::new(ctx, Path::new("."), 0, origin).run(file, source)
}

// ----------------------------------------------------------------------------
// Per-file state

struct OpenMacro {
    name: String,
    body: Vec<Instruction>,
    pos: Pos,
}

struct FileParser<'a> {
    ctx: &'a mut AssemblerContext,
    dir: &'a Path,
    depth: usize,
    /// Origin of the open section, program words.
    origin: u16,
    /// Words emitted into the open section.
    cursor: u16,
    insts: Vec<Instruction>,
    open_macro: Option<OpenMacro>,
}

impl<'a> FileParser<'a> {
    fn new(ctx: &'a mut AssemblerContext, dir: &'a Path, depth: usize, origin: u16) -> Self {
        FileParser {
            ctx,
            dir,
            depth,
            origin,
            cursor: 0,
            insts: Vec::new(),
            open_macro: None,
        }
    }

    fn pc(&self) -> u16 {
        self.origin + self.cursor
    }

    fn flush_section(&mut self) {
        if !self.insts.is_empty() {
            let insts = std::mem::take(&mut self.insts);
            self.ctx.sections.push(Section {
                origin: self.origin,
                insts,
            });
        }
    }

    fn run(mut self, file: &str, source: &str) -> Result<u16, Error> {
        self.ctx
            .files
            .insert(file.to_string(), source.lines().map(String::from).collect());

        for (idx, raw) in source.lines().enumerate() {
            let tokens = LineLexer::new(raw, file, idx + 1).lex()?;
            self.line(&tokens)?;
        }

        if let Some(open) = &self.open_macro {
            return Err(Error::Directive {
                pos: open.pos.clone(),
                msg: format!("macro `{}` was never closed", open.name),
            });
        }
        self.flush_section();
        Ok(self.pc())
    }

    // ------------------------------------------------------------------------

    fn line(&mut self, tokens: &[Token]) -> Result<(), Error> {
        let mut rest = tokens;

        if let Some(tok) = rest.first() {
            if let TokenKind::Label(name) = &tok.kind {
                self.define_label(name, &tok.pos)?;
                rest = &rest[1..];
            }
        }

        if let Some(tok) = rest.first() {
            match &tok.kind {
                TokenKind::MetaTag(_) => rest = self.directive(tok, rest)?,
                TokenKind::Operand(name) if self.ctx.macros.contains_key(name) => {
                    self.invoke_macro(tok, name)?;
                    rest = &rest[1..];
                }
                _ => {}
            }
        }

        if let Some(tok) = rest.first() {
            let mnemonic = match &tok.kind {
                TokenKind::Operand(name) => name.to_ascii_uppercase(),
                _ => {
                    return Err(Error::Directive {
                        pos: tok.pos.clone(),
                        msg: format!("expected a mnemonic, found `{}`", tok.text()),
                    })
                }
            };
            let words = arch::inst::width(&mnemonic);
            let inst = Instruction {
                mnemonic,
                operands: rest[1..].to_vec(),
                address: self.pc(),
                pos: tok.pos.clone(),
            };
            match &mut self.open_macro {
                // Macro bodies do not advance the section counter.
                Some(open) => open.body.push(inst),
                None => {
                    self.insts.push(inst);
                    self.cursor += words;
                }
            }
        }
        Ok(())
    }

    fn define_label(&mut self, name: &str, pos: &Pos) -> Result<(), Error> {
        if self.open_macro.is_some() {
            return Err(Error::Directive {
                pos: pos.clone(),
                msg: "labels cannot be created inside a macro".to_string(),
            });
        }
        let addr = self.pc();
        if let Some(prev) = self.ctx.labels.insert(name.to_string(), addr) {
            error::warn_diag(
                &format!("label `{name}` redefined, previous value 0x{prev:04X} is overridden"),
                pos,
                &self.ctx.files,
            );
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Directives

    fn directive<'t>(&mut self, tag: &Token, rest: &'t [Token]) -> Result<&'t [Token], Error> {
        match tag.text() {
            ".org" => {
                self.reject_in_macro(tag, "define an origin")?;
                let arg = arg(tag, rest, "origin")?;
                if arg.kind.data_type() != DataType::Integer {
                    return Err(Error::Directive {
                        pos: arg.pos.clone(),
                        msg: "origin provided is not an integer".to_string(),
                    });
                }
                let bytes = int_value(arg).map_err(|msg| Error::Directive {
                    pos: arg.pos.clone(),
                    msg,
                })?;
                if bytes % 2 != 0 {
                    error::warn_diag(
                        &format!("address 0x{bytes:04X} is not 16-bit aligned"),
                        &arg.pos,
                        &self.ctx.files,
                    );
                }
                self.flush_section();
                self.origin = bytes / 2;
                self.cursor = 0;
                Ok(&rest[2..])
            }

            ".db" => {
                self.reject_in_macro(tag, "define a data blob")?;
                let arg = arg(tag, rest, "data")?;
                let data = match &arg.kind {
                    TokenKind::StringLiteral(text) => text.clone().into_bytes(),
                    kind if kind.data_type() == DataType::Integer => {
                        let value = int_value(arg).map_err(|msg| Error::Directive {
                            pos: arg.pos.clone(),
                            msg,
                        })?;
                        if value > 0xFF {
                            return Err(Error::Directive {
                                pos: arg.pos.clone(),
                                msg: format!("value 0x{value:X} does not fit in one byte"),
                            });
                        }
                        vec![value as u8]
                    }
                    _ => {
                        return Err(Error::Directive {
                            pos: arg.pos.clone(),
                            msg: "data must be a string or a number".to_string(),
                        })
                    }
                };
                self.flush_section();
                self.origin += self.cursor;
                self.cursor = 0;
                let len = data.len() as u16;
                self.ctx.blobs.push(DataBlob {
                    address: self.origin * 2,
                    data,
                });
                // Odd lengths round the origin up to the next word.
                self.origin += (len + len % 2) / 2;
                Ok(&rest[2..])
            }

            ".macro" => {
                if self.open_macro.is_some() {
                    return Err(Error::Directive {
                        pos: tag.pos.clone(),
                        msg: "cannot define a macro inside another macro".to_string(),
                    });
                }
                let arg = arg(tag, rest, "macro name")?;
                let name = match &arg.kind {
                    TokenKind::Operand(name) => name.clone(),
                    _ => {
                        return Err(Error::Directive {
                            pos: arg.pos.clone(),
                            msg: "macro name must be an identifier".to_string(),
                        })
                    }
                };
                if self.ctx.macros.contains_key(&name) {
                    return Err(Error::Directive {
                        pos: arg.pos.clone(),
                        msg: format!("macro `{name}` is already defined"),
                    });
                }
                self.open_macro = Some(OpenMacro {
                    name,
                    body: Vec::new(),
                    pos: tag.pos.clone(),
                });
                Ok(&rest[2..])
            }

            ".endmacro" => match self.open_macro.take() {
                Some(open) => {
                    self.ctx.macros.insert(open.name, open.body);
                    Ok(&rest[1..])
                }
                None => Err(Error::Directive {
                    pos: tag.pos.clone(),
                    msg: "no macro to complete".to_string(),
                }),
            },

            ".import" => {
                self.reject_in_macro(tag, "import")?;
                let arg = arg(tag, rest, "import path")?;
                if self.depth + 1 > MAX_IMPORT_DEPTH {
                    return Err(Error::ImportDepth {
                        pos: arg.pos.clone(),
                        path: arg.text().to_string(),
                    });
                }
                self.flush_section();
                let start = self.pc();
                let path = self.dir.join(arg.text());
                self.origin = parse_file(self.ctx, &path, start, self.depth + 1)?;
                self.cursor = 0;
                Ok(&rest[2..])
            }

            name => Err(Error::Directive {
                pos: tag.pos.clone(),
                msg: format!("unknown directive `{name}`"),
            }),
        }
    }

    fn reject_in_macro(&self, tag: &Token, what: &str) -> Result<(), Error> {
        if self.open_macro.is_some() {
            return Err(Error::Directive {
                pos: tag.pos.clone(),
                msg: format!("cannot {what} inside a macro"),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Macro expansion

    fn invoke_macro(&mut self, tok: &Token, name: &str) -> Result<(), Error> {
        if self.open_macro.is_some() {
            return Err(Error::Directive {
                pos: tok.pos.clone(),
                msg: "macros cannot be invoked inside a macro".to_string(),
            });
        }
        let body = self.ctx.macros[name].clone();
        for mut inst in body {
            inst.address = self.pc();
            self.cursor += arch::inst::width(&inst.mnemonic);
            self.insts.push(inst);
        }
        Ok(())
    }
}

fn arg<'t>(tag: &Token, rest: &'t [Token], what: &str) -> Result<&'t Token, Error> {
    rest.get(1).ok_or_else(|| Error::Directive {
        pos: tag.pos.clone(),
        msg: format!("no {what} provided"),
    })
}
