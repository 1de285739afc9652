use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::Error;
use crate::token::{Pos, Token, TokenKind};

/// Lexer for a single source line.
pub struct LineLexer<'a> {
    iter: Peekable<CharIndices<'a>>,
    file: &'a str,
    line: usize,
}

impl<'a> LineLexer<'a> {
    pub fn new(code: &'a str, file: &'a str, line: usize) -> Self {
        Self {
            iter: code.char_indices().peekable(),
            file,
            line,
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers

impl<'a> LineLexer<'a> {
    fn peek(&mut self) -> Option<(usize, char)> {
        self.iter.peek().copied()
    }

    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }

    fn pos(&self, idx: usize) -> Pos {
        Pos::new(self.file, self.line, idx + 1)
    }

    /// Consumes up to the next whitespace or comma.
    fn take_word(&mut self) -> String {
        let mut word = String::new();
        while let Some((_, ch)) = self
            .iter
            .next_if(|&(_, ch)| !ch.is_whitespace() && ch != ',')
        {
            word.push(ch);
        }
        word
    }

    fn err(&self, idx: usize, msg: String) -> Error {
        Error::Lex {
            pos: self.pos(idx),
            msg,
        }
    }
}

// ----------------------------------------------------------------------------
// Lexer

impl<'a> LineLexer<'a> {
    pub fn lex(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some((idx, ch0)) = self.peek() {
            // 0. Whitespace separates tokens; commas separate operands
            //    but are not tokens themselves.
            if ch0.is_whitespace() || ch0 == ',' {
                self.consume();
                continue;
            }

            // 1. A comment ends the line.
            if ch0 == ';' {
                break;
            }

            let pos = self.pos(idx);

            // 2. Directive tag.
            if ch0 == '.' {
                let word = self.take_word();
                tokens.push(Token::new(TokenKind::MetaTag(word), pos));
                continue;
            }

            // 3. Identifier: label when it ends with `:`, operand otherwise.
            if ch0.is_ascii_alphabetic() {
                let word = self.take_word();
                let kind = match word.strip_suffix(':') {
                    Some(name) => TokenKind::Label(name.to_string()),
                    None => TokenKind::Operand(word),
                };
                tokens.push(Token::new(kind, pos));
                continue;
            }

            // 4. String literal.
            if ch0 == '"' {
                self.consume();
                let mut value = String::new();
                loop {
                    match self.consume() {
                        Some((_, '"')) => break,
                        Some((_, ch)) => value.push(ch),
                        None => {
                            return Err(self.err(idx, "string without matching `\"`".to_string()))
                        }
                    }
                }
                tokens.push(Token::new(TokenKind::StringLiteral(value), pos));
                continue;
            }

            // 5. Number literal in one of the three bases.
            if ch0.is_ascii_digit() {
                let word = self.take_word();
                tokens.push(Token::new(self.number(idx, word)?, pos));
                continue;
            }

            return Err(self.err(idx, format!("unexpected character `{ch0}`")));
        }
        Ok(tokens)
    }

    /// Classifies a numeric lexeme. Any non-digit inside the number is a
    /// lex error; numbers end only at whitespace, comma or end of line.
    fn number(&self, start: usize, word: String) -> Result<TokenKind, Error> {
        if let Some(digits) = word.strip_prefix("0x") {
            if digits.is_empty() {
                return Err(self.err(start, "incomplete hex literal".to_string()));
            }
            for (off, ch) in digits.char_indices() {
                if !ch.is_ascii_hexdigit() {
                    return Err(self.err(start + 2 + off, format!("non-hex char `{ch}`")));
                }
            }
            return Ok(TokenKind::Hexadecimal(word));
        }
        if let Some(digits) = word.strip_prefix("0b") {
            if digits.is_empty() {
                return Err(self.err(start, "incomplete binary literal".to_string()));
            }
            for (off, ch) in digits.char_indices() {
                if ch != '0' && ch != '1' {
                    return Err(self.err(start + 2 + off, format!("non-binary char `{ch}`")));
                }
            }
            return Ok(TokenKind::Binary(word));
        }
        for (off, ch) in word.char_indices() {
            if !ch.is_ascii_digit() {
                return Err(self.err(start + off, format!("non-decimal char `{ch}`")));
            }
        }
        Ok(TokenKind::Decimal(word))
    }
}
