//! Parser for Bookshelf `.nodes`, `.pl` and `.nets` files.

use std::str::FromStr;

use super::lexer::{Lexer, Token, TokenKind};
use super::records::*;
use crate::circuit::IoType;
use crate::error::{PlacerError, Result};

/// Parser for one Bookshelf file.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse a `.nodes` file.
    pub fn parse_nodes(&mut self) -> Result<NodesFile> {
        self.parse_header("nodes")?;
        let num_nodes = self.parse_field("NumNodes")?;
        let num_terminals = self.parse_field("NumTerminals")?;

        let mut nodes = Vec::new();
        self.skip_newlines()?;
        while self.current.kind != TokenKind::Eof {
            let line = self.current.line;
            let id = self.expect_word()?.text;
            let width = self.parse_number("width")?;
            let height = self.parse_number("height")?;
            let fixed = self.at_word_prefix("terminal");
            if fixed {
                self.advance()?;
            }
            self.end_of_line()?;
            nodes.push(NodeRecord {
                id,
                width,
                height,
                fixed,
                line,
            });
        }

        self.check_count("NumNodes", num_nodes, nodes.len())?;
        let terminals = nodes.iter().filter(|n| n.fixed).count();
        self.check_count("NumTerminals", num_terminals, terminals)?;

        Ok(NodesFile {
            num_nodes,
            num_terminals,
            nodes,
        })
    }

    /// Parse a `.pl` file.
    pub fn parse_pl(&mut self) -> Result<Vec<PlRecord>> {
        self.parse_header("pl")?;

        let mut records = Vec::new();
        self.skip_newlines()?;
        while self.current.kind != TokenKind::Eof {
            let id = self.expect_word()?.text;
            let x = self.parse_number("x")?;
            let y = self.parse_number("y")?;
            if self.current.kind == TokenKind::Colon {
                self.advance()?;
                // orientation
                self.expect_word()?;
            }
            let fixed = self.at_word_prefix("/FIXED");
            if fixed {
                self.advance()?;
            }
            self.end_of_line()?;
            records.push(PlRecord { id, x, y, fixed });
        }

        Ok(records)
    }

    /// Parse a `.nets` file.
    ///
    /// Pin lines are collected up to the next `NetDegree` line, so a net
    /// whose declared degree differs from its pin list is returned as is
    /// and rejected when the circuit is loaded.
    pub fn parse_nets(&mut self) -> Result<NetsFile> {
        self.parse_header("nets")?;
        let num_nets = self.parse_field("NumNets")?;
        let num_pins = self.parse_field("NumPins")?;

        let mut nets = Vec::new();
        self.skip_newlines()?;
        while self.current.kind != TokenKind::Eof {
            self.expect_keyword("NetDegree")?;
            self.expect(TokenKind::Colon)?;
            let degree = self.parse_number("net degree")?;
            let id = self.expect_word()?.text;
            self.end_of_line()?;

            let mut pins = Vec::new();
            while self.current.kind == TokenKind::Word && self.current.text != "NetDegree" {
                pins.push(self.parse_pin()?);
            }
            nets.push(NetRecord { id, degree, pins });
        }

        self.check_count("NumNets", num_nets, nets.len())?;
        let pins: usize = nets.iter().map(|n| n.pins.len()).sum();
        self.check_count("NumPins", num_pins, pins)?;

        Ok(NetsFile {
            num_nets,
            num_pins,
            nets,
        })
    }

    fn parse_pin(&mut self) -> Result<PinRecord> {
        let module = self.expect_word()?.text;
        let io_token = self.expect_word()?;
        let io = IoType::from_code(&io_token.text).ok_or_else(|| {
            PlacerError::parse(
                io_token.line,
                format!("unknown pin direction '{}'", io_token.text),
            )
        })?;

        let (dx, dy) = if self.current.kind == TokenKind::Colon {
            self.advance()?;
            (self.parse_number("pin x offset")?, self.parse_number("pin y offset")?)
        } else {
            (0.0, 0.0)
        };
        self.end_of_line()?;

        Ok(PinRecord { module, io, dx, dy })
    }

    /// `UCLA <kind> <version>`
    fn parse_header(&mut self, kind: &str) -> Result<()> {
        self.skip_newlines()?;
        self.expect_keyword("UCLA")?;
        self.expect_keyword(kind)?;
        self.expect_word()?;
        self.end_of_line()
    }

    /// `<name> : <count>`
    fn parse_field(&mut self, name: &str) -> Result<usize> {
        self.skip_newlines()?;
        self.expect_keyword(name)?;
        self.expect(TokenKind::Colon)?;
        let value = self.parse_number(name)?;
        self.end_of_line()?;
        Ok(value)
    }

    fn check_count(&self, field: &str, declared: usize, actual: usize) -> Result<()> {
        if declared != actual {
            return Err(PlacerError::parse(
                self.current.line,
                format!("{} declares {} but the file lists {}", field, declared, actual),
            ));
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn at_word_prefix(&self, prefix: &str) -> bool {
        self.current.kind == TokenKind::Word && self.current.text.starts_with(prefix)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(PlacerError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn expect_word(&mut self) -> Result<Token> {
        self.expect(TokenKind::Word)
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.current.kind == TokenKind::Word && self.current.text == keyword {
            self.advance()
        } else {
            Err(PlacerError::parse(
                self.current.line,
                format!("expected '{}', got {:?}", keyword, self.current.text),
            ))
        }
    }

    fn parse_number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let tok = self.expect_word()?;
        tok.text.parse().map_err(|_| {
            PlacerError::parse(tok.line, format!("invalid {} '{}'", what, tok.text))
        })
    }

    /// Consume the end of a record line and any blank lines after it.
    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.skip_newlines(),
            TokenKind::Eof => Ok(()),
            _ => Err(PlacerError::parse(
                self.current.line,
                format!("unexpected trailing token '{}'", self.current.text),
            )),
        }
    }

    fn skip_newlines(&mut self) -> Result<()> {
        while self.current.kind == TokenKind::Newline {
            self.advance()?;
        }
        Ok(())
    }
}
