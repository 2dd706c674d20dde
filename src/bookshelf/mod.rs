//! Bookshelf benchmark reader and placement writer.
//!
//! A benchmark `<dir>/<name>` is three whitespace-delimited text files:
//!
//! ```text
//! <name>.nodes   UCLA nodes 1.0
//!                NumNodes : <n>
//!                NumTerminals : <t>
//!                <id> <width> <height> [terminal]
//!
//! <name>.pl      UCLA pl 1.0
//!                <id> <x> <y> : <orient> [/FIXED]
//!
//! <name>.nets    UCLA nets 1.0
//!                NumNets : <n>
//!                NumPins : <p>
//!                NetDegree : <d> <id>
//!                  <module> I|O|B [: <dx> <dy>]
//! ```
//!
//! `#` starts a comment that runs to the end of the line. `.pl` coordinates
//! are lower-left corners; pin offsets are relative to the module centre.

mod lexer;
mod parser;
mod records;
mod writer;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use records::*;
pub use writer::{write_pl, write_pl_file};

use std::path::Path;

use tracing::debug;

use crate::circuit::Circuit;
use crate::error::{PlacerError, Result};

/// Parse a `.nodes` document.
pub fn parse_nodes(input: &str) -> Result<NodesFile> {
    Parser::new(Lexer::new(input))?.parse_nodes()
}

/// Parse a `.pl` document.
pub fn parse_pl(input: &str) -> Result<Vec<PlRecord>> {
    Parser::new(Lexer::new(input))?.parse_pl()
}

/// Parse a `.nets` document.
pub fn parse_nets(input: &str) -> Result<NetsFile> {
    Parser::new(Lexer::new(input))?.parse_nets()
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| PlacerError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Read `<path>.nodes`, `<path>.pl` and `<path>.nets` and load them into a
/// new circuit named after the last path component.
pub fn load_benchmark(path: &Path) -> Result<Circuit> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            PlacerError::config(format!("invalid benchmark path '{}'", path.display()))
        })?;
    let with_ext = |ext: &str| path.with_file_name(format!("{}.{}", name, ext));

    let nodes = parse_nodes(&read_file(&with_ext("nodes"))?)?;
    let placements = parse_pl(&read_file(&with_ext("pl"))?)?;
    let nets = parse_nets(&read_file(&with_ext("nets"))?)?;
    debug!(
        nodes = nodes.nodes.len(),
        placements = placements.len(),
        nets = nets.nets.len(),
        "parsed benchmark files"
    );

    Circuit::from_records(name, &nodes.nodes, &placements, &nets.nets)
}
