//! Parser for Quartus Vector Waveform Files (`.vwf`).
//!
//! A VWF file is a sequence of brace-delimited sections holding attribute
//! assignments and, for transition lists, nested `NODE` blocks of `LEVEL`
//! statements. The parser only checks structure; the model builder gives
//! the sections their meaning.
//!
//! # Grammar Overview
//!
//! ```text
//! document    = { section } [ ";" ]
//! section     = section_kw [ "(" literal ")" ] "{" { stanza } "}"
//! stanza      = assignment | node_block | level
//! assignment  = identifier "=" literal { "," literal } ";"
//! node_block  = "NODE" "{" { stanza } "}"
//! level       = "LEVEL" literal "FOR" number ";"
//! literal     = string | number | identifier
//!
//! section_kw  = "HEADER" | "SIGNAL" | "TRANSITION_LIST" | "DISPLAY_LINE"
//!             | "TIME_BAR" | "GROUP"
//! number      = ['-'] digit+ ['.' digit*]
//! identifier  = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! `NODE` blocks may only appear inside `TRANSITION_LIST` (or another `NODE`),
//! and `LEVEL` statements only inside `NODE`. Comments use `/* */` or `//`.
//!
//! # Example
//!
//! ```text
//! HEADER
//! {
//!     VERSION = 1;
//!     TIME_UNIT = ns;
//!     DATA_OFFSET = 0.0;
//!     DATA_DURATION = 100.0;
//!     SIMULATION_TIME = 0.0;
//!     GRID_PHASE = 0.0;
//!     GRID_PERIOD = 10.0;
//!     GRID_DUTY_CYCLE = 50;
//! }
//!
//! TRANSITION_LIST("clk")
//! {
//!     NODE
//!     {
//!         REPEAT = 5;
//!         LEVEL 0 FOR 10.0;
//!         LEVEL 1 FOR 10.0;
//!     }
//! }
//! ;
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, MAX_NODE_DEPTH};

use crate::error::Result;

/// Parse VWF text into a syntax tree.
pub fn parse(input: &str) -> Result<VwfAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

