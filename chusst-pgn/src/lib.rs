//! Reader for PGN (Portable Game Notation) databases.
//!
//! ```text
//! text ──Lexer──▶ tokens ──Parser──▶ Database + one GameOutcome per game
//! ```
//!
//! Moves are kept as opaque SAN symbols; nothing here checks that they are
//! legal. Comments and escape lines are recognized and skipped.

pub mod error;
pub mod options;
pub mod pgn;
pub mod reader;

pub use error::{ErrorCategory, Expected, Found, PgnError, ReadError};
pub use options::{ParseOptions, DEFAULT_MAX_VARIATION_DEPTH, VARIATION_DEPTH_CEILING};
pub use pgn::{
    Database, Element, ElementSequence, Game, GameTermination, MovetextSection, Node, TagPair,
    Variation,
};
pub use reader::{
    parse_pgn_file, parse_pgn_reader, GameOutcome, Lexer, ParseReport, Span, Token, TokenKind,
};

/// Parse a PGN database with the default options.
pub fn parse(source: &str) -> ParseReport {
    reader::parse_pgn(source, ParseOptions::default())
}

/// Parse a PGN database with custom options.
pub fn parse_with(source: &str, options: ParseOptions) -> ParseReport {
    reader::parse_pgn(source, options)
}
