mod lexer;
mod parser;
mod token;


pub use self::lexer::Lexer;
pub use self::parser::{GameOutcome, ParseReport, Parser};
pub use self::token::{Span, Token, TokenKind};

use crate::error::ReadError;
use crate::options::ParseOptions;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Decode PGN bytes: UTF-8 when valid, otherwise ISO-8859-1.
///
/// A leading UTF-8 byte order mark is dropped.
pub fn decode_source(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => Cow::Owned(bytes.iter().map(|&byte| char::from(byte)).collect()),
    }
}

pub fn parse_pgn(source: &str, options: ParseOptions) -> ParseReport {
    Parser::new(source, options).parse_database()
}

/// Read everything from `reader`, then parse it.
pub fn parse_pgn_reader<R: Read>(
    mut reader: R,
    options: ParseOptions,
) -> Result<ParseReport, ReadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    debug!(bytes = bytes.len(), "read PGN source");
    Ok(parse_pgn(&decode_source(&bytes), options))
}

pub fn parse_pgn_file(path: &Path, options: ParseOptions) -> Result<ParseReport, ReadError> {
    let file = File::open(path)?;
    debug!(path = %path.display(), "opened PGN file");
    parse_pgn_reader(BufReader::new(file), options)
}
