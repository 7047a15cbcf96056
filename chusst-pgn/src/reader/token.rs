use std::fmt;

/// Lexical categories of PGN text.
///
/// The declaration order is the tie-break order of the tokenizer: when two
/// rules match the same number of characters, the one declared first wins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    WhiteWins,
    BlackWins,
    Draw,
    RestOfLineComment,
    BraceComment,
    EscapeLine,
    Space,
    String,
    Integer,
    Period,
    Asterisk,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    LeftAngle,
    RightAngle,
    Nag,
    Symbol,
    SuffixAnnotation,
    UnexpectedChar,
    // Lexical errors
    UnterminatedString,
    UnterminatedComment,
}

impl TokenKind {
    /// Whitespace, comments and escape lines, skipped by the grammar.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::RestOfLineComment
                | TokenKind::BraceComment
                | TokenKind::EscapeLine
                | TokenKind::Space
        )
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            TokenKind::UnexpectedChar
                | TokenKind::UnterminatedString
                | TokenKind::UnterminatedComment
        )
    }

    pub fn is_termination(self) -> bool {
        matches!(
            self,
            TokenKind::WhiteWins | TokenKind::BlackWins | TokenKind::Draw | TokenKind::Asterisk
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenKind::WhiteWins => "'1-0'",
            TokenKind::BlackWins => "'0-1'",
            TokenKind::Draw => "'1/2-1/2'",
            TokenKind::RestOfLineComment => "comment",
            TokenKind::BraceComment => "brace comment",
            TokenKind::EscapeLine => "escape line",
            TokenKind::Space => "whitespace",
            TokenKind::String => "string",
            TokenKind::Integer => "integer",
            TokenKind::Period => "'.'",
            TokenKind::Asterisk => "'*'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftAngle => "'<'",
            TokenKind::RightAngle => "'>'",
            TokenKind::Nag => "NAG",
            TokenKind::Symbol => "symbol",
            TokenKind::SuffixAnnotation => "suffix annotation",
            TokenKind::UnexpectedChar => "unexpected character",
            TokenKind::UnterminatedString => "unterminated string",
            TokenKind::UnterminatedComment => "unterminated comment",
        };
        write!(f, "{}", name)
    }
}

/// Location of a token or error in the source text.
///
/// `start` and `end` are byte offsets; `line` and `column` are 1-based and
/// refer to `start`. Columns count characters, not bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Span {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Span {
    /// Range covering both spans, positioned at `self`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}
