use super::lexer::Lexer;
use super::token::{Span, Token, TokenKind};
use crate::error::{Expected, Found, PgnError};
use crate::options::ParseOptions;
use crate::pgn::{
    Database, Element, ElementSequence, Game, GameTermination, MovetextSection, Node, TagPair,
    Variation,
};

use tracing::{debug, trace, warn};

const MOVETEXT_EXPECTED: [TokenKind; 8] = [
    TokenKind::Integer,
    TokenKind::Symbol,
    TokenKind::Nag,
    TokenKind::LeftParen,
    TokenKind::WhiteWins,
    TokenKind::BlackWins,
    TokenKind::Draw,
    TokenKind::Asterisk,
];

const VARIATION_EXPECTED: [TokenKind; 5] = [
    TokenKind::Integer,
    TokenKind::Symbol,
    TokenKind::Nag,
    TokenKind::LeftParen,
    TokenKind::RightParen,
];

/// What happened to one game of the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Parsed { span: Span },
    Failed { span: Span, errors: Vec<PgnError> },
}

impl GameOutcome {
    /// Source range of the game, from its first token to the last one read.
    pub fn span(&self) -> Span {
        match self {
            GameOutcome::Parsed { span } | GameOutcome::Failed { span, .. } => *span,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, GameOutcome::Parsed { .. })
    }

    pub fn errors(&self) -> &[PgnError] {
        match self {
            GameOutcome::Parsed { .. } => &[],
            GameOutcome::Failed { errors, .. } => errors,
        }
    }

    /// Raw text of the game in the source it was parsed from.
    pub fn source<'a>(&self, input: &'a str) -> &'a str {
        let span = self.span();
        input.get(span.start..span.end).unwrap_or_default()
    }
}

/// Result of parsing a whole database.
///
/// `database` holds the games that parsed, in source order. `outcomes` has one
/// entry per game found in the source, parsed or not.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub database: Database,
    pub outcomes: Vec<GameOutcome>,
}

impl ParseReport {
    pub fn is_ok(&self) -> bool {
        self.outcomes.iter().all(GameOutcome::is_parsed)
    }

    pub fn errors(&self) -> impl Iterator<Item = &PgnError> {
        self.outcomes.iter().flat_map(GameOutcome::errors)
    }

    /// Every game in source order, paired with its span.
    pub fn entries(&self) -> impl Iterator<Item = (Span, Result<&Game, &[PgnError]>)> {
        let mut games = self.database.games.iter();
        self.outcomes.iter().map(move |outcome| match outcome {
            GameOutcome::Parsed { span } => (*span, games.next().ok_or(&[] as &[PgnError])),
            GameOutcome::Failed { span, errors } => (*span, Err(errors.as_slice())),
        })
    }

    pub fn into_result(self) -> Result<Database, Vec<PgnError>> {
        if self.is_ok() {
            Ok(self.database)
        } else {
            Err(self
                .outcomes
                .into_iter()
                .flat_map(|outcome| match outcome {
                    GameOutcome::Parsed { .. } => Vec::new(),
                    GameOutcome::Failed { errors, .. } => errors,
                })
                .collect())
        }
    }
}

fn lex_error(token: &Token) -> PgnError {
    let message = match token.kind {
        TokenKind::UnterminatedString => "unterminated string".to_string(),
        TokenKind::UnterminatedComment => "unterminated brace comment".to_string(),
        _ => format!("unexpected character '{}'", token.text.escape_debug()),
    };
    PgnError::Lex {
        message,
        span: token.span,
    }
}

fn unescape(string: &str) -> String {
    let inner = string
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(string);

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            // The lexer only lets \\ and \" through
            '\\' => value.extend(chars.next()),
            _ => value.push(c),
        }
    }
    value
}

/// One-token-lookahead recursive descent parser over the significant tokens.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token<'a>>,
    previous: Option<Token<'a>>,
    consumed: usize,
    in_tag_section: bool,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: ParseOptions) -> Self {
        Parser {
            lexer: Lexer::new(source),
            peeked: None,
            previous: None,
            consumed: 0,
            in_tag_section: false,
            options,
        }
    }

    pub fn parse_database(mut self) -> ParseReport {
        let mut report = ParseReport::default();

        while let Some(first) = self.peek() {
            let index = report.outcomes.len();
            let consumed = self.consumed;

            match self.parse_game() {
                Ok(game) => {
                    debug!(index, tags = game.tags.len(), "parsed game");
                    report.outcomes.push(GameOutcome::Parsed {
                        span: self.span_from(first.span),
                    });
                    report.database.games.push(game);
                }
                Err(mut errors) => {
                    if let Some(error) = errors.first() {
                        warn!(index, %error, "skipping malformed game");
                    }
                    if self.consumed == consumed {
                        self.advance();
                    }
                    self.recover(&mut errors);
                    report.outcomes.push(GameOutcome::Failed {
                        span: self.span_from(first.span),
                        errors,
                    });
                }
            }
        }

        debug!(
            games = report.database.len(),
            failed = report.outcomes.len() - report.database.len(),
            "parsed database"
        );

        report
    }

    fn span_from(&self, start: Span) -> Span {
        match self.previous {
            Some(last) => start.to(last.span),
            None => start,
        }
    }

    /// Skip to the start of the next game.
    ///
    /// When the game broke inside its tag section, the tags that follow still
    /// belong to it and are skipped too.
    fn recover(&mut self, errors: &mut Vec<PgnError>) {
        let in_tag_section = std::mem::take(&mut self.in_tag_section);

        while let Some(token) = self.peek() {
            let after_tag = in_tag_section
                && self
                    .previous
                    .is_some_and(|previous| previous.kind == TokenKind::RightBracket);
            if token.kind == TokenKind::LeftBracket && !after_tag {
                break;
            }
            // Only the token the game failed on can already be reported
            let reported = errors.last().is_some_and(|error| error.span() == token.span);
            if token.kind.is_error() && !reported {
                errors.push(lex_error(&token));
            }
            trace!(kind = ?token.kind, text = token.text, "skipped");
            self.advance();
        }
    }

    fn parse_game(&mut self) -> Result<Game, Vec<PgnError>> {
        let tags = match self.parse_tag_section() {
            Ok(tags) => tags,
            Err(missing @ PgnError::Structural { .. }) => {
                // Read the movetext anyway, its errors are worth reporting too
                let mut errors = vec![missing];
                if let Err(error) = self.parse_movetext_section() {
                    errors.push(error);
                }
                return Err(errors);
            }
            Err(error) => return Err(vec![error]),
        };
        let movetext = self.parse_movetext_section().map_err(|error| vec![error])?;
        Ok(Game { tags, movetext })
    }

    fn parse_tag_section(&mut self) -> Result<Vec<TagPair>, PgnError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::LeftBracket => (),
            Some(token) if token.kind.is_error() => return Err(lex_error(&token)),
            Some(token) => {
                return Err(PgnError::Structural {
                    message: format!(
                        "game has no tag section, found {} '{}'",
                        token.kind,
                        token.text.escape_debug()
                    ),
                    span: token.span,
                })
            }
            None => {
                return Err(PgnError::Structural {
                    message: "game has no tag section".to_string(),
                    span: self.lexer.position(),
                })
            }
        }

        self.in_tag_section = true;
        let mut tags = Vec::new();
        while self.peek_kind() == Some(TokenKind::LeftBracket) {
            tags.push(self.parse_tag_pair()?);
        }
        self.in_tag_section = false;
        Ok(tags)
    }

    fn parse_tag_pair(&mut self) -> Result<TagPair, PgnError> {
        self.expect(TokenKind::LeftBracket)?;
        let name = self.expect(TokenKind::Symbol)?;
        let value = self.expect(TokenKind::String)?;
        self.expect(TokenKind::RightBracket)?;

        Ok(TagPair {
            name: name.text.to_string(),
            value: unescape(value.text),
        })
    }

    fn parse_movetext_section(&mut self) -> Result<MovetextSection, PgnError> {
        let elements = self.parse_element_sequence()?;
        let termination = self.parse_termination()?;
        Ok(MovetextSection {
            elements,
            termination,
        })
    }

    /// Elements and variations up to the first token that can't continue them.
    ///
    /// Open variations are kept on a heap stack (opening parenthesis and the
    /// enclosing sequence) instead of recursing.
    fn parse_element_sequence(&mut self) -> Result<ElementSequence, PgnError> {
        let limit = self.options.variation_depth_limit();
        let mut open: Vec<(Span, ElementSequence)> = Vec::new();
        let mut current = ElementSequence::new();

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Integer => {
                    let move_number = self.parse_move_number()?;
                    current.push(Node::Element(move_number));
                }
                TokenKind::Symbol => {
                    self.advance();
                    current.push(Node::Element(Element::SanMove(token.text.to_string())));
                }
                TokenKind::Nag => {
                    self.advance();
                    current.push(Node::Element(Element::Nag(token.text.to_string())));
                }
                TokenKind::SuffixAnnotation if !self.options.reject_suffix_annotations => {
                    trace!(text = token.text, "dropping suffix annotation");
                    self.advance();
                }
                TokenKind::LeftParen => {
                    if open.len() >= limit {
                        return Err(PgnError::Resource {
                            limit,
                            span: token.span,
                        });
                    }
                    self.advance();
                    open.push((token.span, std::mem::take(&mut current)));
                }
                TokenKind::RightParen => {
                    let Some((_, mut parent)) = open.pop() else {
                        return Err(self.unexpected(&MOVETEXT_EXPECTED));
                    };
                    self.advance();
                    parent.push(Node::Variation(Variation { elements: current }));
                    current = parent;
                }
                _ => break,
            }
        }

        if let Some((opened, _)) = open.last() {
            return Err(self.unclosed_variation(*opened));
        }

        Ok(current)
    }

    fn parse_move_number(&mut self) -> Result<Element, PgnError> {
        let token = self.expect(TokenKind::Integer)?;
        let number = token.text.parse::<u32>().map_err(|_| PgnError::Lex {
            message: format!("move number {} is out of range", token.text),
            span: token.span,
        })?;

        // "12." for white, "12..." for black
        let mut has_period = false;
        while self.peek_kind() == Some(TokenKind::Period) {
            self.advance();
            has_period = true;
        }

        Ok(Element::MoveNumber { number, has_period })
    }

    fn parse_termination(&mut self) -> Result<GameTermination, PgnError> {
        match self.peek() {
            Some(token) if token.kind.is_termination() => {
                self.advance();
                Ok(match token.kind {
                    TokenKind::WhiteWins => GameTermination::WhiteWins,
                    TokenKind::BlackWins => GameTermination::BlackWins,
                    TokenKind::Draw => GameTermination::Draw,
                    _ => GameTermination::Unknown,
                })
            }
            Some(token) if token.kind == TokenKind::LeftBracket => Err(PgnError::Structural {
                message: "missing game termination before the next game".to_string(),
                span: token.span,
            }),
            None => Err(PgnError::Structural {
                message: "missing game termination at end of input".to_string(),
                span: self.lexer.position(),
            }),
            Some(_) => Err(self.unexpected(&MOVETEXT_EXPECTED)),
        }
    }

    fn unclosed_variation(&mut self, opened: Span) -> PgnError {
        match self.peek() {
            Some(token) if token.kind.is_error() => lex_error(&token),
            Some(token) if token.kind.is_termination() || token.kind == TokenKind::LeftBracket => {
                PgnError::Structural {
                    message: format!("variation opened at {} is not closed", opened),
                    span: token.span,
                }
            }
            None => PgnError::Structural {
                message: format!("variation opened at {} is not closed", opened),
                span: self.lexer.position(),
            },
            Some(_) => self.unexpected(&VARIATION_EXPECTED),
        }
    }

    fn unexpected(&mut self, expected: &[TokenKind]) -> PgnError {
        match self.peek() {
            Some(token) if token.kind.is_error() => lex_error(&token),
            Some(token) => PgnError::Syntax {
                expected: Expected(expected.to_vec()),
                found: Found::Token {
                    kind: token.kind,
                    text: token.text.to_string(),
                },
                span: token.span,
            },
            None => PgnError::Syntax {
                expected: Expected(expected.to_vec()),
                found: Found::EndOfInput,
                span: self.lexer.position(),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, PgnError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.advance();
                Ok(token)
            }
            _ => Err(self.unexpected(&[kind])),
        }
    }

    fn peek(&mut self) -> Option<Token<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.by_ref().find(|token| !token.kind.is_trivia());
        }
        self.peeked
    }

    fn peek_kind(&mut self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        self.peeked = None;
        if token.is_some() {
            self.previous = token;
            self.consumed += 1;
        }
        token
    }
}
