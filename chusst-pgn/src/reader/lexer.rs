use super::token::{Span, Token, TokenKind};

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_till, take_while};
use nom::character::complete::{anychar, char, digit1, line_ending, one_of, satisfy, space1};
use nom::combinator::{opt, recognize};
use nom::multi::many0_count;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;
use tracing::trace;

type Rule = fn(&str) -> IResult<&str, &str>;

fn is_line_end(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn white_wins(input: &str) -> IResult<&str, &str> {
    tag("1-0")(input)
}

fn black_wins(input: &str) -> IResult<&str, &str> {
    tag("0-1")(input)
}

fn draw(input: &str) -> IResult<&str, &str> {
    tag("1/2-1/2")(input)
}

fn rest_of_line_comment(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char(';'), take_till(is_line_end)))(input)
}

fn brace_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((char('{'), take_till(|c| c == '}'), char('}'))))(input)
}

fn escape_line(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char('%'), take_till(is_line_end)))(input)
}

fn space(input: &str) -> IResult<&str, &str> {
    alt((space1, line_ending, tag("\r")))(input)
}

fn string_body(input: &str) -> IResult<&str, &str> {
    recognize(many0_count(alt((
        tag("\\\\"),
        tag("\\\""),
        is_not("\"\\"),
    ))))(input)
}

fn string(input: &str) -> IResult<&str, &str> {
    recognize(delimited(char('"'), string_body, char('"')))(input)
}

fn integer(input: &str) -> IResult<&str, &str> {
    digit1(input)
}

fn period(input: &str) -> IResult<&str, &str> {
    tag(".")(input)
}

fn asterisk(input: &str) -> IResult<&str, &str> {
    tag("*")(input)
}

fn left_bracket(input: &str) -> IResult<&str, &str> {
    tag("[")(input)
}

fn right_bracket(input: &str) -> IResult<&str, &str> {
    tag("]")(input)
}

fn left_paren(input: &str) -> IResult<&str, &str> {
    tag("(")(input)
}

fn right_paren(input: &str) -> IResult<&str, &str> {
    tag(")")(input)
}

fn left_angle(input: &str) -> IResult<&str, &str> {
    tag("<")(input)
}

fn right_angle(input: &str) -> IResult<&str, &str> {
    tag(">")(input)
}

fn nag(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char('$'), digit1))(input)
}

fn symbol(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphanumeric()),
        take_while(|c: char| c.is_ascii_alphanumeric() || "_+#=:-".contains(c)),
    ))(input)
}

fn suffix_annotation(input: &str) -> IResult<&str, &str> {
    recognize(pair(one_of("!?"), opt(one_of("!?"))))(input)
}

fn unexpected_char(input: &str) -> IResult<&str, &str> {
    recognize(anychar)(input)
}

// Same order as `TokenKind`: earlier rules win ties.
const RULES: [(TokenKind, Rule); 21] = [
    (TokenKind::WhiteWins, white_wins),
    (TokenKind::BlackWins, black_wins),
    (TokenKind::Draw, draw),
    (TokenKind::RestOfLineComment, rest_of_line_comment),
    (TokenKind::BraceComment, brace_comment),
    (TokenKind::EscapeLine, escape_line),
    (TokenKind::Space, space),
    (TokenKind::String, string),
    (TokenKind::Integer, integer),
    (TokenKind::Period, period),
    (TokenKind::Asterisk, asterisk),
    (TokenKind::LeftBracket, left_bracket),
    (TokenKind::RightBracket, right_bracket),
    (TokenKind::LeftParen, left_paren),
    (TokenKind::RightParen, right_paren),
    (TokenKind::LeftAngle, left_angle),
    (TokenKind::RightAngle, right_angle),
    (TokenKind::Nag, nag),
    (TokenKind::Symbol, symbol),
    (TokenKind::SuffixAnnotation, suffix_annotation),
    (TokenKind::UnexpectedChar, unexpected_char),
];

/// Lazy PGN tokenizer.
///
/// Yields every token, trivia included, in source order. Malformed input never
/// stops the iteration: it shows up as tokens whose kind satisfies
/// [`TokenKind::is_error`].
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    // No `}` left in the source
    brace_unclosed: bool,
    // Strings opened before this offset run into a bad escape or the end
    string_unclosed_until: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            offset: 0,
            line: 1,
            column: 1,
            brace_unclosed: false,
            string_unclosed_until: 0,
        }
    }

    /// Tokenize the whole source, trivia included.
    pub fn tokenize(source: &'a str) -> Vec<Token<'a>> {
        Lexer::new(source).collect()
    }

    /// Empty span at the current position; at the end of the source once the
    /// iterator is exhausted.
    pub fn position(&self) -> Span {
        Span {
            start: self.offset,
            end: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Only the tokens the grammar looks at.
    pub fn significant(self) -> impl Iterator<Item = Token<'a>> {
        self.filter(|token| !token.kind.is_trivia())
    }

    fn longest_match(&self, input: &str) -> (TokenKind, usize) {
        let mut best: Option<(TokenKind, usize)> = None;

        for (kind, rule) in RULES {
            match kind {
                // Escape lines are only recognized at the start of a line
                TokenKind::EscapeLine if self.column != 1 => continue,
                // Known to fail, no need to scan again
                TokenKind::BraceComment if self.brace_unclosed => continue,
                TokenKind::String if self.offset < self.string_unclosed_until => continue,
                _ => (),
            }

            if let Ok((rest, _)) = rule(input) {
                let length = input.len() - rest.len();
                if length > 0 && best.map_or(true, |(_, best_length)| length > best_length) {
                    best = Some((kind, length));
                }
            }
        }

        let first_len = input.chars().next().map_or(0, char::len_utf8);
        let (kind, length) = best.unwrap_or((TokenKind::UnexpectedChar, first_len));

        match (kind, input.chars().next()) {
            (TokenKind::UnexpectedChar, Some('"')) => (TokenKind::UnterminatedString, length),
            (TokenKind::UnexpectedChar, Some('{')) => (TokenKind::UnterminatedComment, length),
            _ => (kind, length),
        }
    }

    fn advance_over(&mut self, text: &str) {
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' => {
                    chars.next_if_eq(&'\n');
                    self.line += 1;
                    self.column = 1;
                }
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                _ => self.column += 1,
            }
        }
        self.offset += text.len();
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let input = &self.source[self.offset..];
        if input.is_empty() {
            return None;
        }

        let (kind, length) = self.longest_match(input);
        match kind {
            TokenKind::UnterminatedComment => self.brace_unclosed = true,
            TokenKind::UnterminatedString if self.offset >= self.string_unclosed_until => {
                let body = string_body(&input[1..])
                    .map_or(0, |(rest, _)| input.len() - 1 - rest.len());
                // Every quote inside the body was part of an escape, so strings
                // opened there stop at the same place
                self.string_unclosed_until = self.offset + 1 + body;
            }
            _ => (),
        }
        let text = &input[..length];
        let span = Span {
            start: self.offset,
            end: self.offset + length,
            line: self.line,
            column: self.column,
        };
        self.advance_over(text);

        trace!(?kind, text, line = span.line, column = span.column, "token");

        Some(Token { kind, text, span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).map(|token| token.kind).collect()
    }

    fn texts(source: &str) -> Vec<&str> {
        Lexer::new(source).significant().map(|token| token.text).collect()
    }

    #[test]
    fn keywords_win_ties_against_symbols() {
        assert_eq!(kinds("1-0"), vec![TokenKind::WhiteWins]);
        assert_eq!(kinds("0-1"), vec![TokenKind::BlackWins]);
        assert_eq!(kinds("1/2-1/2"), vec![TokenKind::Draw]);
        assert_eq!(kinds("*"), vec![TokenKind::Asterisk]);
    }

    #[test]
    fn longest_match_beats_rule_order() {
        assert_eq!(kinds("1-0x"), vec![TokenKind::Symbol]);
        assert_eq!(kinds("0-0-0"), vec![TokenKind::Symbol]);
        assert_eq!(kinds("12a"), vec![TokenKind::Symbol]);
        assert_eq!(kinds("12"), vec![TokenKind::Integer]);
        assert_eq!(kinds("1/2"), vec![TokenKind::Integer, TokenKind::UnexpectedChar, TokenKind::Integer]);
    }

    #[test]
    fn move_numbers_split_from_periods() {
        assert_eq!(
            kinds("1.e4"),
            vec![TokenKind::Integer, TokenKind::Period, TokenKind::Symbol]
        );
        assert_eq!(
            kinds("3... Nf6"),
            vec![
                TokenKind::Integer,
                TokenKind::Period,
                TokenKind::Period,
                TokenKind::Period,
                TokenKind::Space,
                TokenKind::Symbol,
            ]
        );
    }

    #[test]
    fn san_moves_are_single_symbols() {
        assert_eq!(texts("O-O-O exd8=Q+ Nbd7 Qxf7#"), vec!["O-O-O", "exd8=Q+", "Nbd7", "Qxf7#"]);
    }

    #[test]
    fn escape_lines_only_at_first_column() {
        assert_eq!(
            kinds("%engine a\n%engine b"),
            vec![TokenKind::EscapeLine, TokenKind::Space, TokenKind::EscapeLine]
        );
        assert_eq!(
            kinds(" %x"),
            vec![TokenKind::Space, TokenKind::UnexpectedChar, TokenKind::Symbol]
        );
        assert_eq!(
            kinds("e4 %x"),
            vec![
                TokenKind::Symbol,
                TokenKind::Space,
                TokenKind::UnexpectedChar,
                TokenKind::Symbol
            ]
        );
    }

    #[test]
    fn escape_line_after_crlf() {
        assert_eq!(
            kinds("e4\r\n%x"),
            vec![TokenKind::Symbol, TokenKind::Space, TokenKind::EscapeLine]
        );
    }

    #[test]
    fn comments_are_trivia() {
        let tokens = Lexer::tokenize("e4 ; best by test\n{ a\nlong } e5");
        let trivia: Vec<&str> = tokens
            .iter()
            .filter(|token| token.kind.is_trivia() && token.kind != TokenKind::Space)
            .map(|token| token.text)
            .collect();
        assert_eq!(trivia, vec!["; best by test", "{ a\nlong }"]);
        assert_eq!(texts("e4 ; best by test\n{ a\nlong } e5"), vec!["e4", "e5"]);
    }

    #[test]
    fn positions_follow_newlines() {
        let tokens: Vec<Token> = Lexer::new("[A \"b\"]\r\n{x\ny} e4").significant().collect();
        let e4 = tokens.last().unwrap();
        assert_eq!(e4.text, "e4");
        assert_eq!((e4.span.line, e4.span.column), (3, 4));
        assert_eq!(e4.span.start, 15);
    }

    #[test]
    fn strings_with_escapes() {
        let tokens = Lexer::tokenize(r#""a \"quoted\" b \\""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        assert_eq!(
            kinds("\"abc"),
            vec![TokenKind::UnterminatedString, TokenKind::Symbol]
        );
        // Only \" and \\ are valid escapes
        assert_eq!(kinds(r#""a\n""#)[0], TokenKind::UnterminatedString);
    }

    #[test]
    fn unterminated_comment_is_an_error_token() {
        assert_eq!(
            kinds("{abc"),
            vec![TokenKind::UnterminatedComment, TokenKind::Symbol]
        );
    }

    #[test]
    fn many_unclosed_braces() {
        let source = format!("{}e4", "{".repeat(20_000));
        let tokens = Lexer::tokenize(&source);

        assert_eq!(tokens.len(), 20_001);
        assert!(tokens[..20_000]
            .iter()
            .all(|token| token.kind == TokenKind::UnterminatedComment && token.text == "{"));
        assert_eq!(tokens[20_000].kind, TokenKind::Symbol);
        assert_eq!(tokens[20_000].span.column, 20_001);
    }

    #[test]
    fn many_unclosed_strings() {
        // Every quote after the first one is escaped
        let source = format!("\"{}", "\\\"".repeat(20_000));
        let found = kinds(&source);

        assert_eq!(found.len(), 40_001);
        assert_eq!(
            found
                .iter()
                .filter(|kind| **kind == TokenKind::UnterminatedString)
                .count(),
            20_001
        );
    }

    #[test]
    fn strings_after_a_bad_escape() {
        assert_eq!(
            kinds(r#""a\x "b""#),
            vec![
                TokenKind::UnterminatedString,
                TokenKind::Symbol,
                TokenKind::UnexpectedChar,
                TokenKind::Symbol,
                TokenKind::Space,
                TokenKind::String,
            ]
        );
    }

    #[test]
    fn nags_and_suffix_annotations() {
        assert_eq!(kinds("$14"), vec![TokenKind::Nag]);
        assert_eq!(kinds("$"), vec![TokenKind::UnexpectedChar]);
        assert_eq!(kinds("e4!?"), vec![TokenKind::Symbol, TokenKind::SuffixAnnotation]);
        assert_eq!(texts("e4!!?"), vec!["e4", "!!", "?"]);
    }

    #[test]
    fn reserved_and_unexpected_characters() {
        assert_eq!(
            kinds("<>&"),
            vec![
                TokenKind::LeftAngle,
                TokenKind::RightAngle,
                TokenKind::UnexpectedChar
            ]
        );
        let tokens = Lexer::tokenize("é");
        assert_eq!(tokens[0].kind, TokenKind::UnexpectedChar);
        assert_eq!(tokens[0].text, "é");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(Lexer::tokenize("").is_empty());
        assert_eq!(Lexer::new(" \t\n\n").significant().count(), 0);
    }
}
