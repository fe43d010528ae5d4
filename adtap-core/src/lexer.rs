//! Lexer: scans GAQL text into a token stream.
//!
//! Single pass, no backtracking. Positions are 1-based `(line, column)`
//! counted in characters; newline advances the line and resets the column.

use crate::ast::DATE_RANGES;
use crate::error::ParseError;
use crate::token::{KEYWORDS, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphabetic() || ch.is_ascii_digit() || ch == '_'
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scan the entire input. The returned stream always ends with an
    /// [`TokenKind::Eof`] token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();

        let (line, column) = (self.line, self.column);
        let Some(ch) = self.peek(0) else {
            return Ok(Token::new(TokenKind::Eof, "", line, column));
        };

        match ch {
            ',' => {
                self.advance();
                Ok(Token::new(TokenKind::Comma, ",", line, column))
            }
            '(' => {
                self.advance();
                Ok(Token::new(TokenKind::LParen, "(", line, column))
            }
            ')' => {
                self.advance();
                Ok(Token::new(TokenKind::RParen, ")", line, column))
            }
            '.' => {
                self.advance();
                Ok(Token::new(TokenKind::Dot, ".", line, column))
            }
            '=' => {
                self.advance();
                Ok(Token::new(TokenKind::Eq, "=", line, column))
            }
            '!' => {
                if self.peek(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::Neq, "!=", line, column))
                } else {
                    Err(ParseError::new("unexpected character '!'", line, column))
                }
            }
            '>' => {
                if self.peek(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::Gte, ">=", line, column))
                } else {
                    self.advance();
                    Ok(Token::new(TokenKind::Gt, ">", line, column))
                }
            }
            '<' => {
                if self.peek(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::Lte, "<=", line, column))
                } else {
                    self.advance();
                    Ok(Token::new(TokenKind::Lt, "<", line, column))
                }
            }
            '\'' | '"' => self.read_string(ch),
            // The grammar has no subtraction: a minus sign only opens a
            // numeric literal.
            '-' => {
                if self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
                    Ok(self.read_number())
                } else {
                    Err(ParseError::new("unexpected character '-'", line, column))
                }
            }
            c if c.is_ascii_digit() => Ok(self.read_number()),
            c if is_ident_start(c) => Ok(self.read_ident_or_keyword()),
            c => Err(ParseError::new(
                format!("unexpected character '{c}'"),
                line,
                column,
            )),
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, ParseError> {
        let (line, column) = (self.line, self.column);
        self.advance(); // opening quote

        let mut value = String::new();
        while let Some(ch) = self.peek(0) {
            if ch == quote {
                self.advance();
                return Ok(Token::new(TokenKind::String, value, line, column));
            }
            if ch == '\\' {
                if let Some(escaped) = self.peek(1) {
                    self.advance();
                    self.advance();
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other, // \\ \' \" and anything else pass through
                    });
                    continue;
                }
            }
            value.push(ch);
            self.advance();
        }

        Err(ParseError::new("unterminated string", line, column))
    }

    fn read_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut value = String::new();

        if self.peek(0) == Some('-') {
            value.push('-');
            self.advance();
        }
        while let Some(ch) = self.peek(0) {
            if !ch.is_ascii_digit() {
                break;
            }
            value.push(ch);
            self.advance();
        }
        // A decimal point only belongs to the number when digits follow;
        // otherwise it lexes as punctuation.
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            value.push('.');
            self.advance();
            while let Some(ch) = self.peek(0) {
                if !ch.is_ascii_digit() {
                    break;
                }
                value.push(ch);
                self.advance();
            }
        }

        Token::new(TokenKind::Number, value, line, column)
    }

    fn read_ident_or_keyword(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut value = String::new();

        while let Some(ch) = self.peek(0) {
            if !is_ident_continue(ch) {
                break;
            }
            value.push(ch);
            self.advance();
        }

        let upper = value.to_uppercase();

        // ORDER BY is a single token even though it is two words.
        if upper == "ORDER" {
            self.skip_whitespace();
            if matches!(self.peek(0), Some('b' | 'B'))
                && matches!(self.peek(1), Some('y' | 'Y'))
                && !self.peek(2).is_some_and(is_ident_continue)
            {
                self.advance();
                self.advance();
                return Token::new(TokenKind::OrderBy, "ORDER BY", line, column);
            }
            return Token::new(TokenKind::Ident, value, line, column);
        }

        if DATE_RANGES.contains_key(upper.as_str()) {
            return Token::new(TokenKind::DateRange, upper, line, column);
        }

        if let Some(&kind) = KEYWORDS.get(upper.as_str()) {
            return Token::new(kind, upper, line, column);
        }

        Token::new(TokenKind::Ident, value, line, column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek(0) {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.column += 1;
                    self.pos += 1;
                }
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }

    fn advance(&mut self) {
        if let Some(&ch) = self.chars.get(self.pos) {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .expect("tokenize failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("SELECT campaign.id FROM campaign"),
            vec![
                TokenKind::Select,
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::From,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("= != > >= < <="),
            vec![
                TokenKind::Eq,
                TokenKind::Neq,
                TokenKind::Gt,
                TokenKind::Gte,
                TokenKind::Lt,
                TokenKind::Lte,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        let tokens = Lexer::new("'hello' \"world\"").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].value, "hello");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].value, "world");
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r"'a\'b\\c\nd\te\qf'").tokenize().unwrap();
        assert_eq!(tokens[0].value, "a'b\\c\nd\teqf");
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("123 45.67 -10").tokenize().unwrap();
        let values: Vec<&str> = tokens[..3].iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["123", "45.67", "-10"]);
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_number_trailing_dot_is_punctuation() {
        assert_eq!(
            kinds("1."),
            vec![TokenKind::Number, TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn test_date_range_keywords() {
        let tokens = Lexer::new("DURING last_7_days").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::During);
        assert_eq!(tokens[1].kind, TokenKind::DateRange);
        // Date-range keywords are stored upper-cased.
        assert_eq!(tokens[1].value, "LAST_7_DAYS");
    }

    #[test]
    fn test_keywords_upper_cased_idents_preserved() {
        let tokens = Lexer::new("select Campaign.Id from Campaign").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Select);
        assert_eq!(tokens[0].value, "SELECT");
        assert_eq!(tokens[1].value, "Campaign");
        assert_eq!(tokens[3].value, "Id");
    }

    #[test]
    fn test_order_by_fused() {
        assert_eq!(
            kinds("ORDER BY metrics.clicks"),
            vec![
                TokenKind::OrderBy,
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        // Case-insensitive, whitespace between the words.
        let tokens = Lexer::new("order\n  by x").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::OrderBy);
        assert_eq!(tokens[0].value, "ORDER BY");
    }

    #[test]
    fn test_order_without_by_is_ident() {
        let tokens = Lexer::new("order campaign").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].value, "order");
    }

    #[test]
    fn test_order_bye_not_fused() {
        let tokens = Lexer::new("ORDER BYE").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].value, "ORDER");
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].value, "BYE");
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("SELECT campaign.id\nFROM campaign").tokenize().unwrap();
        let positions: Vec<(usize, usize)> =
            tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(
            positions,
            vec![(1, 1), (1, 8), (1, 16), (1, 17), (2, 1), (2, 6), (2, 14)]
        );
    }

    #[test]
    fn test_empty_input() {
        let tokens = Lexer::new("").tokenize().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    }

    #[test]
    fn test_trailing_whitespace_ignored() {
        let tokens = Lexer::new("campaign  \n\t ").tokenize().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("SELECT 'abc").tokenize().unwrap_err();
        assert_eq!(err.message, "unterminated string");
        assert_eq!((err.line, err.column), (1, 8));
    }

    #[test]
    fn test_lone_bang() {
        let err = Lexer::new("a ! b").tokenize().unwrap_err();
        assert_eq!(err.message, "unexpected character '!'");
        assert_eq!((err.line, err.column), (1, 3));
    }

    #[test]
    fn test_lone_minus() {
        let err = Lexer::new("a - b").tokenize().unwrap_err();
        assert_eq!(err.message, "unexpected character '-'");
        assert_eq!((err.line, err.column), (1, 3));
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("a ; b").tokenize().unwrap_err();
        assert_eq!(err.message, "unexpected character ';'");
    }

    #[test]
    fn test_comments_are_not_supported() {
        assert!(Lexer::new("SELECT a FROM b -- note").tokenize().is_err());
        assert!(Lexer::new("/* note */ SELECT a FROM b").tokenize().is_err());
    }

    #[test]
    fn test_positions_monotonic() {
        let input = "SELECT campaign.id, metrics.clicks\nFROM campaign\nWHERE metrics.clicks > 10";
        let tokens = Lexer::new(input).tokenize().unwrap();
        for pair in tokens.windows(2) {
            assert!(pair[0].line < pair[1].line
                || (pair[0].line == pair[1].line && pair[0].column < pair[1].column));
        }
    }
}
