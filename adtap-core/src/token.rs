//! Lexical tokens for GAQL.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// End of input.
    Eof,

    // Keywords
    Select,
    From,
    Where,
    /// `ORDER BY`, fused into a single token by the lexer.
    OrderBy,
    Limit,
    Parameters,
    And,
    Or,
    Not,
    Asc,
    Desc,
    In,
    Like,
    Contains,
    Any,
    All,
    None,
    Is,
    Null,
    During,
    Between,
    RegexpMatch,

    // Literals
    /// Field names, resource names, unquoted enum-like values.
    Ident,
    /// `'string'` or `"string"`, value holds the unquoted content.
    String,
    /// `123`, `45.67`, `-123`; value holds the exact matched text.
    Number,
    /// Predefined date-range keyword (`TODAY`, `LAST_7_DAYS`, ...).
    DateRange,

    // Operators
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,

    // Punctuation
    Comma,
    LParen,
    RParen,
    Dot,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Select => "SELECT",
            TokenKind::From => "FROM",
            TokenKind::Where => "WHERE",
            TokenKind::OrderBy => "ORDER BY",
            TokenKind::Limit => "LIMIT",
            TokenKind::Parameters => "PARAMETERS",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Asc => "ASC",
            TokenKind::Desc => "DESC",
            TokenKind::In => "IN",
            TokenKind::Like => "LIKE",
            TokenKind::Contains => "CONTAINS",
            TokenKind::Any => "ANY",
            TokenKind::All => "ALL",
            TokenKind::None => "NONE",
            TokenKind::Is => "IS",
            TokenKind::Null => "NULL",
            TokenKind::During => "DURING",
            TokenKind::Between => "BETWEEN",
            TokenKind::RegexpMatch => "REGEXP_MATCH",
            TokenKind::Ident => "IDENT",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::DateRange => "DATE_RANGE",
            TokenKind::Eq => "=",
            TokenKind::Neq => "!=",
            TokenKind::Gt => ">",
            TokenKind::Gte => ">=",
            TokenKind::Lt => "<",
            TokenKind::Lte => "<=",
            TokenKind::Comma => ",",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Dot => ".",
        };
        write!(f, "{name}")
    }
}

/// A lexical token with its 1-based source position.
///
/// `value` preserves the original text for identifiers and string contents;
/// keywords and date-range keywords are stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
        }
    }
}

/// Keyword table, keyed by upper-cased text.
///
/// `ORDER` and `BY` are not listed: the lexer fuses them into a single
/// [`TokenKind::OrderBy`] token, and either word alone is an identifier.
pub static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("SELECT", TokenKind::Select),
        ("FROM", TokenKind::From),
        ("WHERE", TokenKind::Where),
        ("LIMIT", TokenKind::Limit),
        ("PARAMETERS", TokenKind::Parameters),
        ("AND", TokenKind::And),
        ("OR", TokenKind::Or),
        ("NOT", TokenKind::Not),
        ("ASC", TokenKind::Asc),
        ("DESC", TokenKind::Desc),
        ("IN", TokenKind::In),
        ("LIKE", TokenKind::Like),
        ("CONTAINS", TokenKind::Contains),
        ("ANY", TokenKind::Any),
        ("ALL", TokenKind::All),
        ("NONE", TokenKind::None),
        ("IS", TokenKind::Is),
        ("NULL", TokenKind::Null),
        ("DURING", TokenKind::During),
        ("BETWEEN", TokenKind::Between),
        ("REGEXP_MATCH", TokenKind::RegexpMatch),
    ])
});
