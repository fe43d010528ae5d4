//! Recursive-descent parser for GAQL token streams.
//!
//! The grammar is LL(1): the shape of a condition value is selected by the
//! operator already parsed, never by lookahead. That is what lets `AND`
//! serve both as the condition separator and as the separator inside a
//! `BETWEEN` value.

use std::collections::BTreeMap;

use crate::ast::{Condition, DateRange, Direction, Field, Operator, Ordering, Query, Value};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Parse a GAQL query string into a [`Query`].
pub fn parse(input: &str) -> Result<Query, ParseError> {
    let tokens = Lexer::new(input).tokenize()?;
    Parser::new(tokens).parse_query()
}

static EOF_TOKEN: Token = Token {
    kind: TokenKind::Eof,
    value: String::new(),
    line: 0,
    column: 0,
};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse_query(mut self) -> Result<Query, ParseError> {
        let mut query = Query::default();

        if !self.eat(TokenKind::Select) {
            return Err(self.error("expected SELECT clause"));
        }
        query.select = self.parse_field_list()?;

        if !self.eat(TokenKind::From) {
            return Err(self.error("expected FROM clause"));
        }
        if !self.check(TokenKind::Ident) {
            return Err(self.error("expected resource name after FROM"));
        }
        query.from = self.current().value.clone();
        self.advance();

        if self.eat(TokenKind::Where) {
            query.where_clause = self.parse_conditions()?;
        }

        if self.eat(TokenKind::OrderBy) {
            query.order_by = self.parse_orderings()?;
        }

        if self.eat(TokenKind::Limit) {
            query.limit = self.parse_limit()?;
        }

        if self.eat(TokenKind::Parameters) {
            query.parameters = self.parse_parameters()?;
        }

        if !self.check(TokenKind::Eof) {
            return Err(self.error(format!("unexpected token: {}", self.current().value)));
        }

        Ok(query)
    }

    fn parse_field_list(&mut self) -> Result<Vec<Field>, ParseError> {
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_field()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(fields)
    }

    /// Dotted field name: `ident ('.' ident)*`, joined with dots.
    fn parse_field(&mut self) -> Result<Field, ParseError> {
        if !self.check(TokenKind::Ident) {
            return Err(self.error("expected field name"));
        }
        let mut name = self.current().value.clone();
        self.advance();

        while self.eat(TokenKind::Dot) {
            if !self.check(TokenKind::Ident) {
                return Err(self.error("expected field name after '.'"));
            }
            name.push('.');
            name.push_str(&self.current().value);
            self.advance();
        }

        Ok(Field { name })
    }

    fn parse_conditions(&mut self) -> Result<Vec<Condition>, ParseError> {
        let mut conditions = Vec::new();
        loop {
            conditions.push(self.parse_condition()?);
            if !self.eat(TokenKind::And) {
                break;
            }
        }
        Ok(conditions)
    }

    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let field = self.parse_field()?;
        let operator = self.parse_operator()?;

        let value = if operator.needs_value() {
            self.parse_value(operator)?
        } else {
            Value::Null
        };

        Ok(Condition {
            field: field.name,
            operator,
            value,
        })
    }

    fn parse_operator(&mut self) -> Result<Operator, ParseError> {
        let kind = self.current().kind;
        match kind {
            TokenKind::Eq => {
                self.advance();
                Ok(Operator::Eq)
            }
            TokenKind::Neq => {
                self.advance();
                Ok(Operator::Neq)
            }
            TokenKind::Gt => {
                self.advance();
                Ok(Operator::Gt)
            }
            TokenKind::Gte => {
                self.advance();
                Ok(Operator::Gte)
            }
            TokenKind::Lt => {
                self.advance();
                Ok(Operator::Lt)
            }
            TokenKind::Lte => {
                self.advance();
                Ok(Operator::Lte)
            }
            TokenKind::In => {
                self.advance();
                Ok(Operator::In)
            }
            TokenKind::Like => {
                self.advance();
                Ok(Operator::Like)
            }
            TokenKind::Not => {
                self.advance();
                if self.eat(TokenKind::In) {
                    Ok(Operator::NotIn)
                } else if self.eat(TokenKind::Like) {
                    Ok(Operator::NotLike)
                } else if self.eat(TokenKind::RegexpMatch) {
                    Ok(Operator::NotRegexpMatch)
                } else {
                    Err(self.error("expected IN, LIKE, or REGEXP_MATCH after NOT"))
                }
            }
            TokenKind::Contains => {
                self.advance();
                if self.eat(TokenKind::Any) {
                    Ok(Operator::ContainsAny)
                } else if self.eat(TokenKind::All) {
                    Ok(Operator::ContainsAll)
                } else if self.eat(TokenKind::None) {
                    Ok(Operator::ContainsNone)
                } else {
                    Err(self.error("expected ANY, ALL, or NONE after CONTAINS"))
                }
            }
            TokenKind::Is => {
                self.advance();
                if self.eat(TokenKind::Not) {
                    if !self.eat(TokenKind::Null) {
                        return Err(self.error("expected NULL after IS NOT"));
                    }
                    Ok(Operator::IsNotNull)
                } else if self.eat(TokenKind::Null) {
                    Ok(Operator::IsNull)
                } else {
                    Err(self.error("expected NULL or NOT NULL after IS"))
                }
            }
            TokenKind::During => {
                self.advance();
                Ok(Operator::During)
            }
            TokenKind::Between => {
                self.advance();
                Ok(Operator::Between)
            }
            TokenKind::RegexpMatch => {
                self.advance();
                Ok(Operator::RegexpMatch)
            }
            _ => Err(self.error(format!("expected operator, got {kind}"))),
        }
    }

    /// Parse the value for an operator that takes one. The operator decides
    /// the shape; the value tokens are never inspected ahead.
    fn parse_value(&mut self, operator: Operator) -> Result<Value, ParseError> {
        if operator == Operator::During {
            let token = self.current().clone();
            return match token.kind {
                TokenKind::DateRange => {
                    let range = DateRange::parse(&token.value)
                        .ok_or_else(|| self.error(format!("unknown date range: {}", token.value)))?;
                    self.advance();
                    Ok(Value::DateRange(range))
                }
                TokenKind::Ident => {
                    Err(self.error(format!("unknown date range: {}", token.value)))
                }
                _ => Err(self.error("expected date range keyword after DURING")),
            };
        }

        if operator == Operator::Between {
            let start = self.parse_simple_value()?;
            if !self.eat(TokenKind::And) {
                return Err(self.error("expected AND in BETWEEN clause"));
            }
            let end = self.parse_simple_value()?;
            return Ok(Value::List(vec![start, end]));
        }

        if operator.takes_list() {
            return self.parse_list();
        }

        let token = self.current().clone();
        match token.kind {
            TokenKind::String => {
                self.advance();
                Ok(Value::String(token.value))
            }
            TokenKind::Number => {
                let number: f64 = token
                    .value
                    .parse()
                    .map_err(|_| self.error(format!("invalid number: {}", token.value)))?;
                self.advance();
                Ok(Value::Number(number))
            }
            // Unquoted enum-like values such as ENABLED.
            TokenKind::Ident => {
                self.advance();
                Ok(Value::String(token.value))
            }
            kind => Err(self.error(format!("expected value, got {kind}"))),
        }
    }

    /// A simple value is a string, number, or identifier token; the raw
    /// text is captured.
    fn parse_simple_value(&mut self) -> Result<String, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::String | TokenKind::Number | TokenKind::Ident => {
                self.advance();
                Ok(token.value)
            }
            kind => Err(self.error(format!("expected value, got {kind}"))),
        }
    }

    /// Parenthesised, comma-separated, non-empty list of simple values.
    fn parse_list(&mut self) -> Result<Value, ParseError> {
        if !self.eat(TokenKind::LParen) {
            return Err(self.error("expected '(' before list"));
        }

        let mut items = Vec::new();
        loop {
            items.push(self.parse_simple_value()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        if !self.eat(TokenKind::RParen) {
            return Err(self.error("expected ')' after list"));
        }

        Ok(Value::List(items))
    }

    fn parse_orderings(&mut self) -> Result<Vec<Ordering>, ParseError> {
        let mut orderings = Vec::new();
        loop {
            let field = self.parse_field()?;
            let direction = if self.eat(TokenKind::Desc) {
                Direction::Desc
            } else {
                self.eat(TokenKind::Asc);
                Direction::Asc
            };
            orderings.push(Ordering {
                field: field.name,
                direction,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(orderings)
    }

    fn parse_limit(&mut self) -> Result<i64, ParseError> {
        if !self.check(TokenKind::Number) {
            return Err(self.error("expected number after LIMIT"));
        }
        let raw = self.current().value.clone();
        let limit: i64 = raw
            .parse()
            .map_err(|_| self.error(format!("invalid LIMIT value: {raw}")))?;
        if limit <= 0 {
            return Err(self.error("LIMIT must be a positive integer"));
        }
        self.advance();
        Ok(limit)
    }

    fn parse_parameters(&mut self) -> Result<BTreeMap<String, String>, ParseError> {
        let mut parameters = BTreeMap::new();
        loop {
            if !self.check(TokenKind::Ident) {
                return Err(self.error("expected parameter name"));
            }
            let name = self.current().value.clone();
            self.advance();

            if !self.eat(TokenKind::Eq) {
                return Err(self.error("expected '=' after parameter name"));
            }

            let value = self.parse_simple_value()?;
            parameters.insert(name, value);

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(parameters)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&EOF_TOKEN)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Build a parse error at the current (unconsumed) token.
    fn error(&self, message: impl Into<String>) -> ParseError {
        let token = self.current();
        ParseError::new(message, token.line, token.column)
    }
}
