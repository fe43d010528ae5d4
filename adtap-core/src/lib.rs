//! Parsing and validation for Google Ads Query Language (GAQL).
//!
//! GAQL is a SQL-shaped, read-only query language for the Google Ads API.
//! This crate turns query text into a typed [`Query`] AST and validates it
//! before it is forwarded to the API, with precise line/column diagnostics
//! for malformed input.
//!
//! The pipeline is three pure stages: lexer, parser, validator. Nothing is
//! cached or shared across calls, so concurrent use needs no coordination.
//!
//! # Parsing
//!
//! ```
//! use adtap_core::parse;
//!
//! let query = parse("SELECT campaign.id FROM campaign WHERE campaign.status = 'ENABLED'")?;
//! assert_eq!(query.from, "campaign");
//! assert_eq!(query.select.len(), 1);
//! # Ok::<(), adtap_core::ParseError>(())
//! ```
//!
//! # Validation
//!
//! [`validate_query`] parses and applies the default semantic rules:
//!
//! ```
//! use adtap_core::validate_query;
//!
//! let query = validate_query(
//!     "SELECT campaign.id, metrics.clicks FROM campaign \
//!      WHERE segments.date DURING LAST_7_DAYS",
//! )?;
//! assert_eq!(query.where_clause.len(), 1);
//! # Ok::<(), adtap_core::GaqlError>(())
//! ```
//!
//! For control over policy, run the [`Validator`] directly:
//!
//! ```
//! use adtap_core::{parse, Validator};
//!
//! let query = parse("SELECT campaign.id FROM campaign")?;
//! let validator = Validator {
//!     allow_unknown_resources: false, // strict mode
//!     ..Validator::default()
//! };
//! assert!(validator.validate(&query).is_ok());
//! # Ok::<(), adtap_core::ParseError>(())
//! ```
//!
//! The canonical text of a query is its `Display` rendering, suitable for
//! forwarding to the API; `parse` accepts it back unchanged.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod validator;

pub use ast::{Condition, DateRange, Direction, Field, Operator, Ordering, Query, Value};
pub use error::{GaqlError, GaqlResult, ParseError, ValidationError};
pub use parser::parse;
pub use validator::{Validator, validate_query};

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::error::*;
    pub use crate::lexer::Lexer;
    pub use crate::parser::parse;
    pub use crate::token::{Token, TokenKind};
    pub use crate::validator::{KNOWN_RESOURCES, SINGLE_DAY_RESOURCES, Validator, validate_query};
}
