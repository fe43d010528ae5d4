//! Abstract syntax tree for GAQL queries.
//!
//! The parser produces a [`Query`] and never mutates it afterwards. The
//! `Display` impls render the canonical GAQL text, which is what gets
//! forwarded to the API and what round-trips through [`crate::parse`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A parsed GAQL query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Selected fields, in textual order.
    pub select: Vec<Field>,
    /// The resource being queried.
    pub from: String,
    /// WHERE conditions, all joined by AND.
    #[serde(default)]
    pub where_clause: Vec<Condition>,
    #[serde(default)]
    pub order_by: Vec<Ordering>,
    /// Row cap; 0 means no limit.
    #[serde(default)]
    pub limit: i64,
    /// Query parameters. Duplicate names overwrite (last write wins).
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl Query {
    /// Create an empty query against the given resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            from: resource.into(),
            ..Self::default()
        }
    }

    /// Add a field to the SELECT list.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.select.push(Field::new(name));
        self
    }

    /// Add a WHERE condition.
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.where_clause.push(Condition {
            field: field.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Add an ORDER BY entry.
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(Ordering {
            field: field.into(),
            direction,
        });
        self
    }

    /// Cap the number of rows returned.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = n;
        self
    }

    /// Set a query parameter. Duplicate names overwrite.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

/// A dotted field reference (e.g. `campaign.id`, `metrics.clicks`), stored
/// as the joined name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A single WHERE condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "ASC"),
            Direction::Desc => write!(f, "DESC"),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Neq,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// IN list
    In,
    /// NOT IN list
    NotIn,
    /// LIKE pattern match
    Like,
    /// NOT LIKE pattern match
    NotLike,
    /// CONTAINS ANY list
    ContainsAny,
    /// CONTAINS ALL list
    ContainsAll,
    /// CONTAINS NONE list
    ContainsNone,
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
    /// DURING predefined date range
    During,
    /// BETWEEN two endpoints
    Between,
    /// REGEXP_MATCH pattern
    RegexpMatch,
    /// NOT REGEXP_MATCH pattern
    NotRegexpMatch,
}

impl Operator {
    /// The GAQL symbol or keyword for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ContainsAny => "CONTAINS ANY",
            Operator::ContainsAll => "CONTAINS ALL",
            Operator::ContainsNone => "CONTAINS NONE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::During => "DURING",
            Operator::Between => "BETWEEN",
            Operator::RegexpMatch => "REGEXP_MATCH",
            Operator::NotRegexpMatch => "NOT REGEXP_MATCH",
        }
    }

    /// Returns true if this operator carries a right-hand value.
    /// `IS NULL` and `IS NOT NULL` don't.
    pub fn needs_value(&self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Returns true if this operator takes a parenthesised list value.
    pub fn takes_list(&self) -> bool {
        matches!(
            self,
            Operator::In
                | Operator::NotIn
                | Operator::ContainsAny
                | Operator::ContainsAll
                | Operator::ContainsNone
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A condition value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Unquoted string content. Also used for bare enum-like identifiers
    /// such as `ENABLED`.
    String(String),
    /// Numeric literal.
    Number(f64),
    /// Raw elements of a list value (`IN`, `CONTAINS *`, `BETWEEN`).
    List(Vec<String>),
    /// Predefined date range, only produced for `DURING`.
    DateRange(DateRange),
    /// No payload; used for `IS NULL` / `IS NOT NULL`.
    Null,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<DateRange> for Value {
    fn from(range: DateRange) -> Self {
        Value::DateRange(range)
    }
}

/// Predefined date ranges accepted by `DURING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    Today,
    Yesterday,
    Last7Days,
    Last14Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    ThisWeekSunToday,
    ThisWeekMonToday,
    LastWeekSunSat,
    LastWeekMonSun,
    LastBusinessWeek,
    /// Marker for BETWEEN-style explicit ranges; never produced by the
    /// parser as a DURING value.
    Custom,
}

/// Date-range keyword table, keyed by upper-cased text. `CUSTOM` is not a
/// keyword and is absent.
pub static DATE_RANGES: Lazy<HashMap<&'static str, DateRange>> = Lazy::new(|| {
    HashMap::from([
        ("TODAY", DateRange::Today),
        ("YESTERDAY", DateRange::Yesterday),
        ("LAST_7_DAYS", DateRange::Last7Days),
        ("LAST_14_DAYS", DateRange::Last14Days),
        ("LAST_30_DAYS", DateRange::Last30Days),
        ("THIS_MONTH", DateRange::ThisMonth),
        ("LAST_MONTH", DateRange::LastMonth),
        ("THIS_WEEK_SUN_TODAY", DateRange::ThisWeekSunToday),
        ("THIS_WEEK_MON_TODAY", DateRange::ThisWeekMonToday),
        ("LAST_WEEK_SUN_SAT", DateRange::LastWeekSunSat),
        ("LAST_WEEK_MON_SUN", DateRange::LastWeekMonSun),
        ("LAST_BUSINESS_WEEK", DateRange::LastBusinessWeek),
    ])
});

impl DateRange {
    /// Look up a date-range keyword, case-insensitively.
    pub fn parse(s: &str) -> Option<DateRange> {
        DATE_RANGES.get(s.to_uppercase().as_str()).copied()
    }

    /// The GAQL keyword for this range.
    pub fn keyword(&self) -> &'static str {
        match self {
            DateRange::Today => "TODAY",
            DateRange::Yesterday => "YESTERDAY",
            DateRange::Last7Days => "LAST_7_DAYS",
            DateRange::Last14Days => "LAST_14_DAYS",
            DateRange::Last30Days => "LAST_30_DAYS",
            DateRange::ThisMonth => "THIS_MONTH",
            DateRange::LastMonth => "LAST_MONTH",
            DateRange::ThisWeekSunToday => "THIS_WEEK_SUN_TODAY",
            DateRange::ThisWeekMonToday => "THIS_WEEK_MON_TODAY",
            DateRange::LastWeekSunSat => "LAST_WEEK_SUN_SAT",
            DateRange::LastWeekMonSun => "LAST_WEEK_MON_SUN",
            DateRange::LastBusinessWeek => "LAST_BUSINESS_WEEK",
            DateRange::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// True if `s` lexes as a single numeric literal.
fn is_number_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut parts = digits.splitn(2, '.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next();
    !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.is_none_or(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Render a raw simple value: numbers print bare, everything else is
/// re-quoted as a string literal.
fn write_simple_value(f: &mut fmt::Formatter<'_>, raw: &str) -> fmt::Result {
    if is_number_literal(raw) {
        write!(f, "{raw}")
    } else {
        write!(f, "'{}'", escape_string(raw))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "'{}'", escape_string(s)),
            Value::Number(n) => write!(f, "{n}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_simple_value(f, item)?;
                }
                write!(f, ")")
            }
            Value::DateRange(range) => write!(f, "{range}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.operator)?;
        if !self.operator.needs_value() {
            return Ok(());
        }
        match (&self.operator, &self.value) {
            // BETWEEN consumes its separator AND, so the endpoints print
            // around it rather than as a parenthesised list.
            (Operator::Between, Value::List(items)) if items.len() == 2 => {
                write!(f, " ")?;
                write_simple_value(f, &items[0])?;
                write!(f, " AND ")?;
                write_simple_value(f, &items[1])
            }
            _ => write!(f, " {}", self.value),
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if self.direction == Direction::Desc {
            write!(f, " DESC")?;
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        for (i, field) in self.select.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }

        write!(f, " FROM {}", self.from)?;

        if !self.where_clause.is_empty() {
            write!(f, " WHERE ")?;
            for (i, cond) in self.where_clause.iter().enumerate() {
                if i > 0 {
                    write!(f, " AND ")?;
                }
                write!(f, "{cond}")?;
            }
        }

        if !self.order_by.is_empty() {
            write!(f, " ORDER BY ")?;
            for (i, ordering) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{ordering}")?;
            }
        }

        if self.limit > 0 {
            write!(f, " LIMIT {}", self.limit)?;
        }

        if !self.parameters.is_empty() {
            write!(f, " PARAMETERS ")?;
            for (i, (name, value)) in self.parameters.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{name} = ")?;
                write_simple_value(f, value)?;
            }
        }

        Ok(())
    }
}
