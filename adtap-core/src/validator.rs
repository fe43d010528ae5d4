//! Semantic validation for parsed GAQL queries.
//!
//! The grammar alone cannot express the Ads API's domain rules: metric
//! fields need a date context, `click_view` only accepts single-day date
//! ranges, `BETWEEN` endpoints must look like dates. Rules run in a fixed
//! order and the first violation is returned. Purely structural, no I/O.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use strsim::levenshtein;

use crate::ast::{DateRange, Operator, Query, Value};
use crate::error::{GaqlError, ValidationError};
use crate::parser::parse;

/// Common Google Ads API resources. Not exhaustive; the API ships more.
pub static KNOWN_RESOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "campaign",
        "ad_group",
        "ad_group_ad",
        "ad_group_criterion",
        "asset",
        "campaign_asset",
        "campaign_budget",
        "campaign_criterion",
        "customer",
        "customer_client",
        "change_event",
        "change_status",
        "click_view",
        "conversion_action",
        "geo_target_constant",
        "keyword_view",
        "label",
        "location_view",
        "media_file",
        "mobile_app_category_constant",
        "mobile_device_constant",
        "performance_max_placement_view",
        "product_bidding_category_constant",
        "search_term_view",
        "shopping_performance_view",
        "topic_constant",
        "user_list",
    ])
});

/// Resources whose rows only make sense for single-calendar-day queries.
pub static SINGLE_DAY_RESOURCES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["click_view"]));

/// YYYY-MM-DD.
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Semantic validator with configurable policy.
#[derive(Debug, Clone)]
pub struct Validator {
    /// Permit resources not in [`KNOWN_RESOURCES`]. On by default: the API
    /// ships new resources faster than a hard-coded table can track.
    pub allow_unknown_resources: bool,

    /// Require `segments.date` in SELECT or WHERE whenever a `metrics.*`
    /// field is selected.
    pub require_metric_date_context: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            allow_unknown_resources: true,
            require_metric_date_context: true,
        }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a parsed query. Rules run in a fixed order; the first
    /// violation is returned.
    pub fn validate(&self, query: &Query) -> Result<(), ValidationError> {
        self.validate_select(query)?;
        self.validate_field_names(query)?;
        self.validate_from(query)?;
        self.validate_where(query)?;
        self.validate_limit(query)?;
        self.validate_single_day_resource(query)?;
        self.validate_metric_date_context(query)?;
        Ok(())
    }

    fn validate_select(&self, query: &Query) -> Result<(), ValidationError> {
        if query.select.is_empty() {
            return Err(ValidationError::new("SELECT must contain at least one field"));
        }
        Ok(())
    }

    // The parser never produces empty names; this guards ASTs built
    // programmatically.
    fn validate_field_names(&self, query: &Query) -> Result<(), ValidationError> {
        for field in &query.select {
            if field.name.is_empty() {
                return Err(ValidationError::new("field name cannot be empty"));
            }
        }
        for cond in &query.where_clause {
            if cond.field.is_empty() {
                return Err(ValidationError::new("field name cannot be empty"));
            }
        }
        Ok(())
    }

    fn validate_from(&self, query: &Query) -> Result<(), ValidationError> {
        if query.from.is_empty() {
            return Err(ValidationError::new("FROM clause is required"));
        }

        if !self.allow_unknown_resources && !KNOWN_RESOURCES.contains(query.from.as_str()) {
            let message = match did_you_mean(&query.from, KNOWN_RESOURCES.iter().copied()) {
                Some(suggestion) => {
                    format!("unknown resource: {} (did you mean '{}'?)", query.from, suggestion)
                }
                None => format!("unknown resource: {}", query.from),
            };
            return Err(ValidationError::on_field(message, "FROM"));
        }

        Ok(())
    }

    fn validate_where(&self, query: &Query) -> Result<(), ValidationError> {
        for cond in &query.where_clause {
            match cond.operator {
                Operator::During => {
                    if !matches!(cond.value, Value::DateRange(_)) {
                        return Err(ValidationError::on_field(
                            "DURING requires a date range keyword",
                            cond.field.clone(),
                        ));
                    }
                }
                Operator::Between => {
                    let items = match &cond.value {
                        Value::List(items) if items.len() == 2 => items,
                        _ => {
                            return Err(ValidationError::on_field(
                                "BETWEEN requires two values",
                                cond.field.clone(),
                            ));
                        }
                    };
                    for item in items {
                        if !DATE_PATTERN.is_match(item) && DateRange::parse(item).is_none() {
                            return Err(ValidationError::on_field(
                                format!("invalid date format (expected YYYY-MM-DD): {item}"),
                                cond.field.clone(),
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    // The parser already rejects LIMIT <= 0; this guards programmatic ASTs.
    fn validate_limit(&self, query: &Query) -> Result<(), ValidationError> {
        if query.limit < 0 {
            return Err(ValidationError::new("LIMIT must be non-negative"));
        }
        Ok(())
    }

    fn validate_single_day_resource(&self, query: &Query) -> Result<(), ValidationError> {
        if !SINGLE_DAY_RESOURCES.contains(query.from.as_str()) {
            return Ok(());
        }

        let mut saw_date_condition = false;
        for cond in &query.where_clause {
            if cond.field != "segments.date" {
                continue;
            }
            saw_date_condition = true;
            match cond.operator {
                Operator::During => {
                    if matches!(
                        cond.value,
                        Value::DateRange(DateRange::Today | DateRange::Yesterday)
                    ) {
                        return Ok(());
                    }
                }
                // A single explicit day.
                Operator::Eq => return Ok(()),
                Operator::Between => {
                    if let Value::List(items) = &cond.value {
                        if items.len() == 2 && items[0] == items[1] {
                            return Ok(());
                        }
                    }
                }
                _ => {}
            }
        }

        if saw_date_condition {
            Err(ValidationError::on_field(
                format!("{} requires single-day date range", query.from),
                "segments.date",
            ))
        } else {
            Err(ValidationError::on_field(
                format!(
                    "{} requires segments.date in WHERE clause with single-day range",
                    query.from
                ),
                "FROM",
            ))
        }
    }

    fn validate_metric_date_context(&self, query: &Query) -> Result<(), ValidationError> {
        if !self.require_metric_date_context {
            return Ok(());
        }

        let has_metrics = query.select.iter().any(|f| f.name.starts_with("metrics."));
        if !has_metrics {
            return Ok(());
        }

        let has_date_context = query.select.iter().any(|f| f.name == "segments.date")
            || query.where_clause.iter().any(|c| c.field == "segments.date");

        if !has_date_context {
            return Err(ValidationError::new(
                "metrics require date context (segments.date in SELECT or WHERE)",
            ));
        }

        Ok(())
    }
}

/// Best fuzzy match within a length-scaled edit distance, for
/// "did you mean" suggestions.
fn did_you_mean<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let threshold = match input.len() {
        0..=2 => 0,
        3..=5 => 2,
        _ => 3,
    };

    let mut best: Option<(usize, &str)> = None;
    for candidate in candidates {
        let dist = levenshtein(input, candidate);
        if dist <= threshold && best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, candidate));
        }
    }
    best.map(|(_, candidate)| candidate.to_string())
}

/// Parse and validate a GAQL query string with the default policy.
pub fn validate_query(input: &str) -> Result<Query, GaqlError> {
    let query = parse(input)?;
    Validator::new().validate(&query)?;
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Direction, Field};

    #[test]
    fn test_valid_simple_query() {
        assert!(validate_query("SELECT campaign.id, campaign.name FROM campaign").is_ok());
    }

    #[test]
    fn test_metrics_with_date_in_where() {
        assert!(validate_query(
            "SELECT campaign.id, metrics.clicks FROM campaign \
             WHERE segments.date DURING LAST_7_DAYS"
        )
        .is_ok());
    }

    #[test]
    fn test_metrics_with_date_in_select() {
        assert!(validate_query(
            "SELECT campaign.id, segments.date, metrics.clicks FROM campaign"
        )
        .is_ok());
    }

    #[test]
    fn test_metrics_without_date_context() {
        let err = validate_query("SELECT campaign.id, metrics.clicks FROM campaign").unwrap_err();
        assert!(err
            .to_string()
            .contains("metrics require date context (segments.date in SELECT or WHERE)"));
    }

    #[test]
    fn test_click_view_multi_day_rejected() {
        let err = validate_query(
            "SELECT click_view.gclid FROM click_view WHERE segments.date DURING LAST_7_DAYS",
        )
        .unwrap_err();
        assert!(err.to_string().contains("click_view requires single-day date range"));
    }

    #[test]
    fn test_click_view_today_and_yesterday() {
        assert!(validate_query(
            "SELECT click_view.gclid FROM click_view WHERE segments.date DURING TODAY"
        )
        .is_ok());
        assert!(validate_query(
            "SELECT click_view.gclid FROM click_view WHERE segments.date DURING YESTERDAY"
        )
        .is_ok());
    }

    #[test]
    fn test_click_view_date_equality() {
        assert!(validate_query(
            "SELECT click_view.gclid FROM click_view WHERE segments.date = '2026-02-27'"
        )
        .is_ok());
    }

    #[test]
    fn test_click_view_equal_between_endpoints() {
        assert!(validate_query(
            "SELECT click_view.gclid FROM click_view \
             WHERE segments.date BETWEEN '2026-02-27' AND '2026-02-27'"
        )
        .is_ok());
    }

    #[test]
    fn test_click_view_unequal_between_endpoints() {
        let err = validate_query(
            "SELECT click_view.gclid FROM click_view \
             WHERE segments.date BETWEEN '2026-02-01' AND '2026-02-27'",
        )
        .unwrap_err();
        assert!(err.to_string().contains("click_view requires single-day date range"));
    }

    #[test]
    fn test_click_view_other_operator_on_date() {
        let err = validate_query(
            "SELECT click_view.gclid FROM click_view WHERE segments.date >= '2026-02-27'",
        )
        .unwrap_err();
        assert!(err.to_string().contains("click_view requires single-day date range"));
    }

    #[test]
    fn test_click_view_missing_date_condition() {
        let err = validate_query("SELECT click_view.gclid FROM click_view").unwrap_err();
        match err {
            GaqlError::Validation(v) => {
                assert_eq!(v.field.as_deref(), Some("FROM"));
                assert!(v.message.contains("requires segments.date in WHERE clause"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_between() {
        assert!(validate_query(
            "SELECT campaign.id FROM campaign \
             WHERE segments.date BETWEEN '2026-01-01' AND '2026-01-31'"
        )
        .is_ok());
    }

    #[test]
    fn test_between_keyword_endpoints() {
        assert!(validate_query(
            "SELECT campaign.id FROM campaign \
             WHERE segments.date BETWEEN 'TODAY' AND 'TODAY'"
        )
        .is_ok());
    }

    #[test]
    fn test_between_invalid_date_format() {
        let err = validate_query(
            "SELECT campaign.id FROM campaign \
             WHERE segments.date BETWEEN '2026/01/01' AND '2026-01-31'",
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid date format"));
    }

    #[test]
    fn test_during_requires_date_range_value() {
        // Constructed directly: the parser cannot produce this shape.
        let query = Query::new("campaign")
            .field("campaign.id")
            .filter("segments.date", Operator::During, "LAST_7_DAYS");
        let err = Validator::new().validate(&query).unwrap_err();
        assert_eq!(err.message, "DURING requires a date range keyword");
        assert_eq!(err.field.as_deref(), Some("segments.date"));
    }

    #[test]
    fn test_empty_select_rejected() {
        let query = Query::new("campaign");
        let err = Validator::new().validate(&query).unwrap_err();
        assert_eq!(err.message, "SELECT must contain at least one field");
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let mut query = Query::new("campaign").field("campaign.id");
        query.select.push(Field::new(""));
        let err = Validator::new().validate(&query).unwrap_err();
        assert_eq!(err.message, "field name cannot be empty");
    }

    #[test]
    fn test_missing_from_rejected() {
        let query = Query::new("").field("campaign.id");
        let err = Validator::new().validate(&query).unwrap_err();
        assert_eq!(err.message, "FROM clause is required");
    }

    #[test]
    fn test_negative_limit_rejected() {
        let query = Query::new("campaign").field("campaign.id").limit(-5);
        let err = Validator::new().validate(&query).unwrap_err();
        assert_eq!(err.message, "LIMIT must be non-negative");
    }

    #[test]
    fn test_unknown_resource_permissive_by_default() {
        let query = Query::new("new_resource_v99").field("new_resource_v99.id");
        assert!(Validator::new().validate(&query).is_ok());
    }

    #[test]
    fn test_unknown_resource_strict() {
        let query = Query::new("new_resource_v99").field("new_resource_v99.id");
        let validator = Validator {
            allow_unknown_resources: false,
            ..Validator::default()
        };
        let err = validator.validate(&query).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("FROM"));
        assert!(err.message.starts_with("unknown resource: new_resource_v99"));
    }

    #[test]
    fn test_unknown_resource_suggestion() {
        let query = Query::new("campain").field("campain.id");
        let validator = Validator {
            allow_unknown_resources: false,
            ..Validator::default()
        };
        let err = validator.validate(&query).unwrap_err();
        assert_eq!(
            err.message,
            "unknown resource: campain (did you mean 'campaign'?)"
        );
    }

    #[test]
    fn test_known_resources_strict_mode() {
        let validator = Validator {
            allow_unknown_resources: false,
            require_metric_date_context: false,
        };
        for resource in ["campaign", "ad_group", "customer"] {
            let query = Query::new(resource).field(format!("{resource}.id"));
            assert!(validator.validate(&query).is_ok(), "{resource} should be known");
        }
    }

    #[test]
    fn test_metric_context_flag_off() {
        let validator = Validator {
            require_metric_date_context: false,
            ..Validator::default()
        };
        let query = Query::new("campaign")
            .field("campaign.id")
            .field("metrics.clicks");
        assert!(validator.validate(&query).is_ok());
    }

    #[test]
    fn test_validate_is_idempotent() {
        let query = parse(
            "SELECT campaign.id, metrics.clicks FROM campaign \
             WHERE segments.date DURING LAST_7_DAYS \
             ORDER BY metrics.clicks DESC LIMIT 10",
        )
        .unwrap();
        let validator = Validator::new();
        let first = validator.validate(&query);
        let second = validator.validate(&query);
        assert_eq!(first, second);
        assert!(first.is_ok());

        let bad = Query::new("campaign").field("metrics.clicks");
        assert_eq!(validator.validate(&bad), validator.validate(&bad));
    }

    #[test]
    fn test_did_you_mean_thresholds() {
        let candidates = ["campaign", "ad_group", "customer"];
        assert_eq!(
            did_you_mean("campain", candidates),
            Some("campaign".to_string())
        );
        assert_eq!(did_you_mean("zzzzzzz", candidates), None);
        // Short inputs only match exactly.
        assert_eq!(did_you_mean("ad", candidates), None);
    }

    #[test]
    fn test_order_validation_ignores_ordering_direction() {
        let query = Query::new("campaign")
            .field("campaign.id")
            .order_by("metrics.clicks", Direction::Desc);
        assert!(Validator::new().validate(&query).is_ok());
    }
}
