//! Listing endpoint parameters: sanitized first, then validated, as a unit.

use crate::search::query::Tenths;
use crate::utils::sanitize::{absint, is_numeric, sanitize_text_field, to_number};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_POSTS_PER_PAGE: u32 = 9;
pub const DEFAULT_PAGE: u32 = 1;
pub const MAX_SEARCH_LENGTH: usize = 255;
pub const MIN_RATING_FILTER: f64 = 0.0;
pub const MAX_RATING_FILTER: f64 = 5.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid parameter(s): {param} ({reason})")]
pub struct ParamError {
    pub param: &'static str,
    pub reason: String,
}

impl ParamError {
    fn new(param: &'static str, reason: impl Into<String>) -> Self {
        ParamError {
            param,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingFilter {
    Exact(Tenths),
    Range { min: Tenths, max: Tenths },
}

impl fmt::Display for RatingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingFilter::Exact(value) => write!(f, "{value}"),
            RatingFilter::Range { min, max } => write!(f, "{min}-{max}"),
        }
    }
}

/// Validated listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub search: Option<String>,
    pub categories: Vec<i64>,
    pub tags: Vec<i64>,
    pub page: u32,
    pub per_page: u32,
    pub rating: Option<RatingFilter>,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            search: None,
            categories: Vec::new(),
            tags: Vec::new(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_POSTS_PER_PAGE,
            rating: None,
        }
    }
}

impl SearchParams {
    /// Processes the raw query string. The first invalid parameter rejects the request.
    pub fn from_query(raw: &HashMap<String, String>) -> Result<Self, ParamError> {
        let mut params = SearchParams::default();

        if let Some(q) = raw.get("q") {
            let q = sanitize_text_field(q);
            if !validate_search(&q) {
                return Err(ParamError::new(
                    "q",
                    format!("must be at most {MAX_SEARCH_LENGTH} characters"),
                ));
            }
            params.search = Some(q).filter(|q| !q.is_empty());
        }
        if let Some(categories) = raw.get("categories") {
            params.categories = parse_ids("categories", categories)?;
        }
        if let Some(tags) = raw.get("tags") {
            params.tags = parse_ids("tags", tags)?;
        }
        if let Some(page) = raw.get("page_no") {
            params.page = parse_positive_integer("page_no", page)?;
        }
        if let Some(per_page) = raw.get("posts_per_page") {
            params.per_page = parse_positive_integer("posts_per_page", per_page)?;
        }
        if let Some(rating) = raw.get("rating") {
            params.rating = Some(parse_rating(rating)?);
        }

        Ok(params)
    }
}

pub fn validate_search(value: &str) -> bool {
    value.chars().count() <= MAX_SEARCH_LENGTH
}

/// `absint` on every comma-separated token, zeros dropped, re-joined.
pub fn sanitize_comma_separated_ids(value: &str) -> String {
    value
        .split(',')
        .map(absint)
        .filter(|id| *id > 0)
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn validate_comma_separated_ids(value: &str) -> bool {
    value.split(',').all(is_numeric)
}

fn parse_ids(param: &'static str, raw: &str) -> Result<Vec<i64>, ParamError> {
    let sanitized = sanitize_comma_separated_ids(raw);
    if !validate_comma_separated_ids(&sanitized) {
        return Err(ParamError::new(
            param,
            "must be a comma-separated list of term IDs",
        ));
    }
    Ok(sanitized
        .split(',')
        .map(|id| absint(id) as i64)
        .collect())
}

fn parse_positive_integer(param: &'static str, raw: &str) -> Result<u32, ParamError> {
    let invalid = || ParamError::new(param, "must be a positive integer");
    let value = to_number(raw).ok_or_else(invalid)?;
    if value <= 0.0 {
        return Err(invalid());
    }
    match u32::try_from(absint(raw)) {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(value) => Ok(value),
    }
}

pub fn validate_rating(value: &str) -> bool {
    if let Some(rating) = to_number(value) {
        return (MIN_RATING_FILTER..=MAX_RATING_FILTER).contains(&rating);
    }
    match range_bounds(value) {
        Some((min, max)) => min >= MIN_RATING_FILTER && max <= MAX_RATING_FILTER && min <= max,
        None => false,
    }
}

/// Normalizes a rating to `%.1f` or `%.1f-%.1f`. Input without a numeric shape yields
/// an empty string.
pub fn sanitize_rating(value: &str) -> String {
    if let Some(rating) = to_number(value) {
        return format!("{rating:.1}");
    }
    match range_bounds(value) {
        Some((min, max)) => format!("{min:.1}-{max:.1}"),
        None => String::new(),
    }
}

fn range_bounds(value: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = value.split('-').collect();
    match parts.as_slice() {
        [min, max] => Some((to_number(min)?, to_number(max)?)),
        _ => None,
    }
}

pub fn parse_rating(raw: &str) -> Result<RatingFilter, ParamError> {
    if !validate_rating(raw) {
        return Err(ParamError::new(
            "rating",
            "must be a value between 0 and 5 or a range like 3.0-5.0",
        ));
    }
    if let Some(rating) = to_number(raw) {
        return Ok(RatingFilter::Exact(Tenths::from_f64(rating)));
    }
    let (min, max) = range_bounds(raw).ok_or_else(|| ParamError::new("rating", "malformed range"))?;
    Ok(RatingFilter::Range {
        min: Tenths::from_f64(min),
        max: Tenths::from_f64(max),
    })
}
