use crate::fields::{PRODUCT_FIELD, RATING_FIELD, REVIEWER_NAME_FIELD};
use crate::models::post::{PostId, ReviewRow};
use crate::utils::sanitize::{absint, sanitize_text_field, to_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const UNRESOLVED_PRODUCT_URL: &str = "#";
pub const FALLBACK_DATE_FORMAT: &str = "%B %-d, %Y";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewResult {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub date: String,
    pub permalink: String,
    pub thumbnail: String,
    pub rating: Option<f64>,
    pub product: Option<String>,
    pub product_url: String,
    pub reviewer: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub posts: Vec<ReviewResult>,
    pub posts_per_page: u32,
    pub total_posts: u64,
    pub no_of_pages: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct FormatOptions<'a> {
    pub site_url: &'a str,
    pub date_format: &'a str,
}

pub fn calculate_page_count(total_posts: u64, posts_per_page: i64) -> u64 {
    if posts_per_page <= 0 {
        return 0;
    }
    total_posts.div_ceil(posts_per_page as u64)
}

pub fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        out.clear();
        // FALLBACK_DATE_FORMAT is a valid strftime pattern
        let _ = write!(out, "{}", date.format(FALLBACK_DATE_FORMAT));
    }
    out
}

pub fn format_review(row: &ReviewRow, options: FormatOptions<'_>) -> ReviewResult {
    let meta = |key: &str| row.meta.get(key).map(String::as_str);

    // the product only resolves when it is published
    let product = row
        .product
        .as_ref()
        .filter(|product| product.is_published())
        .filter(|product| meta(PRODUCT_FIELD).map(absint) == Some(product.id as u64));

    ReviewResult {
        id: row.post.id,
        title: row.post.title.clone(),
        content: row.post.content.clone(),
        date: format_date(&row.post.published_at, options.date_format),
        permalink: row.post.permalink(options.site_url),
        thumbnail: row.post.thumbnail_url.clone().unwrap_or_default(),
        rating: meta(RATING_FIELD).and_then(to_number),
        product: product.map(|product| product.title.clone()),
        product_url: product
            .map(|product| product.permalink(options.site_url))
            .unwrap_or_else(|| UNRESOLVED_PRODUCT_URL.to_string()),
        reviewer: meta(REVIEWER_NAME_FIELD)
            .map(sanitize_text_field)
            .unwrap_or_default(),
    }
}

pub fn build_response(
    rows: &[ReviewRow],
    total_posts: u64,
    posts_per_page: u32,
    options: FormatOptions<'_>,
) -> SearchResponse {
    SearchResponse {
        posts: rows.iter().map(|row| format_review(row, options)).collect(),
        posts_per_page,
        total_posts,
        no_of_pages: calculate_page_count(total_posts, i64::from(posts_per_page)),
    }
}
