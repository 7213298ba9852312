//! Data behind the embeddable review listing: per-review display data, the average
//! rating and the pagination links.

use crate::fields::{PRODUCT_FIELD, RATING_FIELD, REVIEWER_NAME_FIELD};
use crate::models::post::{PostId, ProductLink, ReviewRow};
use crate::utils::sanitize::{absint, sanitize_text_field};
use serde::{Deserialize, Serialize};

/// Reviews shown per listing page.
pub const REVIEWS_PER_PAGE: u32 = 5;

/// Query-string key selecting the listing page.
pub const PAGE_QUERY_VAR: &str = "paged";

const MID_SIZE: u32 = 2;
const END_SIZE: u32 = 1;

/// A review that passed the display checks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewCard {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub product: Option<ProductLink>,
    pub rating: u8,
    pub reviewer_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewListing {
    /// Whether the page query matched anything, before the display checks.
    pub has_posts: bool,
    pub cards: Vec<ReviewCard>,
    pub average_rating: f64,
    pub review_count: u64,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Display data for one review, or `None` if its rating is outside 1-5 or it has no
/// reviewer name. The product link is kept whenever the referenced record exists.
pub fn review_card(row: &ReviewRow, site_url: &str) -> Option<ReviewCard> {
    let meta = |key: &str| row.meta.get(key).map(String::as_str).unwrap_or_default();

    let rating = absint(meta(RATING_FIELD));
    let reviewer_name = sanitize_text_field(meta(REVIEWER_NAME_FIELD));
    if reviewer_name.is_empty() || !(1..=5).contains(&rating) {
        return None;
    }

    let product_id = absint(meta(PRODUCT_FIELD));
    let product = row
        .product
        .as_ref()
        .filter(|product| product_id > 0 && product.id as u64 == product_id)
        .map(|product| ProductLink {
            id: product.id,
            title: product.title.clone(),
            url: product.permalink(site_url),
        });

    Some(ReviewCard {
        id: row.post.id,
        title: row.post.title.clone(),
        content: row.post.content.clone(),
        product,
        rating: rating as u8,
        reviewer_name,
    })
}

/// Arithmetic mean rounded to one decimal place; 0.0 for no ratings.
pub fn calculate_average_rating(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u64 = ratings.iter().map(|r| u64::from(*r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// `rating` filled stars then empty ones, five in total.
pub fn render_star_rating(rating: i64) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn build_listing(
    rows: &[ReviewRow],
    total_posts: u64,
    current_page: u32,
    site_url: &str,
) -> ReviewListing {
    let cards: Vec<ReviewCard> = rows
        .iter()
        .filter_map(|row| review_card(row, site_url))
        .collect();
    let ratings: Vec<u8> = cards.iter().map(|card| card.rating).collect();
    let total_pages = total_posts.div_ceil(u64::from(REVIEWS_PER_PAGE));

    ReviewListing {
        has_posts: !rows.is_empty(),
        average_rating: calculate_average_rating(&ratings),
        cards,
        review_count: total_posts,
        current_page,
        total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Prev(u32),
    Page(u32),
    Current(u32),
    Dots,
    Next(u32),
}

/// Page links around `current`: the first and last page, two on each side of the
/// current one, and a single ellipsis for every gap.
pub fn pagination_links(total: u32, current: u32) -> Vec<PageLink> {
    if total < 2 {
        return Vec::new();
    }
    let current = current.clamp(1, total);
    let mut links = Vec::new();

    if current > 1 {
        links.push(PageLink::Prev(current - 1));
    }

    let mut show_dots = true;
    for n in 1..=total {
        if n == current {
            links.push(PageLink::Current(n));
            show_dots = true;
        } else if n <= END_SIZE
            || (n + MID_SIZE >= current && n <= current + MID_SIZE)
            || n > total - END_SIZE
        {
            links.push(PageLink::Page(n));
            show_dots = true;
        } else if show_dots {
            links.push(PageLink::Dots);
            show_dots = false;
        }
    }

    if current < total {
        links.push(PageLink::Next(current + 1));
    }
    links
}

pub fn page_href(page: u32) -> String {
    format!("?{PAGE_QUERY_VAR}={page}")
}
