#![allow(dead_code)]

use actix_web::web;
use chrono::{Duration, TimeZone, Utc};
use product_review_manager::config::Config;
use product_review_manager::db::Database;
use product_review_manager::fields::{MetaWrite, PRODUCT_FIELD, RATING_FIELD, REVIEWER_NAME_FIELD};
use product_review_manager::models::post::{
    NewPost, Post, PostStatus, TermId, PRODUCT_POST_TYPE, REVIEW_POST_TYPE,
};
use product_review_manager::state::AppState;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const EDITOR_TOKEN: &str = "editor-token";
pub const SITE_URL: &str = "https://shop.test";

// Helper function to setup test environment
pub async fn setup_state() -> web::Data<AppState> {
    let db = Database::new(":memory:").unwrap();
    db.create_schema().await.unwrap();
    let config = Config {
        site_url: SITE_URL.to_string(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        editor_token: Some(EDITOR_TOKEN.to_string()),
        ..Config::default()
    };
    web::Data::new(AppState::new(db, config))
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn post(post_type: &str, title: &str, status: PostStatus, day: i64) -> NewPost {
    NewPost {
        post_type: post_type.to_string(),
        title: title.to_string(),
        content: format!("<p>{title} content</p>"),
        status,
        published_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap() + Duration::days(day)),
        ..NewPost::default()
    }
}

pub async fn add_product(state: &AppState, title: &str, status: PostStatus) -> Post {
    state
        .db
        .create_post(&post(PRODUCT_POST_TYPE, title, status, 0), &[], &[])
        .await
        .unwrap()
}

/// Published review `day` days into the fixture month, newer days listed first.
pub async fn add_review(
    state: &AppState,
    title: &str,
    day: i64,
    rating: Option<&str>,
    reviewer: Option<&str>,
    product: Option<&Post>,
    terms: &[TermId],
) -> Post {
    let mut meta = Vec::new();
    if let Some(rating) = rating {
        meta.push((RATING_FIELD, MetaWrite::Set(rating.to_string())));
    }
    if let Some(reviewer) = reviewer {
        meta.push((REVIEWER_NAME_FIELD, MetaWrite::Set(reviewer.to_string())));
    }
    if let Some(product) = product {
        meta.push((PRODUCT_FIELD, MetaWrite::Set(product.id.to_string())));
    }
    state
        .db
        .create_post(&post(REVIEW_POST_TYPE, title, PostStatus::Publish, day), terms, &meta)
        .await
        .unwrap()
}
