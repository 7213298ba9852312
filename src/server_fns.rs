//! Server functions behind the admin pages. They share the capability checks and the
//! field table with the REST routes.

use crate::models::post::PostId;
use crate::models::settings::Settings;
use leptos::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProductOption {
    pub id: PostId,
    pub title: String,
}

/// Current values of a review's fields and the products it can point at.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewDetails {
    pub id: PostId,
    pub title: String,
    /// 0 when no product is selected.
    pub product_id: u64,
    /// 0 when unrated.
    pub rating: u64,
    pub reviewer_name: String,
    pub products: Vec<ProductOption>,
}

#[cfg(feature = "ssr")]
fn server_error(err: crate::error::ApiError) -> ServerFnError {
    logging::warn!("[SERVER] {}", err);
    ServerFnError::ServerError(err.to_string())
}

#[server(LoadSettings, "/api")]
pub async fn load_settings() -> Result<Settings, ServerFnError> {
    use crate::api::require;
    use crate::auth::{Actor, Capability};
    use crate::state::AppState;
    use actix_web::web;
    use leptos_actix::extract;

    let state: web::Data<AppState> = extract().await?;
    let actor: Actor = extract().await?;
    require(&actor, Capability::ManageOptions).map_err(server_error)?;
    state.settings.load().await.map_err(server_error)
}

#[server(SaveSettings, "/api")]
pub async fn save_settings(settings: Settings) -> Result<Settings, ServerFnError> {
    use crate::api::require;
    use crate::auth::{Actor, Capability};
    use crate::models::settings::UpdateMode;
    use crate::state::AppState;
    use actix_web::web;
    use leptos_actix::extract;

    let state: web::Data<AppState> = extract().await?;
    let actor: Actor = extract().await?;
    require(&actor, Capability::ManageOptions).map_err(server_error)?;

    let body = serde_json::to_value(&settings)?;
    state
        .settings
        .update(&body, UpdateMode::Replace)
        .await
        .map_err(server_error)
}

#[server(LoadReviewDetails, "/api")]
pub async fn load_review_details(id: PostId) -> Result<ReviewDetails, ServerFnError> {
    use crate::api::{find_review, require};
    use crate::auth::{Actor, Capability};
    use crate::fields::{PRODUCT_FIELD, RATING_FIELD, REVIEWER_NAME_FIELD};
    use crate::models::post::PRODUCT_POST_TYPE;
    use crate::search::query::{ContentQuery, Order};
    use crate::state::AppState;
    use crate::utils::sanitize::absint;
    use actix_web::web;
    use leptos_actix::extract;

    let state: web::Data<AppState> = extract().await?;
    let actor: Actor = extract().await?;
    require(&actor, Capability::EditPosts).map_err(server_error)?;

    let review = find_review(&state, id).await.map_err(server_error)?;
    let meta = state
        .db
        .get_meta(id)
        .await
        .map_err(|err| server_error(err.into()))?;
    let products = state
        .db
        .query_posts(&ContentQuery::published(PRODUCT_POST_TYPE).order(Order::TitleAsc))
        .await
        .map_err(|err| server_error(err.into()))?
        .items
        .into_iter()
        .map(|post| ProductOption {
            id: post.id,
            title: post.title,
        })
        .collect();

    let stored = |key: &str| meta.get(key).map(String::as_str).unwrap_or_default();
    Ok(ReviewDetails {
        id: review.id,
        title: review.title,
        product_id: absint(stored(PRODUCT_FIELD)),
        rating: absint(stored(RATING_FIELD)),
        reviewer_name: stored(REVIEWER_NAME_FIELD).to_string(),
        products,
    })
}

/// Saves the Review Details panel. A 0 product or rating clears the field.
#[server(SaveReviewDetails, "/api")]
pub async fn save_review_details(
    id: PostId,
    product_id: u64,
    rating: u64,
    reviewer_name: String,
) -> Result<(), ServerFnError> {
    use crate::api::{find_review, require};
    use crate::auth::{Actor, Capability};
    use crate::fields::{prepare_meta_update, PRODUCT_FIELD, RATING_FIELD, REVIEWER_NAME_FIELD};
    use crate::state::AppState;
    use actix_web::web;
    use leptos_actix::extract;
    use serde_json::{Map, Value};

    let state: web::Data<AppState> = extract().await?;
    let actor: Actor = extract().await?;
    require(&actor, Capability::EditPosts).map_err(server_error)?;
    find_review(&state, id).await.map_err(server_error)?;

    let or_null = |value: u64| {
        if value == 0 {
            Value::Null
        } else {
            Value::from(value)
        }
    };
    let mut fields = Map::new();
    fields.insert(PRODUCT_FIELD.to_string(), or_null(product_id));
    fields.insert(RATING_FIELD.to_string(), or_null(rating));
    fields.insert(REVIEWER_NAME_FIELD.to_string(), Value::String(reviewer_name));

    let writes = prepare_meta_update(&actor, &fields).map_err(|err| server_error(err.into()))?;
    state
        .db
        .update_meta(id, &writes)
        .await
        .map_err(|err| server_error(err.into()))?;
    logging::log!("[SERVER] Review details saved for {}", id);
    Ok(())
}
