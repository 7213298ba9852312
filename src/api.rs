use crate::auth::{Actor, Capability};
use crate::components::reviews_list::render_listing_html;
use crate::error::ApiError;
use crate::fields::{prepare_meta_update, read_meta};
use crate::models::post::{
    NewPost, Post, PostId, PostStatus, Taxonomy, TermId, PRODUCT_POST_TYPE, REVIEW_POST_TYPE,
};
use crate::models::settings::UpdateMode;
use crate::reviews::{build_listing, PAGE_QUERY_VAR, REVIEWS_PER_PAGE};
use crate::search::query::Order;
use crate::search::{build_response, build_search_query, ContentQuery, SearchParams};
use crate::server_fns::ProductOption;
use crate::state::AppState;
use crate::utils::sanitize::{absint, sanitize_text_field};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use leptos::logging::{log, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Body of the review and product creation routes.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: Vec<TermId>,
    #[serde(default)]
    pub tags: Vec<TermId>,
    /// Review fields, run through the field table.
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl CreatePostRequest {
    fn into_parts(self, post_type: &str) -> (NewPost, Vec<TermId>, Map<String, Value>) {
        let terms = self.categories.into_iter().chain(self.tags).collect();
        let post = NewPost {
            post_type: post_type.to_string(),
            title: sanitize_text_field(&self.title),
            content: self.content,
            status: self.status,
            slug: self.slug,
            thumbnail_url: self.thumbnail_url,
            published_at: self.published_at,
        };
        (post, terms, self.meta)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateTermRequest {
    pub taxonomy: Taxonomy,
    pub name: String,
    #[serde(default)]
    pub parent: Option<TermId>,
}

#[derive(Serialize, Debug)]
struct PostResponse {
    #[serde(flatten)]
    post: Post,
    permalink: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Map<String, Value>>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::InvalidBody(err.to_string()).into()),
    )
    .service(
        web::scope("/prm/v1")
            .route("/reviews", web::get().to(search_reviews))
            .route("/reviews", web::post().to(create_review))
            .route("/reviews/{id}", web::delete().to(delete_review))
            .route("/reviews/{id}/meta", web::get().to(get_review_meta))
            .route("/reviews/{id}/meta", web::patch().to(update_review_meta))
            .route("/products", web::get().to(list_products))
            .route("/products", web::post().to(create_product))
            .route("/terms", web::post().to(create_term)),
    )
    .service(
        web::scope("/product-review-manager/v1")
            .route("/settings", web::get().to(get_settings))
            .route("/settings", web::put().to(replace_settings))
            .route("/settings", web::patch().to(merge_settings)),
    )
    .route("/product-reviews", web::get().to(render_reviews));
}

pub fn require(actor: &Actor, capability: Capability) -> Result<(), ApiError> {
    if actor.can(capability) {
        Ok(())
    } else {
        Err(ApiError::Forbidden {
            authenticated: actor.is_authenticated(),
        })
    }
}

/// The review with `id`, or 404 when there is none.
pub async fn find_review(state: &AppState, id: PostId) -> Result<Post, ApiError> {
    state
        .db
        .get_post(id)
        .await?
        .filter(|post| post.post_type == REVIEW_POST_TYPE)
        .ok_or(ApiError::PostNotFound(id))
}

pub async fn search_reviews(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    log!("[API] Review search request: {:?}", query);
    let params = SearchParams::from_query(&query).map_err(|err| {
        warn!("[API] Rejected search parameters: {}", err);
        err
    })?;

    let page = state.db.search_reviews(&build_search_query(&params)).await?;
    let response = build_response(
        &page.items,
        page.total,
        params.per_page,
        state.config.format_options(),
    );
    log!(
        "[API] Returning {} of {} review(s)",
        response.posts.len(),
        response.total_posts
    );
    Ok(HttpResponse::Ok().json(response))
}

pub async fn create_review(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    require(&actor, Capability::EditPosts)?;
    let (new_post, terms, meta) = body.into_inner().into_parts(REVIEW_POST_TYPE);
    let writes = prepare_meta_update(&actor, &meta)?;

    let post = state.db.create_post(&new_post, &terms, &writes).await?;
    let stored = state.db.get_meta(post.id).await?;
    log!("[API] Review created: {}", post.id);
    Ok(HttpResponse::Created().json(PostResponse {
        permalink: post.permalink(&state.config.site_url),
        meta: Some(read_meta(&stored)),
        post,
    }))
}

pub async fn create_product(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, ApiError> {
    require(&actor, Capability::EditPosts)?;
    let (new_post, terms, _) = body.into_inner().into_parts(PRODUCT_POST_TYPE);

    let post = state.db.create_post(&new_post, &terms, &[]).await?;
    log!("[API] Product created: {}", post.id);
    Ok(HttpResponse::Created().json(PostResponse {
        permalink: post.permalink(&state.config.site_url),
        meta: None,
        post,
    }))
}

pub async fn delete_review(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<PostId>,
) -> Result<HttpResponse, ApiError> {
    require(&actor, Capability::EditPosts)?;
    let id = path.into_inner();
    find_review(&state, id).await?;

    state.db.delete_post(id).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": true, "id": id })))
}

/// Meta of a published review is public; any other status needs `edit_posts`.
pub async fn get_review_meta(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<PostId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let review = find_review(&state, id).await?;
    if review.status != PostStatus::Publish {
        require(&actor, Capability::EditPosts)?;
    }
    let meta = state.db.get_meta(id).await?;
    Ok(HttpResponse::Ok().json(read_meta(&meta)))
}

pub async fn update_review_meta(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<PostId>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    require(&actor, Capability::EditPosts)?;
    let id = path.into_inner();
    let fields = body
        .as_object()
        .ok_or_else(|| ApiError::InvalidBody("meta must be an object".to_string()))?;
    find_review(&state, id).await?;

    let writes = prepare_meta_update(&actor, fields)?;
    state.db.update_meta(id, &writes).await?;
    let meta = state.db.get_meta(id).await?;
    Ok(HttpResponse::Ok().json(read_meta(&meta)))
}

pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let query = ContentQuery::published(PRODUCT_POST_TYPE).order(Order::TitleAsc);
    let products: Vec<ProductOption> = state
        .db
        .query_posts(&query)
        .await?
        .items
        .into_iter()
        .map(|post| ProductOption {
            id: post.id,
            title: post.title,
        })
        .collect();
    Ok(HttpResponse::Ok().json(products))
}

pub async fn create_term(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<CreateTermRequest>,
) -> Result<HttpResponse, ApiError> {
    require(&actor, Capability::EditPosts)?;
    let request = body.into_inner();
    let name = sanitize_text_field(&request.name);
    if name.is_empty() {
        return Err(ApiError::InvalidBody("term name must not be empty".to_string()));
    }
    let term = state
        .db
        .insert_term(request.taxonomy, &name, request.parent)
        .await?;
    Ok(HttpResponse::Created().json(term))
}

pub async fn get_settings(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<HttpResponse, ApiError> {
    require(&actor, Capability::ManageOptions)?;
    let settings = state.settings.load().await?;
    Ok(HttpResponse::Ok().json(settings))
}

pub async fn replace_settings(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    save_settings(state, actor, body, UpdateMode::Replace).await
}

pub async fn merge_settings(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    save_settings(state, actor, body, UpdateMode::Merge).await
}

async fn save_settings(
    state: web::Data<AppState>,
    actor: Actor,
    body: web::Json<Value>,
    mode: UpdateMode,
) -> Result<HttpResponse, ApiError> {
    require(&actor, Capability::ManageOptions)?;
    let settings = state.settings.update(&body, mode).await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// The embeddable listing as an HTML fragment.
pub async fn render_reviews(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let page = query
        .get(PAGE_QUERY_VAR)
        .map(|raw| absint(raw))
        .and_then(|page| u32::try_from(page).ok())
        .unwrap_or(1)
        .max(1);

    let content_query =
        ContentQuery::published(REVIEW_POST_TYPE).paginate(page, REVIEWS_PER_PAGE);
    let result = state.db.search_reviews(&content_query).await?;
    let listing = build_listing(&result.items, result.total, page, &state.config.site_url);
    log!(
        "[API] Rendering listing page {} with {} card(s)",
        page,
        listing.cards.len()
    );

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_listing_html(listing)))
}
