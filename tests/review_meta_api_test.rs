use actix_web::{http::StatusCode, test, App};
use product_review_manager::api;
use product_review_manager::models::post::PostStatus;
use serde_json::{json, Value};

mod common;
use common::{add_product, add_review, bearer, post, setup_state, ADMIN_TOKEN, EDITOR_TOKEN};
use product_review_manager::fields::{MetaWrite, REVIEWER_NAME_FIELD};
use product_review_manager::models::post::REVIEW_POST_TYPE;

#[actix_web::test]
async fn test_meta_reads_are_typed() {
    let state = setup_state().await;
    let mixer = add_product(&state, "Stand Mixer", PostStatus::Publish).await;
    let review = add_review(&state, "Typed", 0, Some("4"), None, Some(&mixer), &[]).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let uri = format!("/prm/v1/reviews/{}/meta", review.id);
    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(body["prm_product_name"], json!(mixer.id));
    assert_eq!(body["prm_rating"], 4.0);
    assert!(body["prm_reviewer_name"].is_null());
}

#[actix_web::test]
async fn test_meta_updates_go_through_field_table() {
    let state = setup_state().await;
    let review = add_review(&state, "Editable", 0, Some("2"), Some("Old"), None, &[]).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;
    let uri = format!("/prm/v1/reviews/{}/meta", review.id);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(EDITOR_TOKEN))
        .set_json(json!({"prm_rating": "5", "prm_reviewer_name": "  <b>Grace</b> "}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["prm_rating"], 5.0);
    assert_eq!(body["prm_reviewer_name"], "Grace");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(EDITOR_TOKEN))
        .set_json(json!({"prm_rating": 9, "prm_reviewer_name": "Nobody"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // the rejected update wrote nothing
    let meta = state.db.get_meta(review.id).await.unwrap();
    assert_eq!(meta["prm_rating"], "5");
    assert_eq!(meta["prm_reviewer_name"], "Grace");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(EDITOR_TOKEN))
        .set_json(json!({"prm_unknown": "x"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_meta_update_permissions_and_missing_reviews() {
    let state = setup_state().await;
    let review = add_review(&state, "Locked", 0, Some("3"), Some("A"), None, &[]).await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/prm/v1/reviews/{}/meta", review.id))
        .set_json(json!({"prm_rating": 5}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.db.get_meta(review.id).await.unwrap()["prm_rating"], "3");

    let req = test::TestRequest::get().uri("/prm/v1/reviews/9999/meta").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "rest_post_invalid_id");
}

#[actix_web::test]
async fn test_unpublished_meta_needs_edit_posts() {
    let state = setup_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    for status in [PostStatus::Draft, PostStatus::Private, PostStatus::Trash] {
        let review = state
            .db
            .create_post(
                &post(REVIEW_POST_TYPE, "Hidden", status, 0),
                &[],
                &[(REVIEWER_NAME_FIELD, MetaWrite::Set("Hidden Person".to_string()))],
            )
            .await
            .unwrap();
        let uri = format!("/prm/v1/reviews/{}/meta", review.id);

        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{status:?}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "rest_forbidden");
        assert!(body.get("prm_reviewer_name").is_none());

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(EDITOR_TOKEN))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["prm_reviewer_name"], "Hidden Person");
    }
}

#[actix_web::test]
async fn test_create_and_delete_review() {
    let state = setup_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/prm/v1/products")
        .insert_header(bearer(EDITOR_TOKEN))
        .set_json(json!({"title": "Kettle", "status": "publish"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = test::read_body_json(resp).await;
    assert_eq!(product["permalink"], "https://shop.test/product/kettle/");

    let req = test::TestRequest::post()
        .uri("/prm/v1/reviews")
        .insert_header(bearer(ADMIN_TOKEN))
        .set_json(json!({
            "title": "Boils fast",
            "content": "<p>Great kettle.</p>",
            "status": "publish",
            "meta": {
                "prm_product_name": product["id"],
                "prm_rating": 4,
                "prm_reviewer_name": "Linus"
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let review: Value = test::read_body_json(resp).await;
    assert_eq!(review["slug"], "boils-fast");
    assert_eq!(review["meta"]["prm_rating"], 4.0);

    let req = test::TestRequest::get().uri("/prm/v1/products").to_request();
    let products: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(products, json!([{"id": product["id"], "title": "Kettle"}]));

    let uri = format!("/prm/v1/reviews/{}", review["id"]);
    let req = test::TestRequest::delete().uri(&uri).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(EDITOR_TOKEN))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/prm/v1/reviews").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_posts"], 0);
}

#[actix_web::test]
async fn test_malformed_json_body() {
    let state = setup_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/prm/v1/reviews")
        .insert_header(bearer(EDITOR_TOKEN))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "rest_invalid_json");
}
