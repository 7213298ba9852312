use actix_web::cookie::Cookie;
use actix_web::{http::StatusCode, test, App};
use product_review_manager::api;
use serde_json::{json, Value};

mod common;
use common::{bearer, setup_state, ADMIN_TOKEN, EDITOR_TOKEN};

const SETTINGS_URI: &str = "/product-review-manager/v1/settings";

#[actix_web::test]
async fn test_settings_require_manage_options() {
    let state = setup_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::get().uri(SETTINGS_URI).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "rest_forbidden");

    let req = test::TestRequest::patch()
        .uri(SETTINGS_URI)
        .insert_header(bearer(EDITOR_TOKEN))
        .set_json(json!({"setting1": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(SETTINGS_URI)
        .insert_header(bearer("wrong"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_settings_defaults_and_cookie_auth() {
    let state = setup_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::get()
        .uri(SETTINGS_URI)
        .cookie(Cookie::new("prm_token", ADMIN_TOKEN))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"setting1": "", "setting2": ""}));
}

#[actix_web::test]
async fn test_patch_merges_and_put_replaces() {
    let state = setup_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::put()
        .uri(SETTINGS_URI)
        .insert_header(bearer(ADMIN_TOKEN))
        .set_json(json!({"setting1": "one", "setting2": "two"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"setting1": "one", "setting2": "two"}));

    let req = test::TestRequest::patch()
        .uri(SETTINGS_URI)
        .insert_header(bearer(ADMIN_TOKEN))
        .set_json(json!({"setting2": "<b>three</b>"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"setting1": "one", "setting2": "three"}));

    let req = test::TestRequest::put()
        .uri(SETTINGS_URI)
        .insert_header(bearer(ADMIN_TOKEN))
        .set_json(json!({"setting2": "four"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"setting1": "", "setting2": "four"}));

    let req = test::TestRequest::get()
        .uri(SETTINGS_URI)
        .insert_header(bearer(ADMIN_TOKEN))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"setting1": "", "setting2": "four"}));
}

#[actix_web::test]
async fn test_invalid_settings_leave_record_untouched() {
    let state = setup_state().await;
    let app = test::init_service(App::new().app_data(state.clone()).configure(api::configure)).await;

    let req = test::TestRequest::patch()
        .uri(SETTINGS_URI)
        .insert_header(bearer(ADMIN_TOKEN))
        .set_json(json!({"setting1": "kept"}))
        .to_request();
    test::call_service(&app, req).await;

    for body in [
        json!({"setting1": "lost", "setting3": "x"}),
        json!({"setting1": 42}),
        json!(["setting1"]),
    ] {
        let req = test::TestRequest::put()
            .uri(SETTINGS_URI)
            .insert_header(bearer(ADMIN_TOKEN))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        let error: Value = test::read_body_json(resp).await;
        assert_eq!(error["code"], "rest_invalid_params");
    }

    let settings = state.settings.load().await.unwrap();
    assert_eq!(settings.get("setting1"), "kept");
}
