use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION, RETRY_AFTER, SET_COOKIE};
use axum::http::{Method, Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers::{self, TEST_ADMIN};

// Every request outside the `live` module is answered before the pool is
// touched; the test state's pool points at a database that does not exist.

async fn send(request: Request<Body>) -> Response<Body> {
    app(test_helpers::test_app_state())
        .oneshot(request)
        .await
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let response = send(get_request("/healthz")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn categories_start_with_all() {
    let response = send(get_request("/api/categories")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json[0], "All");
    assert_eq!(json.as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn dashboard_without_session_redirects_to_login() {
    let response = send(get_request("/admin")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn nested_dashboard_path_is_also_guarded() {
    let response = send(get_request("/admin/products/new")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
}

#[tokio::test]
async fn login_page_renders_without_session() {
    let response = send(get_request("/admin/login")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Admin Login"));
    assert!(html.contains("Send Code"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let response = send(get_request("/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
}

#[tokio::test]
async fn administrator_is_not_under_admin_prefix() {
    let response = send(get_request("/administrator")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inquiry_redirects_to_whatsapp() {
    let response = send(get_request("/book")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("https://wa.me/254723153712?text="));
}

#[tokio::test]
async fn review_without_rating_is_rejected() {
    let uri = format!("/api/products/{}/reviews", uuid::Uuid::new_v4());
    let response = send(json_request(Method::POST, &uri, serde_json::json!({"rating": 0}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["level"], "error");
    assert_eq!(json["message"], "Please select a rating");
}

#[tokio::test]
async fn oversized_rating_is_a_json_notice() {
    let uri = format!("/api/products/{}/reviews", uuid::Uuid::new_v4());
    let response = send(json_request(Method::POST, &uri, serde_json::json!({"rating": 99999}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["level"], "error");
    assert_eq!(json["message"], "Rating must be between 1 and 5");
}

#[tokio::test]
async fn malformed_review_body_is_a_json_notice() {
    let uri = format!("/api/products/{}/reviews", uuid::Uuid::new_v4());
    let response = send(json_request(Method::POST, &uri, serde_json::json!({"rating": "five"}))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"level": "error", "message": "Invalid request body"}));
}

#[tokio::test]
async fn malformed_product_id_is_a_json_notice() {
    let response = send(get_request("/api/products/not-a-uuid")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"level": "error", "message": "Invalid URL"}));
}

#[tokio::test]
async fn repeated_category_on_api_is_a_json_notice() {
    let response = send(get_request("/api/products?category=a&category=b")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid query string");
}

#[tokio::test]
async fn pages_ignore_query_strings_they_do_not_read() {
    let response = send(get_request("/admin/login?category=a&category=b")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Send Code"));
}

#[tokio::test]
async fn logout_get_redirects_to_login_without_rendering() {
    let response = send(get_request("/admin/logout")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
    assert!(!body_text(response).await.contains("Admin Dashboard"));
}

#[tokio::test]
async fn product_page_with_malformed_id_is_not_found() {
    let response = send(get_request("/products/not-a-uuid")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
}

#[tokio::test]
async fn like_form_with_malformed_id_is_not_found() {
    let response = send(form_request("/products/not-a-uuid/like", "next=%2F")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_forms_without_session_redirect_to_login() {
    let id = uuid::Uuid::new_v4();
    for uri in [
        "/admin/products".to_owned(),
        format!("/admin/products/{id}"),
        format!("/admin/products/{id}/delete"),
    ] {
        let response = send(form_request(&uri, "name=Castle&price=5000&category=Slides")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/admin/login", "{uri}");
    }
}

#[tokio::test]
async fn otp_request_for_non_admin_is_unauthorized() {
    let body = serde_json::json!({"email": "stranger@example.com"});
    let response = send(json_request(Method::POST, "/api/auth/otp/request", body)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Invalid email or code");
}

#[tokio::test]
async fn otp_verify_with_malformed_code_is_unauthorized() {
    let body = serde_json::json!({"email": TEST_ADMIN, "code": "1"});
    let response = send(json_request(Method::POST, "/api/auth/otp/verify", body)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn me_without_session_is_unauthorized() {
    let response = send(get_request("/api/auth/me")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Sign in required");
}

#[tokio::test]
async fn admin_products_require_session() {
    let response = send(get_request("/api/admin/products")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let create = json_request(
        Method::POST,
        "/api/admin/products",
        serde_json::json!({"name": "Castle", "price": 5000.0, "category": "Bouncing Castles"}),
    );
    assert_eq!(send(create).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_form_for_non_admin_rerenders_with_error() {
    let response = send(form_request("/admin/login", "email=stranger%40example.com")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let html = body_text(response).await;
    assert!(html.contains("Invalid email or code"));
    assert!(html.contains("stranger@example.com"));
}

#[tokio::test]
async fn logout_form_without_session_clears_cookie_and_redirects() {
    let response = send(form_request("/admin/logout", "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("admin_session="));
}

#[tokio::test]
async fn placeholder_sets_retry_after() {
    let response = pages::placeholder(&test_helpers::test_app_state());
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "2");
}

#[cfg(feature = "live-db-tests")]
mod live {
    use axum::http::header::COOKIE;

    use super::*;
    use crate::services::product::{self, ProductInput};
    use crate::services::session;

    fn with_cookie(mut request: Request<Body>, token: &str) -> Request<Body> {
        let value = format!("{}={token}", auth::SESSION_COOKIE);
        request.headers_mut().insert(COOKIE, value.parse().unwrap());
        request
    }

    async fn live_product(state: &crate::state::AppState, name: &str) -> product::Product {
        let valid = product::validate_product(ProductInput {
            name: name.into(),
            description: String::new(),
            price: 4500.0,
            category: "Slides".into(),
            image_url: None,
            is_active: true,
        })
        .unwrap();
        product::create(&state.pool, valid).await.expect("create should succeed")
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn signed_in_admin_sees_dashboard() {
        let state = test_helpers::live_app_state().await;
        let token = session::create_session(&state.pool, TEST_ADMIN).await.unwrap();

        let response = app(state.clone())
            .oneshot(with_cookie(get_request("/admin"), &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Admin Dashboard"));
        assert!(html.contains(TEST_ADMIN));

        session::delete_session(&state.pool, &token).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn admin_create_form_adds_product_and_returns_to_dashboard() {
        let state = test_helpers::live_app_state().await;
        let token = session::create_session(&state.pool, TEST_ADMIN).await.unwrap();
        let name = format!("Form Castle {}", uuid::Uuid::new_v4().simple());
        let body = format!("name={}&price=7000&category=Slides&is_active=on", urlencoding::encode(&name));

        let response = app(state.clone())
            .oneshot(with_cookie(form_request("/admin/products", &body), &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin");

        let created = product::list_all(&state.pool)
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name == name)
            .expect("form should create the product");
        assert!(created.is_active);
        product::delete(&state.pool, created.id).await.unwrap();
        session::delete_session(&state.pool, &token).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn product_page_and_review_form_round_trip() {
        let state = test_helpers::live_app_state().await;
        let created = live_product(&state, "Review Slide").await;
        let path = format!("/products/{}", created.id);

        let page = app(state.clone()).oneshot(get_request(&path)).await.unwrap();
        assert_eq!(page.status(), StatusCode::OK);
        assert!(body_text(page).await.contains("No reviews yet. Be the first!"));

        let rejected = app(state.clone())
            .oneshot(form_request(&format!("{path}/reviews"), "rating=0&review_text=hi"))
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(rejected).await.contains("Please select a rating"));

        let accepted = app(state.clone())
            .oneshot(form_request(&format!("{path}/reviews"), "rating=5&review_text=Brilliant"))
            .await
            .unwrap();
        assert_eq!(accepted.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&accepted), path);

        let page = app(state.clone()).oneshot(get_request(&path)).await.unwrap();
        assert!(body_text(page).await.contains("Brilliant"));

        product::delete(&state.pool, created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn reviews_of_inactive_product_are_not_found() {
        let state = test_helpers::live_app_state().await;
        let created = live_product(&state, "Retired Slide").await;
        let patch = product::ProductPatch { is_active: Some(false), ..Default::default() };
        product::update(&state.pool, created.id, patch).await.unwrap();

        let uri = format!("/api/products/{}/reviews", created.id);
        let response = app(state.clone()).oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Product not found");

        let missing = format!("/api/products/{}/reviews", uuid::Uuid::new_v4());
        let response = app(state.clone()).oneshot(get_request(&missing)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        product::delete(&state.pool, created.id).await.unwrap();
    }
}
