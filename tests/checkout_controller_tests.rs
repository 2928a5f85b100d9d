use axum::{
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use mongodb::{bson::oid::ObjectId, Client};
use sokoni::models::CurrentUser;
use sokoni::{config, controllers::checkout_controller, services, templates, AppState};
use tower::ServiceExt;

async fn test_state() -> AppState {
    let mut settings = config::load();
    settings.mongodb_uri = "mongodb://localhost:27017/?serverSelectionTimeoutMS=200".to_string();
    settings.payments_api_key = String::new();

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    let payments = services::payments::PaymentsClient::new(
        settings.payments_base_url.clone(),
        settings.payments_api_key.clone(),
    );

    AppState {
        hbs: templates::build_handlebars(),
        db,
        settings,
        payments,
    }
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

fn current_user() -> CurrentUser {
    CurrentUser {
        id: ObjectId::new(),
        email: "test@example.com".to_string(),
        username: "test".to_string(),
        is_admin: false,
    }
}

fn checkout_request(body: &'static str, user: Option<CurrentUser>) -> Request<axum::body::Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/checkout")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(body))
        .unwrap();

    if let Some(u) = user {
        req.extensions_mut().insert(u);
    }
    req
}

#[tokio::test]
async fn post_checkout_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/checkout", post(checkout_controller::post_checkout))
        .with_state(state);

    let res = app
        .oneshot(checkout_request("paymentMethod=cash", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn post_checkout_without_terms_rejects_before_any_write() {
    let state = test_state().await;
    let app = Router::new()
        .route("/checkout", post(checkout_controller::post_checkout))
        .with_state(state);

    let res = app
        .oneshot(checkout_request(
            "paymentMethod=cash&shippingAddress=Moi+Avenue+12",
            Some(current_user()),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = response_body_string(res).await;
    assert!(body.contains("You must accept the terms"));
}

#[tokio::test]
async fn post_checkout_invalid_mpesa_phone_never_creates_an_order() {
    let state = test_state().await;
    let app = Router::new()
        .route("/checkout", post(checkout_controller::post_checkout))
        .with_state(state);

    // Validation short-circuits in the service before any insert; the form
    // comes back with the phone error.
    let res = app
        .oneshot(checkout_request(
            "paymentMethod=mpesa&shippingAddress=Moi+Avenue+12&phone=12345&terms=on",
            Some(current_user()),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = response_body_string(res).await;
    assert!(body.contains("Enter a valid M-Pesa phone number"));
}

#[tokio::test]
async fn post_checkout_crypto_without_reference_rejects() {
    let state = test_state().await;
    let app = Router::new()
        .route("/checkout", post(checkout_controller::post_checkout))
        .with_state(state);

    let res = app
        .oneshot(checkout_request(
            "paymentMethod=crypto&shippingAddress=Moi+Avenue+12&terms=on",
            Some(current_user()),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = response_body_string(res).await;
    assert!(body.contains("Transaction reference is required"));
}
