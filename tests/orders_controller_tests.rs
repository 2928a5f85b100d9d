use axum::{
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use mongodb::{bson::oid::ObjectId, Client};
use sokoni::models::CurrentUser;
use sokoni::{config, controllers::orders_controller, services, templates, AppState};
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

fn current_user() -> CurrentUser {
    CurrentUser {
        id: ObjectId::new(),
        email: "test@example.com".to_string(),
        username: "test".to_string(),
        is_admin: false,
    }
}

#[tokio::test]
async fn get_payment_status_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders/:id/payment-status", get(orders_controller::get_payment_status))
        .with_state(state);

    let req = Request::builder()
        .method("GET")
        .uri(format!("/orders/{}/payment-status", ObjectId::new().to_hex()))
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_payment_status_bad_id_is_not_found() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders/:id/payment-status", get(orders_controller::get_payment_status))
        .with_state(state);

    let mut req = Request::builder()
        .method("GET")
        .uri("/orders/not-an-oid/payment-status")
        .body(axum::body::Body::empty())
        .unwrap();
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_confirmation_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders/:id/confirmation", get(orders_controller::get_confirmation))
        .with_state(state);

    let req = Request::builder()
        .method("GET")
        .uri(format!("/orders/{}/confirmation", ObjectId::new().to_hex()))
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_confirmation_with_malformed_id_redirects_to_orders() {
    let state = test_state().await;
    let app = Router::new()
        .route("/orders/:id/confirmation", get(orders_controller::get_confirmation))
        .with_state(state);

    let mut req = Request::builder()
        .method("GET")
        .uri("/orders/not-an-oid/confirmation")
        .body(axum::body::Body::empty())
        .unwrap();
    req.extensions_mut().insert(current_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers().get(axum::http::header::LOCATION).unwrap(),
        "/orders"
    );
}
