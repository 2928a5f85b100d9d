use axum::{
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use mongodb::Client;
use sokoni::{config, controllers::auth_controller, services, templates, AppState};
use tower::ServiceExt;

async fn test_state() -> AppState {
    let mut settings = config::load();
    // Fail fast when no mongod is around; these tests only exercise
    // branches that never reach the database.
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

fn register_request(body: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = register_request(
        "username=wanjiku&email=wanjiku%40example.com&password=secret1&rePassword=secret2",
    );

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Passwords do not match"));
}

#[tokio::test]
async fn register_rejects_an_invalid_email() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req =
        register_request("username=wanjiku&email=not-an-email&password=secret1&rePassword=secret1");

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Invalid email"));
}

// Uniqueness is verified against the user store before anything is written;
// when that verification cannot run, no account and no session may appear.
#[tokio::test]
async fn register_never_opens_a_session_when_uniqueness_cannot_be_verified() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = register_request(
        "username=wanjiku&email=wanjiku%40example.com&password=secret1&rePassword=secret1",
    );

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    assert!(res.headers().get("HX-Redirect").is_none());

    let body = response_body_string(res).await;
    assert!(body.contains("There is a problem registering this user!"));
}
