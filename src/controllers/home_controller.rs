use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
};
use axum_extra::extract::CookieJar;
use mongodb::bson::doc;
use serde_json::json;

use crate::{
    models::CurrentUser,
    render,
    services::{catalog_service, currency},
    AppState,
};

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn active_currency(state: &AppState, jar: &CookieJar) -> String {
    currency::resolve_active(
        jar.get("currency").map(|c| c.value()),
        &state.settings.default_currency,
    )
}

pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
) -> impl IntoResponse {
    let cur = active_currency(&state, &jar);

    let flash = catalog_service::flash_sale_products(&state, 8)
        .await
        .unwrap_or_default();

    let now = chrono::Utc::now().timestamp();
    let flash_json: Vec<serde_json::Value> = flash
        .iter()
        .map(|p| {
            json!({
                "id": p.id.to_hex(),
                "name": p.name,
                "image_url": p.image_url,
                "price_display": currency::format(p.price, "KES", &cur).unwrap_or_default(),
                "flash_price_display": currency::format(p.effective_price(now), "KES", &cur).unwrap_or_default(),
            })
        })
        .collect();

    let body = state
        .hbs
        .render("pages/home", &json!({ "flash_products": flash_json }))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);

    match render::render_full(&state, "Sokoni", body, user_ref, &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

pub async fn not_found(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
) -> impl IntoResponse {
    let cur = active_currency(&state, &jar);

    let body = state
        .hbs
        .render("pages/not_found", &json!({}))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::NOT_FOUND, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);

    match render::render_full(&state, "404", body, user_ref, &cur) {
        Ok(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Html("ok".to_string()))
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.run_command(doc! { "ping": 1 }, None).await {
        Ok(_) => (StatusCode::OK, Html("db ok".to_string())),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}"))),
    }
}
