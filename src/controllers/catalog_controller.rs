use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{CurrentUser, Product},
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

fn product_json(p: &Product, cur: &str, now: i64) -> serde_json::Value {
    let flash = p.flash_active(now);
    json!({
        "id": p.id.to_hex(),
        "name": p.name,
        "description": p.description,
        "image_url": p.image_url,
        "category": p.category,
        "in_stock": p.stock > 0,
        "flash": flash,
        "price_display": currency::format(p.price, "KES", cur).unwrap_or_default(),
        "effective_price_display": currency::format(p.effective_price(now), "KES", cur).unwrap_or_default(),
    })
}

#[derive(Deserialize)]
pub struct ProductsQuery {
    #[serde(default)]
    pub category: Option<String>,
}

// GET /products
pub async fn get_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(q): Query<ProductsQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let cur = active_currency(&state, &jar);

    let products = match catalog_service::list_products(&state, q.category.as_deref()).await {
        Ok(p) => p,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let now = chrono::Utc::now().timestamp();
    let list: Vec<serde_json::Value> = products.iter().map(|p| product_json(p, &cur, now)).collect();

    let body = state
        .hbs
        .render(
            "pages/products",
            &json!({ "products": list, "category": q.category }),
        )
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);
    match render::render_full(&state, "Products", body, user_ref, &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// GET /products/:id
pub async fn get_product_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Ok(oid) = ObjectId::parse_str(&id) else {
        return Redirect::to("/products").into_response();
    };

    let cur = active_currency(&state, &jar);

    let product = match catalog_service::get_product(&state, oid).await {
        Ok(Some(p)) => p,
        Ok(None) => return Redirect::to("/products").into_response(),
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let now = chrono::Utc::now().timestamp();
    let body = state
        .hbs
        .render(
            "pages/product_detail",
            &json!({ "product": product_json(&product, &cur, now) }),
        )
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);
    match render::render_full(&state, &product.name, body, user_ref, &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct CurrencyForm {
    pub code: String,
}

// POST /currency — persists the display-currency choice in a cookie.
pub async fn post_currency(
    jar: CookieJar,
    headers: HeaderMap,
    Form(form): Form<CurrencyForm>,
) -> Response {
    let code = form.code.trim().to_uppercase();

    if !currency::is_supported(&code) {
        return (StatusCode::BAD_REQUEST, Html("unsupported currency".to_string()))
            .into_response();
    }

    let mut cookie = Cookie::new("currency", code);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);

    // Send the browser back to where it was so prices re-render.
    let back = headers
        .get(axum::http::header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/")
        .to_string();

    (jar, Redirect::to(&back)).into_response()
}
