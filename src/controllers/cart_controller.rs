use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{CartItem, CurrentUser},
    render,
    services::{cart_service, currency},
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

fn unauthorized_snippet() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Html(r#"<div class="text-danger">Unauthorized</div>"#.to_string()),
    )
        .into_response()
}

fn cart_updated_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("HX-Trigger", HeaderValue::from_static(r#"{"cartUpdated":true}"#));
    headers
}

fn cart_ctx(items: &[CartItem], cur: &str) -> serde_json::Value {
    let lines: Vec<serde_json::Value> = items
        .iter()
        .map(|i| {
            let line_total = i.unit_price * (i.quantity as f64);
            json!({
                "id": i.id.to_hex(),
                "product_id": i.product_id.to_hex(),
                "product_name": i.product_name,
                "quantity": i.quantity,
                "unit_price_display": currency::format(i.unit_price, "KES", cur).unwrap_or_default(),
                "line_total_display": currency::format(line_total, "KES", cur).unwrap_or_default(),
            })
        })
        .collect();

    let subtotal = cart_service::subtotal(items);

    json!({
        "items": lines,
        "empty": items.is_empty(),
        "count": cart_service::item_count(items),
        "subtotal_display": currency::format(subtotal, "KES", cur).unwrap_or_default(),
    })
}

// GET /cart
pub async fn get_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let cur = active_currency(&state, &jar);

    let items = match cart_service::list_items(&state, u.id).await {
        Ok(i) => i,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let body = state
        .hbs
        .render("pages/cart", &cart_ctx(&items, &cur))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Your cart", body, Some(&u), &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// GET /cart/items (HTMX partial)
pub async fn get_cart_items(
    State(state): State<AppState>,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let cur = active_currency(&state, &jar);

    let items = match cart_service::list_items(&state, u.id).await {
        Ok(i) => i,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let html = state
        .hbs
        .render("partials/cart_items", &cart_ctx(&items, &cur))
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

#[derive(Deserialize)]
pub struct AddForm {
    pub product_id: String,
    pub qty: String,
}

// POST /cart/add
pub async fn post_add(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<AddForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let qty: i64 = match form.qty.trim().parse() {
        Ok(q) => q,
        Err(_) => {
            return (
                StatusCode::OK,
                Html(r#"<div class="text-danger">Enter a valid quantity.</div>"#.to_string()),
            )
                .into_response();
        }
    };

    let Ok(product_id) = ObjectId::parse_str(form.product_id.trim()) else {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger">Unknown product.</div>"#.to_string()),
        )
            .into_response();
    };

    if let Err(errs) = cart_service::add_item(&state, u.id, product_id, qty).await {
        let msg = errs
            .get("qty")
            .or_else(|| errs.get("_form"))
            .cloned()
            .unwrap_or_else(|| "Could not add to cart.".to_string());
        return (StatusCode::OK, Html(format!(r#"<div class="text-danger">{msg}</div>"#)))
            .into_response();
    }

    (
        StatusCode::OK,
        cart_updated_headers(),
        Html(r#"<div class="text-success">Added to cart.</div>"#.to_string()),
    )
        .into_response()
}

#[derive(Deserialize)]
pub struct QtyForm {
    pub qty: String,
}

// POST /cart/:item_id/qty
pub async fn post_update_qty(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<QtyForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Ok(qty) = form.qty.trim().parse::<i64>() else {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger">Enter a valid quantity.</div>"#.to_string()),
        )
            .into_response();
    };

    let Ok(id) = ObjectId::parse_str(item_id.trim()) else {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger">Unknown cart line.</div>"#.to_string()),
        )
            .into_response();
    };

    if let Err(e) = cart_service::set_quantity(&state, u.id, id, qty).await {
        return (StatusCode::OK, Html(format!(r#"<div class="text-danger">db error: {e}</div>"#)))
            .into_response();
    }

    // Return the refreshed list so the page swap shows new totals.
    let (parts, body) = get_cart_items(State(state), jar, Some(Extension(u)))
        .await
        .into_parts();
    let mut res = Response::from_parts(parts, body);
    res.headers_mut()
        .insert("HX-Trigger", HeaderValue::from_static(r#"{"cartUpdated":true}"#));
    res
}

// POST /cart/:item_id/remove
pub async fn post_remove(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Ok(id) = ObjectId::parse_str(item_id.trim()) else {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger">Unknown cart line.</div>"#.to_string()),
        )
            .into_response();
    };

    if let Err(e) = cart_service::remove_item(&state, u.id, id).await {
        return (StatusCode::OK, Html(format!(r#"<div class="text-danger">db error: {e}</div>"#)))
            .into_response();
    }

    let (parts, body) = get_cart_items(State(state), jar, Some(Extension(u)))
        .await
        .into_parts();
    let mut res = Response::from_parts(parts, body);
    res.headers_mut()
        .insert("HX-Trigger", HeaderValue::from_static(r#"{"cartUpdated":true}"#));
    res
}
