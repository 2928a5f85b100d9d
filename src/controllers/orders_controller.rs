use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{CurrentUser, Order},
    render,
    services::{currency, order_service},
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

fn order_json(o: &Order, cur: &str) -> serde_json::Value {
    let items: Vec<serde_json::Value> = o
        .items
        .iter()
        .map(|i| {
            json!({
                "product_name": i.product_name,
                "quantity": i.quantity,
                "unit_price_display": currency::format(i.unit_price, &o.currency, cur).unwrap_or_default(),
                "total_price_display": currency::format(i.total_price, &o.currency, cur).unwrap_or_default(),
            })
        })
        .collect();

    json!({
        "id": o.id.to_hex(),
        "items": items,
        "total_display": currency::format(o.total_amount, &o.currency, cur).unwrap_or_default(),
        "discount_display": currency::format(o.discount, &o.currency, cur).unwrap_or_default(),
        "has_discount": o.discount > 0.0,
        "coupon_code": o.coupon_code,
        "payment_method": o.payment_method,
        "status": o.status,
        "payment_status": o.payment_status,
        "shipping_address": o.shipping_address,
        "created_at": o.created_at,
    })
}

// GET /orders
pub async fn get_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let cur = active_currency(&state, &jar);

    let orders = match order_service::list_user_orders(&state, u.id).await {
        Ok(o) => o,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let list: Vec<serde_json::Value> = orders.iter().map(|o| order_json(o, &cur)).collect();

    let body = state
        .hbs
        .render("pages/orders", &json!({ "orders": list, "empty": orders.is_empty() }))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Your orders", body, Some(&u), &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct ConfirmationQuery {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// GET /orders/:id/confirmation
pub async fn get_confirmation(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(q): Query<ConfirmationQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Ok(oid) = ObjectId::parse_str(&id) else {
        return Redirect::to("/orders").into_response();
    };

    // Not found (or someone else's order) is benign: back to the list.
    let order = match order_service::get_user_order(&state, u.id, oid).await {
        Ok(Some(o)) => o,
        Ok(None) => return Redirect::to("/orders").into_response(),
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let cur = active_currency(&state, &jar);
    let method = q.method.unwrap_or_else(|| order.payment_method.clone());

    let poll = order.needs_payment_poll() && order.payment_status == "pending";

    let ctx = json!({
        "order": order_json(&order, &cur),
        "method": method,
        "phone": q.phone,
        "receiving_address": q.address,
        "is_mpesa": method == "mpesa",
        "is_crypto": method == "crypto",
        "is_cash": method == "cash",
        "poll": poll,
    });

    let body = state
        .hbs
        .render("pages/confirmation", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Order confirmation", body, Some(&u), &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// GET /orders/:id/payment-status (HTMX partial, polled every 10s)
//
// Terminal and timed-out responses render without the polling trigger,
// which is what stops the poll on the client.
pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Ok(oid) = ObjectId::parse_str(&id) else {
        return (StatusCode::NOT_FOUND, Html("".to_string())).into_response();
    };

    let order = match order_service::get_user_order(&state, u.id, oid).await {
        Ok(Some(o)) => o,
        Ok(None) => return (StatusCode::NOT_FOUND, Html("".to_string())).into_response(),
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let resolved = match order_service::check_payment(&state, &order).await {
        Ok(s) => s,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let now = chrono::Utc::now().timestamp();
    let timed_out = !resolved.is_terminal()
        && now - order.created_at > state.settings.payment_poll_deadline_secs;

    let ctx = json!({
        "order_id": order.id.to_hex(),
        "paid": resolved == order_service::PaymentState::Paid,
        "failed": resolved == order_service::PaymentState::Failed,
        "pending": !resolved.is_terminal() && !timed_out,
        "timed_out": timed_out,
    });

    let html = state
        .hbs
        .render("partials/payment_status", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}
