use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{CartItem, CurrentUser},
    render,
    services::{cart_service, checkout_service, currency},
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

fn htmx_redirect(path: &str) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        "HX-Redirect",
        path.parse().unwrap_or_else(|_| "/".parse().unwrap()),
    );
    (StatusCode::OK, headers, Html("".to_string())).into_response()
}

// Minimal query-value encoding for the handful of reserved characters
// that can appear in phone numbers and addresses.
fn encode_query_value(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for ch in v.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '+' => out.push_str("%2B"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '#' => out.push_str("%23"),
            '%' => out.push_str("%25"),
            '?' => out.push_str("%3F"),
            _ => out.push(ch),
        }
    }
    out
}

fn summary_ctx(
    items: &[CartItem],
    cur: &str,
    values: &serde_json::Value,
    errors: &serde_json::Value,
) -> serde_json::Value {
    let lines: Vec<serde_json::Value> = items
        .iter()
        .map(|i| {
            json!({
                "product_name": i.product_name,
                "quantity": i.quantity,
                "line_total_display":
                    currency::format(i.unit_price * (i.quantity as f64), "KES", cur).unwrap_or_default(),
            })
        })
        .collect();

    let subtotal = cart_service::subtotal(items);

    json!({
        "items": lines,
        "subtotal_display": currency::format(subtotal, "KES", cur).unwrap_or_default(),
        "values": values,
        "errors": errors,
    })
}

// GET /checkout
pub async fn get_checkout(
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

    if items.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let ctx = summary_ctx(&items, &cur, &json!({}), &json!({}));
    let body = state
        .hbs
        .render("pages/checkout", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Checkout", body, Some(&u), &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct CheckoutForm {
    #[serde(default, rename = "paymentMethod")]
    pub payment_method: String,

    #[serde(default, rename = "shippingAddress")]
    pub shipping_address: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default, rename = "txReference")]
    pub tx_reference: String,

    #[serde(default, rename = "couponCode")]
    pub coupon_code: String,

    // Checkbox: present when ticked.
    #[serde(default)]
    pub terms: Option<String>,
}

// POST /checkout
pub async fn post_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let input = checkout_service::CheckoutInput {
        payment_method: form.payment_method.trim().to_string(),
        shipping_address: form.shipping_address.trim().to_string(),
        phone: form.phone.trim().to_string(),
        tx_reference: form.tx_reference.trim().to_string(),
        coupon_code: form.coupon_code.trim().to_string(),
        terms_accepted: form.terms.is_some(),
    };

    let placed = match checkout_service::place_order(&state, u.id, &input).await {
        Ok(p) => p,
        Err(errs) => {
            // Re-render the form with errors; the cart is still intact for
            // pure validation failures.
            let cur = active_currency(&state, &jar);
            let items = cart_service::list_items(&state, u.id).await.unwrap_or_default();

            let mut errors = serde_json::Map::new();
            for (k, v) in errs {
                errors.insert(k, json!(v));
            }
            let values = json!({
                "paymentMethod": input.payment_method,
                "shippingAddress": input.shipping_address,
                "phone": input.phone,
                "txReference": input.tx_reference,
                "couponCode": input.coupon_code,
            });

            let ctx = summary_ctx(&items, &cur, &values, &serde_json::Value::Object(errors));
            let body = state
                .hbs
                .render("pages/checkout", &ctx)
                .unwrap_or_else(|e| format!("template error: {e}"));

            if is_htmx(&headers) {
                return (StatusCode::OK, Html(body)).into_response();
            }
            return match render::render_full(&state, "Checkout", body, Some(&u), &cur) {
                Ok(page) => (StatusCode::OK, Html(page)).into_response(),
                Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
            };
        }
    };

    // PayPal leaves the site for approval; everything else lands on the
    // confirmation page.
    if let Some(url) = placed.approval_url {
        if is_htmx(&headers) {
            return htmx_redirect(&url);
        }
        return Redirect::to(&url).into_response();
    }

    let mut target = format!(
        "/orders/{}/confirmation?method={}",
        placed.order_id.to_hex(),
        placed.payment_method
    );
    if let Some(phone) = &placed.phone {
        target.push_str(&format!("&phone={}", encode_query_value(phone)));
    }
    if let Some(addr) = &placed.receiving_address {
        target.push_str(&format!("&address={}", encode_query_value(addr)));
    }

    if is_htmx(&headers) {
        return htmx_redirect(&target);
    }
    Redirect::to(&target).into_response()
}
