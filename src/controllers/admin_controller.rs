use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::CurrentUser,
    render,
    services::{catalog_service, currency, order_service},
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

fn require_admin(user: &Option<Extension<CurrentUser>>) -> Result<&CurrentUser, Response> {
    match user {
        Some(Extension(u)) if u.is_admin => Ok(u),
        Some(_) => Err(StatusCode::FORBIDDEN.into_response()),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Html(r#"<div class="text-danger">Unauthorized</div>"#.to_string()),
        )
            .into_response()),
    }
}

// GET /admin/products
pub async fn get_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let u = match require_admin(&user) {
        Ok(u) => u.clone(),
        Err(res) => return res,
    };

    let cur = active_currency(&state, &jar);

    let products = match catalog_service::list_products(&state, None).await {
        Ok(p) => p,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let now = chrono::Utc::now().timestamp();
    let list: Vec<serde_json::Value> = products
        .iter()
        .map(|p| {
            json!({
                "id": p.id.to_hex(),
                "name": p.name,
                "category": p.category,
                "stock": p.stock,
                "price_display": currency::format(p.price, "KES", &cur).unwrap_or_default(),
                "flash": p.flash_active(now),
            })
        })
        .collect();

    let body = state
        .hbs
        .render("pages/admin_products", &json!({ "products": list }))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Admin · Products", body, Some(&u), &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default, rename = "imageUrl")]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default, rename = "flashPrice")]
    pub flash_price: String,
    #[serde(default, rename = "flashEndsAt")]
    pub flash_ends_at: String,
}

fn parse_product_form(form: &ProductForm) -> Result<catalog_service::ProductInput, String> {
    let price: f64 = form
        .price
        .trim()
        .parse()
        .map_err(|_| "Enter a valid price.".to_string())?;

    let stock: i64 = form
        .stock
        .trim()
        .parse()
        .map_err(|_| "Enter a valid stock count.".to_string())?;

    let flash_price = match form.flash_price.trim() {
        "" => None,
        s => Some(s.parse::<f64>().map_err(|_| "Enter a valid flash price.".to_string())?),
    };

    let flash_ends_at = match form.flash_ends_at.trim() {
        "" => None,
        s => Some(s.parse::<i64>().map_err(|_| "Enter a valid flash end time.".to_string())?),
    };

    Ok(catalog_service::ProductInput {
        name: form.name.clone(),
        description: form.description.clone(),
        price,
        image_url: form.image_url.clone(),
        category: form.category.clone(),
        stock,
        flash_price,
        flash_ends_at,
    })
}

fn error_snippet(msg: &str) -> Response {
    (StatusCode::OK, Html(format!(r#"<div class="text-danger">{msg}</div>"#))).into_response()
}

// POST /admin/products
pub async fn post_create_product(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<ProductForm>,
) -> Response {
    if let Err(res) = require_admin(&user) {
        return res;
    }

    let input = match parse_product_form(&form) {
        Ok(i) => i,
        Err(msg) => return error_snippet(&msg),
    };

    let errs = catalog_service::validate_product(&input);
    if let Some(msg) = errs.values().next() {
        return error_snippet(msg);
    }

    if let Err(e) = catalog_service::create_product(&state, &input).await {
        return error_snippet(&format!("db error: {e}"));
    }

    Redirect::to("/admin/products").into_response()
}

// POST /admin/products/:id
pub async fn post_update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<ProductForm>,
) -> Response {
    if let Err(res) = require_admin(&user) {
        return res;
    }

    let Ok(oid) = ObjectId::parse_str(id.trim()) else {
        return error_snippet("Unknown product.");
    };

    let input = match parse_product_form(&form) {
        Ok(i) => i,
        Err(msg) => return error_snippet(&msg),
    };

    let errs = catalog_service::validate_product(&input);
    if let Some(msg) = errs.values().next() {
        return error_snippet(msg);
    }

    if let Err(e) = catalog_service::update_product(&state, oid, &input).await {
        return error_snippet(&format!("db error: {e}"));
    }

    Redirect::to("/admin/products").into_response()
}

// POST /admin/products/:id/delete
pub async fn post_delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    if let Err(res) = require_admin(&user) {
        return res;
    }

    let Ok(oid) = ObjectId::parse_str(id.trim()) else {
        return error_snippet("Unknown product.");
    };

    if let Err(e) = catalog_service::delete_product(&state, oid).await {
        return error_snippet(&format!("db error: {e}"));
    }

    Redirect::to("/admin/products").into_response()
}

// GET /admin/orders
pub async fn get_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let u = match require_admin(&user) {
        Ok(u) => u.clone(),
        Err(res) => return res,
    };

    let cur = active_currency(&state, &jar);

    let orders = match order_service::list_recent_orders(&state, 100).await {
        Ok(o) => o,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}")))
                .into_response();
        }
    };

    let list: Vec<serde_json::Value> = orders
        .iter()
        .map(|o| {
            json!({
                "id": o.id.to_hex(),
                "user_id": o.user_id.to_hex(),
                "total_display": currency::format(o.total_amount, &o.currency, &cur).unwrap_or_default(),
                "payment_method": o.payment_method,
                "payment_status": o.payment_status,
                "status": o.status,
                "created_at": o.created_at,
            })
        })
        .collect();

    let body = state
        .hbs
        .render("pages/admin_orders", &json!({ "orders": list }))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Admin · Orders", body, Some(&u), &cur) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct OrderStatusForm {
    pub status: String,
}

// POST /admin/orders/:id/status
pub async fn post_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<OrderStatusForm>,
) -> Response {
    if let Err(res) = require_admin(&user) {
        return res;
    }

    let Ok(oid) = ObjectId::parse_str(id.trim()) else {
        return error_snippet("Unknown order.");
    };

    let orders = state.db.collection::<crate::models::Order>("orders");
    let order = match orders.find_one(mongodb::bson::doc! { "_id": oid }, None).await {
        Ok(Some(o)) => o,
        Ok(None) => return error_snippet("Unknown order."),
        Err(e) => return error_snippet(&format!("db error: {e}")),
    };

    let to = form.status.trim();
    if let Err(e) = order_service::set_fulfilment_status(&state, oid, &order.status, to).await {
        return error_snippet(&e);
    }

    Redirect::to("/admin/orders").into_response()
}
