use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::{models::{CurrentUser, User}, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id as hex string
    pub sub: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for part in raw.split(';') {
        let part = part.trim();
        let mut it = part.splitn(2, '=');
        let k = it.next()?.trim();
        let v = it.next()?.trim();
        if k == name {
            return Some(v.to_string());
        }
    }
    None
}

pub async fn inject_current_user(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let cookie_name = state.settings.jwt_cookie_name.as_str();

    if let Some(token) = get_cookie(req.headers(), cookie_name) {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
            &validation,
        );

        if let Ok(data) = decoded {
            if let Ok(user_id) = ObjectId::parse_str(&data.claims.sub) {
                let users = state.db.collection::<User>("users");

                if let Ok(Some(user)) = users.find_one(doc! { "_id": user_id }, None).await {
                    // Store user in request extensions so handlers can access it
                    req.extensions_mut().insert(CurrentUser::from(user));
                }
            }
        }
    }

    next.run(req).await
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn is_public_path(path: &str) -> bool {
    path == "/"
        || path == "/login"
        || path == "/register"
        || path == "/logout"
        || path == "/health"
        || path == "/health/db"
        || path == "/favicon.ico"
        || path == "/currency"
        || path == "/products"
        || path.starts_with("/products/")
        || path.starts_with("/static/")
}

pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    // Browsing the catalog needs no account; cart/checkout/orders/admin do.
    if is_public_path(path) {
        return next.run(req).await;
    }

    let user = req.extensions().get::<CurrentUser>();

    // /admin additionally needs the admin flag.
    if path == "/admin" || path.starts_with("/admin/") {
        return match user {
            Some(u) if u.is_admin => next.run(req).await,
            Some(_) => StatusCode::FORBIDDEN.into_response(),
            None => redirect_to_login(req.headers()),
        };
    }

    if user.is_some() {
        return next.run(req).await;
    }

    redirect_to_login(req.headers())
}

fn redirect_to_login(headers: &HeaderMap) -> Response {
    // HTMX requests need a client-side redirect header, not a 302.
    if is_htmx(headers) {
        let mut out = HeaderMap::new();
        out.insert("HX-Redirect", HeaderValue::from_static("/login"));
        return (StatusCode::OK, out, Html("".to_string())).into_response();
    }

    Redirect::to("/login").into_response()
}
