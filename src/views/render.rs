use serde_json::json;

use crate::{models::CurrentUser, AppState};

pub fn render_full(
    state: &AppState,
    title: &str,
    body_html: String,
    user: Option<&CurrentUser>,
    currency: &str,
) -> Result<String, String> {
    let (is_logged_in, user_json) = match user {
        Some(u) => (
            true,
            json!({
                "id": u.id.to_hex(),
                "email": u.email,
                "username": u.username,
                "is_admin": u.is_admin,
            }),
        ),
        None => (false, serde_json::Value::Null),
    };

    let ctx = json!({
        "title": title,
        "body": body_html,
        "is_logged_in": is_logged_in,
        "user": user_json,
        "currency": currency,
        "currencies": crate::services::currency::SUPPORTED,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}
