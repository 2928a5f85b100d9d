use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub jwt_cookie_name: String,
    pub cookie_secure: bool,

    // External payments functions (M-Pesa push, PayPal create).
    pub payments_base_url: String,
    pub payments_api_key: String,

    pub default_currency: String,

    // How long a confirmation page keeps polling payment status
    // before giving up (seconds since order creation).
    pub payment_poll_deadline_secs: i64,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "sokoni".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-dev-secret".to_string());
    let jwt_cookie_name = env::var("JWT_COOKIE_NAME").unwrap_or_else(|_| "auth".to_string());
    let cookie_secure = env::var("COOKIE_SECURE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let payments_base_url = env::var("PAYMENTS_BASE_URL").unwrap_or_default();
    let payments_api_key = env::var("PAYMENTS_API_KEY").unwrap_or_default();

    let default_currency = env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "KES".to_string());

    let payment_poll_deadline_secs = env::var("PAYMENT_POLL_DEADLINE_SECS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(600);

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        jwt_secret,
        jwt_cookie_name,
        cookie_secure,
        payments_base_url,
        payments_api_key,
        default_currency,
        payment_poll_deadline_secs,
    }
}
