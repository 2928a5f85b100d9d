use std::net::SocketAddr;

use mongodb::Client;

use sokoni::{config, routes, services, templates, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = services::db_init::ensure_indexes(&db).await {
        tracing::warn!("index init failed: {e}");
    }

    let payments = services::payments::PaymentsClient::new(
        settings.payments_base_url.clone(),
        settings.payments_api_key.clone(),
    );

    let state = AppState {
        hbs: templates::build_handlebars(),
        db,
        settings: settings.clone(),
        payments,
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().expect("invalid HOST"),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind");
    axum::serve(listener, app).await.expect("serve");
}
