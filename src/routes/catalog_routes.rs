use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::catalog_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/products", get(catalog_controller::get_products))
        .route("/products/:id", get(catalog_controller::get_product_detail))
        .route("/currency", post(catalog_controller::post_currency))
}
