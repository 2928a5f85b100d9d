use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::admin_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/admin/products",
            get(admin_controller::get_products).post(admin_controller::post_create_product),
        )
        .route("/admin/products/:id", post(admin_controller::post_update_product))
        .route("/admin/products/:id/delete", post(admin_controller::post_delete_product))
        .route("/admin/orders", get(admin_controller::get_orders))
        .route("/admin/orders/:id/status", post(admin_controller::post_order_status))
}
