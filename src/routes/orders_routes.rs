use axum::{Router, routing::get};

use crate::{AppState, controllers::orders_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/orders", get(orders_controller::get_orders))
        .route("/orders/:id/confirmation", get(orders_controller::get_confirmation))
        .route("/orders/:id/payment-status", get(orders_controller::get_payment_status))
}
