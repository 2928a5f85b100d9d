use axum::{Router, routing::get};

use crate::{AppState, controllers::checkout_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route(
        "/checkout",
        get(checkout_controller::get_checkout).post(checkout_controller::post_checkout),
    )
}
