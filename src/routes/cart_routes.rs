use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::cart_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/cart", get(cart_controller::get_cart))
        .route("/cart/items", get(cart_controller::get_cart_items))
        .route("/cart/add", post(cart_controller::post_add))
        .route("/cart/:item_id/qty", post(cart_controller::post_update_qty))
        .route("/cart/:item_id/remove", post(cart_controller::post_remove))
}
