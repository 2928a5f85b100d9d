pub mod home_controller;
pub mod auth_controller;
pub mod catalog_controller;
pub mod cart_controller;
pub mod checkout_controller;
pub mod orders_controller;
pub mod admin_controller;
