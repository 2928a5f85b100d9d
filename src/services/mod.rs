pub mod payments;
pub mod db_init;
pub mod currency;

pub mod auth_service;
pub mod catalog_service;
pub mod cart_service;
pub mod checkout_service;
pub mod order_service;
