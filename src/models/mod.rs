pub mod user;
pub mod product;
pub mod cart;
pub mod order;
pub mod payment;
pub mod coupon;

pub use user::{CurrentUser, User};
pub use product::Product;
pub use cart::CartItem;
pub use order::{Order, OrderItem};
pub use payment::PaymentTransaction;
pub use coupon::Coupon;
