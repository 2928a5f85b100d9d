use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ObjectId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Items are embedded so an order and its lines land in one insert;
/// `total_amount` must equal the sum of item totals minus the discount
/// at creation time and is never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,

    pub items: Vec<OrderItem>,

    pub total_amount: f64,
    pub currency: String,

    // "mpesa" | "paypal" | "cash" | "crypto"
    pub payment_method: String,

    // Fulfilment: "pending" | "processing" | "shipped" | "delivered" | "cancelled"
    pub status: String,

    // "pending" | "paid" | "failed" — pending is the only non-terminal state.
    pub payment_status: String,

    pub shipping_address: String,

    #[serde(default)]
    pub phone: Option<String>,

    // Crypto orders: the reference the buyer supplied at checkout.
    #[serde(default)]
    pub tx_reference: Option<String>,

    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub discount: f64,

    pub created_at: i64,
}

impl Order {
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|i| i.total_price).sum()
    }

    /// True for methods that settle asynchronously and need status polling.
    pub fn needs_payment_poll(&self) -> bool {
        matches!(self.payment_method.as_str(), "mpesa" | "crypto")
    }
}
