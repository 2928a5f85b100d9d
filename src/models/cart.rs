use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One cart line. Unique per (user_id, product_id); quantity is bumped
/// in place on repeated adds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub product_id: ObjectId,

    // Denormalized for display without a product lookup.
    pub product_name: String,

    // Snapshot of the effective price at add time (flash price if live).
    pub unit_price: f64,

    pub quantity: i64,
    pub updated_at: i64,
}
