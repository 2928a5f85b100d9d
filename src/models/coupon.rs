use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub code: String,

    // "percent" | "fixed"
    pub kind: String,
    pub amount: f64,

    pub active: bool,

    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl Coupon {
    pub fn usable(&self, now: i64) -> bool {
        self.active && self.expires_at.map(|t| t > now).unwrap_or(true)
    }

    /// Discount against a subtotal, clamped so it never exceeds it.
    pub fn discount_for(&self, subtotal: f64) -> f64 {
        let raw = match self.kind.as_str() {
            "percent" => subtotal * (self.amount / 100.0),
            "fixed" => self.amount,
            _ => 0.0,
        };
        raw.clamp(0.0, subtotal)
    }
}
