use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,
    pub description: String,

    // Catalog price in the store base currency (KES).
    pub price: f64,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    pub stock: i64,

    // Flash sale: discounted price valid until flash_ends_at.
    #[serde(default)]
    pub flash_price: Option<f64>,
    #[serde(default)]
    pub flash_ends_at: Option<i64>,

    pub created_at: i64,
}

impl Product {
    pub fn flash_active(&self, now: i64) -> bool {
        matches!((self.flash_price, self.flash_ends_at), (Some(_), Some(ends)) if ends > now)
    }

    /// Price the cart snapshots: flash price while the sale is live,
    /// the regular price otherwise.
    pub fn effective_price(&self, now: i64) -> f64 {
        if self.flash_active(now) {
            self.flash_price.unwrap_or(self.price)
        } else {
            self.price
        }
    }
}
