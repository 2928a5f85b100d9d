use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Written by the external payments collaborator (callback side);
/// this app only reads these rows while polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub order_id: ObjectId,

    pub amount: f64,
    pub currency: String,

    // Provider code, e.g. "mpesa_stk" or "paypal".
    pub method_code: String,

    // "pending" | "completed" | "failed"
    pub status: String,

    // "unverified" | "verified"
    pub verification_status: String,

    #[serde(default)]
    pub external_reference: Option<String>,

    pub created_at: i64,
}
