use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{FindOneOptions, FindOptions};

use crate::{
    models::{Order, PaymentTransaction},
    AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Pending,
    Paid,
    Failed,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Pending => "pending",
            PaymentState::Paid => "paid",
            PaymentState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentState::Pending)
    }
}

/// Adopts whichever source signals a terminal state first: the newest
/// payment transaction, else the order's own payment_status field.
pub fn resolve_payment_state(
    latest_tx: Option<&PaymentTransaction>,
    order_payment_status: &str,
) -> PaymentState {
    if let Some(tx) = latest_tx {
        match (tx.status.as_str(), tx.verification_status.as_str()) {
            ("completed", "verified") => return PaymentState::Paid,
            ("failed", _) => return PaymentState::Failed,
            _ => {}
        }
    }

    match order_payment_status {
        "paid" => PaymentState::Paid,
        "failed" => PaymentState::Failed,
        _ => PaymentState::Pending,
    }
}

pub async fn get_user_order(
    state: &AppState,
    user_id: ObjectId,
    order_id: ObjectId,
) -> Result<Option<Order>, String> {
    let orders = state.db.collection::<Order>("orders");
    orders
        .find_one(doc! { "_id": order_id, "user_id": user_id }, None)
        .await
        .map_err(|e| e.to_string())
}

pub async fn list_user_orders(state: &AppState, user_id: ObjectId) -> Result<Vec<Order>, String> {
    let orders = state.db.collection::<Order>("orders");

    let opts = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
    let mut cursor = orders
        .find(doc! { "user_id": user_id }, opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut out = Vec::new();
    while let Some(item) = cursor.next().await {
        out.push(item.map_err(|e| e.to_string())?);
    }
    Ok(out)
}

pub async fn latest_transaction(
    state: &AppState,
    order_id: ObjectId,
) -> Result<Option<PaymentTransaction>, String> {
    let txs = state.db.collection::<PaymentTransaction>("payment_transactions");

    let opts = FindOneOptions::builder().sort(doc! { "created_at": -1 }).build();
    txs.find_one(doc! { "order_id": order_id }, opts)
        .await
        .map_err(|e| e.to_string())
}

/// One poll tick: read the newest transaction, resolve the state, and if
/// it just went terminal persist it onto the order. The filter guards the
/// pending-only transition, so a terminal payment_status is never
/// overwritten.
pub async fn check_payment(state: &AppState, order: &Order) -> Result<PaymentState, String> {
    let tx = latest_transaction(state, order.id).await?;
    let resolved = resolve_payment_state(tx.as_ref(), &order.payment_status);

    if resolved.is_terminal() && order.payment_status == "pending" {
        let orders = state.db.collection::<Order>("orders");
        orders
            .update_one(
                doc! { "_id": order.id, "payment_status": "pending" },
                doc! { "$set": { "payment_status": resolved.as_str() } },
                None,
            )
            .await
            .map_err(|e| e.to_string())?;
    }

    Ok(resolved)
}

// Fulfilment moves forward only; cancellation is possible until shipping.
pub fn fulfilment_transition_allowed(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("pending", "processing")
            | ("pending", "cancelled")
            | ("processing", "shipped")
            | ("processing", "cancelled")
            | ("shipped", "delivered")
    )
}

pub async fn set_fulfilment_status(
    state: &AppState,
    order_id: ObjectId,
    from: &str,
    to: &str,
) -> Result<(), String> {
    if !fulfilment_transition_allowed(from, to) {
        return Err(format!("cannot move an order from {from} to {to}"));
    }

    let orders = state.db.collection::<Order>("orders");
    let res = orders
        .update_one(
            doc! { "_id": order_id, "status": from },
            doc! { "$set": { "status": to } },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

    if res.matched_count == 0 {
        return Err("order not found or already moved".to_string());
    }
    Ok(())
}

pub async fn list_recent_orders(state: &AppState, limit: i64) -> Result<Vec<Order>, String> {
    let orders = state.db.collection::<Order>("orders");

    let opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .limit(limit)
        .build();
    let mut cursor = orders.find(doc! {}, opts).await.map_err(|e| e.to_string())?;

    let mut out = Vec::new();
    while let Some(item) = cursor.next().await {
        out.push(item.map_err(|e| e.to_string())?);
    }
    Ok(out)
}
