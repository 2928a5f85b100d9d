use std::collections::HashMap;

use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{FindOptions, UpdateOptions};

use crate::{models::CartItem, AppState};

use super::{auth_service::FieldErrors, catalog_service};

pub async fn list_items(state: &AppState, user_id: ObjectId) -> Result<Vec<CartItem>, String> {
    let items = state.db.collection::<CartItem>("cart_items");

    let opts = FindOptions::builder().sort(doc! { "updated_at": -1 }).build();
    let mut cursor = items
        .find(doc! { "user_id": user_id }, opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut out = Vec::new();
    while let Some(item) = cursor.next().await {
        out.push(item.map_err(|e| e.to_string())?);
    }
    Ok(out)
}

pub fn subtotal(items: &[CartItem]) -> f64 {
    items
        .iter()
        .map(|i| i.unit_price * (i.quantity as f64))
        .sum()
}

pub fn item_count(items: &[CartItem]) -> i64 {
    items.iter().map(|i| i.quantity).sum()
}

/// The stock check must cover the post-add line quantity, not just the
/// amount being added.
pub fn exceeds_stock(stock: i64, in_cart: i64, adding: i64) -> bool {
    in_cart + adding > stock
}

/// Adds a product to the cart. One atomic upsert against the unique
/// (user_id, product_id) index: repeated adds bump the quantity, and two
/// concurrent adds cannot create duplicate lines.
pub async fn add_item(
    state: &AppState,
    user_id: ObjectId,
    product_id: ObjectId,
    qty: i64,
) -> Result<(), FieldErrors> {
    let mut errs: FieldErrors = HashMap::new();

    if qty <= 0 {
        errs.insert("qty".into(), "Enter a valid quantity.".into());
        return Err(errs);
    }

    let product = match catalog_service::get_product(state, product_id).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            errs.insert("_form".into(), "This product is no longer available.".into());
            return Err(errs);
        }
        Err(e) => {
            errs.insert("_form".into(), format!("db error: {e}"));
            return Err(errs);
        }
    };

    let items = state.db.collection::<CartItem>("cart_items");

    let in_cart = match items
        .find_one(doc! { "user_id": user_id, "product_id": product.id }, None)
        .await
    {
        Ok(existing) => existing.map(|i| i.quantity).unwrap_or(0),
        Err(e) => {
            errs.insert("_form".into(), format!("db error: {e}"));
            return Err(errs);
        }
    };

    if exceeds_stock(product.stock, in_cart, qty) {
        errs.insert("qty".into(), "Not enough stock.".into());
        return Err(errs);
    }

    let now = Utc::now().timestamp();
    let price = product.effective_price(now);
    let res = items
        .update_one(
            doc! { "user_id": user_id, "product_id": product.id },
            doc! {
                "$inc": { "quantity": qty },
                "$set": { "updated_at": now },
                "$setOnInsert": {
                    "product_name": &product.name,
                    "unit_price": price,
                },
            },
            UpdateOptions::builder().upsert(true).build(),
        )
        .await;

    if let Err(e) = res {
        errs.insert("_form".into(), format!("db error: {e}"));
        return Err(errs);
    }

    Ok(())
}

/// Sets a line's quantity; zero or less removes the line.
pub async fn set_quantity(
    state: &AppState,
    user_id: ObjectId,
    item_id: ObjectId,
    qty: i64,
) -> Result<(), String> {
    let items = state.db.collection::<CartItem>("cart_items");

    if qty <= 0 {
        items
            .delete_one(doc! { "_id": item_id, "user_id": user_id }, None)
            .await
            .map_err(|e| e.to_string())?;
        return Ok(());
    }

    let now = Utc::now().timestamp();
    items
        .update_one(
            doc! { "_id": item_id, "user_id": user_id },
            doc! { "$set": { "quantity": qty, "updated_at": now } },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn remove_item(state: &AppState, user_id: ObjectId, item_id: ObjectId) -> Result<(), String> {
    let items = state.db.collection::<CartItem>("cart_items");
    items
        .delete_one(doc! { "_id": item_id, "user_id": user_id }, None)
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn clear(state: &AppState, user_id: ObjectId) -> Result<(), String> {
    let items = state.db.collection::<CartItem>("cart_items");
    items
        .delete_many(doc! { "user_id": user_id }, None)
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}
