use std::collections::HashMap;

use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use mongodb::options::FindOptions;

use crate::{models::Product, AppState};

use super::auth_service::FieldErrors;

pub async fn list_products(state: &AppState, category: Option<&str>) -> Result<Vec<Product>, String> {
    let products = state.db.collection::<Product>("products");

    let filter = match category {
        Some(c) if !c.is_empty() => doc! { "category": c },
        _ => doc! {},
    };

    let opts = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
    let mut cursor = products.find(filter, opts).await.map_err(|e| e.to_string())?;

    let mut out = Vec::new();
    while let Some(item) = cursor.next().await {
        out.push(item.map_err(|e| e.to_string())?);
    }
    Ok(out)
}

pub async fn get_product(state: &AppState, id: ObjectId) -> Result<Option<Product>, String> {
    let products = state.db.collection::<Product>("products");
    products
        .find_one(doc! { "_id": id }, None)
        .await
        .map_err(|e| e.to_string())
}

/// Products with a live flash sale, soonest-ending first.
pub async fn flash_sale_products(state: &AppState, limit: i64) -> Result<Vec<Product>, String> {
    let products = state.db.collection::<Product>("products");
    let now = Utc::now().timestamp();

    let opts = FindOptions::builder()
        .sort(doc! { "flash_ends_at": 1 })
        .limit(limit)
        .build();
    // Both flash fields must be set for the sale to be live; filtering on
    // the end time alone would list full-price rows.
    let mut cursor = products
        .find(
            doc! { "flash_ends_at": { "$gt": now }, "flash_price": { "$ne": null } },
            opts,
        )
        .await
        .map_err(|e| e.to_string())?;

    let mut out = Vec::new();
    while let Some(item) = cursor.next().await {
        out.push(item.map_err(|e| e.to_string())?);
    }
    Ok(out)
}

#[derive(Debug, Default, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub category: String,
    pub stock: i64,
    pub flash_price: Option<f64>,
    pub flash_ends_at: Option<i64>,
}

pub fn validate_product(input: &ProductInput) -> FieldErrors {
    let mut errs: FieldErrors = HashMap::new();

    if input.name.trim().is_empty() {
        errs.insert("name".into(), "Name is required.".into());
    }
    if input.price <= 0.0 || !input.price.is_finite() {
        errs.insert("price".into(), "Enter a valid price.".into());
    }
    if input.stock < 0 {
        errs.insert("stock".into(), "Stock cannot be negative.".into());
    }
    if let Some(fp) = input.flash_price {
        if fp <= 0.0 || fp >= input.price {
            errs.insert("flash_price".into(), "Flash price must be below the regular price.".into());
        }
    }
    if input.flash_ends_at.is_some() && input.flash_price.is_none() {
        errs.insert("flash_price".into(), "A flash end time needs a flash price.".into());
    }
    if input.flash_price.is_some() && input.flash_ends_at.is_none() {
        errs.insert("flash_ends_at".into(), "A flash price needs an end time.".into());
    }

    errs
}

fn opt_f64(v: Option<f64>) -> Bson {
    v.map(Bson::from).unwrap_or(Bson::Null)
}

fn opt_i64(v: Option<i64>) -> Bson {
    v.map(Bson::from).unwrap_or(Bson::Null)
}

pub async fn create_product(state: &AppState, input: &ProductInput) -> Result<ObjectId, String> {
    let now = Utc::now().timestamp();

    let insert = state
        .db
        .collection("products")
        .insert_one(
            doc! {
                "name": input.name.trim(),
                "description": input.description.trim(),
                "price": input.price,
                "image_url": input.image_url.trim(),
                "category": input.category.trim(),
                "stock": input.stock,
                "flash_price": opt_f64(input.flash_price),
                "flash_ends_at": opt_i64(input.flash_ends_at),
                "created_at": now,
            },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

    insert
        .inserted_id
        .as_object_id()
        .ok_or_else(|| "insert returned no id".to_string())
}

pub async fn update_product(state: &AppState, id: ObjectId, input: &ProductInput) -> Result<(), String> {
    let products = state.db.collection::<Product>("products");
    products
        .update_one(
            doc! { "_id": id },
            doc! {
                "$set": {
                    "name": input.name.trim(),
                    "description": input.description.trim(),
                    "price": input.price,
                    "image_url": input.image_url.trim(),
                    "category": input.category.trim(),
                    "stock": input.stock,
                    "flash_price": opt_f64(input.flash_price),
                    "flash_ends_at": opt_i64(input.flash_ends_at),
                }
            },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn delete_product(state: &AppState, id: ObjectId) -> Result<(), String> {
    let products = state.db.collection::<Product>("products");
    products
        .delete_one(doc! { "_id": id }, None)
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}
