use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // users: unique email
    {
        let col = db.collection::<mongodb::bson::Document>("users");
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // users: unique username (register_user checks first; the index closes
    // the race between two concurrent registrations)
    {
        let col = db.collection::<mongodb::bson::Document>("users");
        let model = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let _ = col.create_index(model, None).await;
    }

    // cart_items: unique per (user_id, product_id) — the add-to-cart
    // upsert relies on this to stay race-free.
    {
        let col = db.collection::<mongodb::bson::Document>("cart_items");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "product_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // orders: query by user quickly and sort by created_at desc
    {
        let col = db.collection::<mongodb::bson::Document>("orders");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // payment_transactions: poller fetches the newest row per order
    {
        let col = db.collection::<mongodb::bson::Document>("payment_transactions");
        let model = IndexModel::builder()
            .keys(doc! { "order_id": 1, "created_at": -1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // coupons: unique code
    {
        let col = db.collection::<mongodb::bson::Document>("coupons");
        let model = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let _ = col.create_index(model, None).await;
    }

    // products: category browse
    {
        let col = db.collection::<mongodb::bson::Document>("products");
        let model = IndexModel::builder()
            .keys(doc! { "category": 1, "created_at": -1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
