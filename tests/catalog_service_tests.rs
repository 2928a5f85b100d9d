use mongodb::bson::oid::ObjectId;
use sokoni::models::Product;
use sokoni::services::catalog_service::{validate_product, ProductInput};

fn product(flash_price: Option<f64>, flash_ends_at: Option<i64>) -> Product {
    Product {
        id: ObjectId::new(),
        name: "Kikoi".to_string(),
        description: "Handwoven".to_string(),
        price: 100.0,
        image_url: None,
        category: None,
        stock: 5,
        flash_price,
        flash_ends_at,
        created_at: 0,
    }
}

fn input(flash_price: Option<f64>, flash_ends_at: Option<i64>) -> ProductInput {
    ProductInput {
        name: "Kikoi".to_string(),
        description: "Handwoven".to_string(),
        price: 100.0,
        image_url: String::new(),
        category: String::new(),
        stock: 5,
        flash_price,
        flash_ends_at,
    }
}

#[test]
fn end_time_without_flash_price_is_not_a_live_sale() {
    // A row with only an end time must neither discount nor count as flash.
    let now = 1_000;
    let p = product(None, Some(now + 3_600));
    assert!(!p.flash_active(now));
    assert_eq!(p.effective_price(now), 100.0);
}

#[test]
fn both_flash_fields_make_the_sale_live_until_it_ends() {
    let now = 1_000;
    let p = product(Some(80.0), Some(now + 3_600));
    assert!(p.flash_active(now));
    assert_eq!(p.effective_price(now), 80.0);

    assert!(!p.flash_active(now + 7_200));
    assert_eq!(p.effective_price(now + 7_200), 100.0);
}

#[test]
fn validate_rejects_an_end_time_without_a_flash_price() {
    let errs = validate_product(&input(None, Some(2_000)));
    assert!(errs.contains_key("flash_price"));
}

#[test]
fn validate_rejects_a_flash_price_without_an_end_time() {
    let errs = validate_product(&input(Some(80.0), None));
    assert!(errs.contains_key("flash_ends_at"));
}

#[test]
fn validate_rejects_a_flash_price_at_or_above_the_regular_price() {
    let errs = validate_product(&input(Some(100.0), Some(2_000)));
    assert!(errs.contains_key("flash_price"));
}

#[test]
fn validate_accepts_a_well_formed_flash_sale() {
    assert!(validate_product(&input(Some(80.0), Some(2_000))).is_empty());
    assert!(validate_product(&input(None, None)).is_empty());
}
