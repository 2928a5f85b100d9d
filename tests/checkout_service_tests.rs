use mongodb::bson::oid::ObjectId;
use sokoni::models::{CartItem, Coupon};
use sokoni::services::{cart_service, checkout_service};

fn item(name: &str, price: f64, qty: i64) -> CartItem {
    CartItem {
        id: ObjectId::new(),
        user_id: ObjectId::new(),
        product_id: ObjectId::new(),
        product_name: name.to_string(),
        unit_price: price,
        quantity: qty,
        updated_at: 0,
    }
}

fn base_input(method: &str) -> checkout_service::CheckoutInput {
    checkout_service::CheckoutInput {
        payment_method: method.to_string(),
        shipping_address: "Moi Avenue 12, Nairobi".to_string(),
        phone: String::new(),
        tx_reference: String::new(),
        coupon_code: String::new(),
        terms_accepted: true,
    }
}

#[test]
fn subtotal_is_sum_of_price_times_quantity() {
    let items = vec![item("A", 100.0, 2), item("B", 49.5, 3)];
    let s = cart_service::subtotal(&items);
    assert!((s - (200.0 + 148.5)).abs() < 1e-9);
    assert_eq!(cart_service::item_count(&items), 5);
}

#[test]
fn terms_must_be_accepted() {
    let mut input = base_input("cash");
    input.terms_accepted = false;

    let errs = checkout_service::validate(&input);
    assert!(errs.contains_key("terms"));
}

#[test]
fn mpesa_requires_a_valid_kenyan_mobile_number() {
    let mut input = base_input("mpesa");
    input.phone = "12345".to_string();

    let errs = checkout_service::validate(&input);
    assert!(errs.contains_key("phone"));

    input.phone = "0712345678".to_string();
    assert!(checkout_service::validate(&input).is_empty());
}

#[test]
fn phone_pattern_accepts_known_prefixes() {
    assert!(checkout_service::is_valid_mpesa_phone("0712345678"));
    assert!(checkout_service::is_valid_mpesa_phone("0112345678"));
    assert!(checkout_service::is_valid_mpesa_phone("+254712345678"));
    assert!(checkout_service::is_valid_mpesa_phone("254712345678"));

    assert!(!checkout_service::is_valid_mpesa_phone("12345"));
    assert!(!checkout_service::is_valid_mpesa_phone("0812345678"));
    assert!(!checkout_service::is_valid_mpesa_phone("071234567"));
    assert!(!checkout_service::is_valid_mpesa_phone("07123456789"));
}

#[test]
fn crypto_requires_a_transaction_reference() {
    let mut input = base_input("crypto");
    let errs = checkout_service::validate(&input);
    assert!(errs.contains_key("tx_reference"));

    input.tx_reference = "0xabc".to_string();
    assert!(checkout_service::validate(&input).is_empty());
}

#[test]
fn cash_and_paypal_need_no_extra_fields() {
    assert!(checkout_service::validate(&base_input("cash")).is_empty());
    assert!(checkout_service::validate(&base_input("paypal")).is_empty());
}

#[test]
fn unknown_method_and_missing_address_are_rejected() {
    let mut input = base_input("wire");
    input.shipping_address = "  ".to_string();

    let errs = checkout_service::validate(&input);
    assert!(errs.contains_key("payment_method"));
    assert!(errs.contains_key("shipping_address"));
}

#[test]
fn crypto_receiving_address_is_deterministic() {
    let id = ObjectId::new();
    let a = checkout_service::crypto_receiving_address(&id);
    let b = checkout_service::crypto_receiving_address(&id);
    assert_eq!(a, b);
    assert!(a.starts_with("0x"));
    assert_eq!(a.len(), 42);
}

#[test]
fn only_mpesa_and_paypal_call_out_to_the_payments_service() {
    assert!(checkout_service::kickoff_required("mpesa"));
    assert!(checkout_service::kickoff_required("paypal"));

    assert!(!checkout_service::kickoff_required("cash"));
    assert!(!checkout_service::kickoff_required("crypto"));
}

#[test]
fn built_order_snapshots_the_cart_and_fixes_the_total() {
    let user_id = ObjectId::new();
    let cart = vec![item("A", 100.0, 2), item("B", 49.5, 3)];
    let input = base_input("cash");

    let order = checkout_service::build_order(
        user_id,
        &cart,
        &input,
        Some("SAVE10".to_string()),
        34.85,
        1_000,
    );

    assert_eq!(order.user_id, user_id);
    assert_eq!(order.items.len(), 2);
    assert!((order.items_total() - 348.5).abs() < 1e-9);
    assert!((order.total_amount - (348.5 - 34.85)).abs() < 1e-9);
    assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));
    assert_eq!(order.status, "pending");
    assert_eq!(order.payment_status, "pending");
}

#[test]
fn phone_and_reference_are_kept_only_for_the_method_that_uses_them() {
    let cart = vec![item("A", 100.0, 1)];

    let mut input = base_input("mpesa");
    input.phone = "0712345678".to_string();
    input.tx_reference = "stray".to_string();
    let order = checkout_service::build_order(ObjectId::new(), &cart, &input, None, 0.0, 0);
    assert_eq!(order.phone.as_deref(), Some("0712345678"));
    assert_eq!(order.tx_reference, None);

    let mut input = base_input("crypto");
    input.phone = "0712345678".to_string();
    input.tx_reference = "0xabc".to_string();
    let order = checkout_service::build_order(ObjectId::new(), &cart, &input, None, 0.0, 0);
    assert_eq!(order.phone, None);
    assert_eq!(order.tx_reference.as_deref(), Some("0xabc"));
}

#[test]
fn kickoff_failure_points_at_methods_that_actually_exist() {
    let msg = checkout_service::kickoff_failure_message("mpesa", "gateway down");
    assert!(msg.contains("gateway down"));
    assert!(msg.contains("PayPal"));
    assert!(msg.contains("cash on delivery"));
    // No retry flow exists after checkout, so the message must not invent one.
    assert!(!msg.to_lowercase().contains("retry"));
    assert!(!msg.to_lowercase().contains("orders page"));

    let msg = checkout_service::kickoff_failure_message("paypal", "declined");
    assert!(msg.contains("M-Pesa"));
}

#[test]
fn stock_check_counts_what_is_already_in_the_cart() {
    // 5 in the cart plus 5 more against a stock of 6 must be refused.
    assert!(cart_service::exceeds_stock(6, 5, 5));
    assert!(cart_service::exceeds_stock(1, 1, 1));

    assert!(!cart_service::exceeds_stock(6, 0, 5));
    assert!(!cart_service::exceeds_stock(6, 3, 3));
    assert!(!cart_service::exceeds_stock(1, 0, 1));
}

#[test]
fn coupon_discounts_are_clamped_to_the_subtotal() {
    let percent = Coupon {
        id: ObjectId::new(),
        code: "SAVE10".to_string(),
        kind: "percent".to_string(),
        amount: 10.0,
        active: true,
        expires_at: None,
    };
    assert!((percent.discount_for(1000.0) - 100.0).abs() < 1e-9);

    let fixed = Coupon {
        id: ObjectId::new(),
        code: "BIG".to_string(),
        kind: "fixed".to_string(),
        amount: 5000.0,
        active: true,
        expires_at: None,
    };
    assert_eq!(fixed.discount_for(1000.0), 1000.0);
}

#[test]
fn expired_or_inactive_coupons_are_unusable() {
    let mut c = Coupon {
        id: ObjectId::new(),
        code: "OLD".to_string(),
        kind: "percent".to_string(),
        amount: 10.0,
        active: true,
        expires_at: Some(100),
    };
    assert!(!c.usable(200));
    assert!(c.usable(50));

    c.active = false;
    assert!(!c.usable(50));
}
