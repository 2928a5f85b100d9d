use mongodb::bson::oid::ObjectId;
use sokoni::models::{Order, PaymentTransaction};
use sokoni::services::order_service::{
    fulfilment_transition_allowed, resolve_payment_state, PaymentState,
};

fn tx(status: &str, verification: &str) -> PaymentTransaction {
    PaymentTransaction {
        id: ObjectId::new(),
        order_id: ObjectId::new(),
        amount: 100.0,
        currency: "KES".to_string(),
        method_code: "mpesa_stk".to_string(),
        status: status.to_string(),
        verification_status: verification.to_string(),
        external_reference: None,
        created_at: 0,
    }
}

fn order(method: &str, payment_status: &str) -> Order {
    Order {
        id: ObjectId::new(),
        user_id: ObjectId::new(),
        items: vec![],
        total_amount: 100.0,
        currency: "KES".to_string(),
        payment_method: method.to_string(),
        status: "pending".to_string(),
        payment_status: payment_status.to_string(),
        shipping_address: "Nairobi".to_string(),
        phone: None,
        tx_reference: None,
        coupon_code: None,
        discount: 0.0,
        created_at: 0,
    }
}

#[test]
fn pending_transaction_stays_pending() {
    let t = tx("pending", "unverified");
    assert_eq!(resolve_payment_state(Some(&t), "pending"), PaymentState::Pending);
}

#[test]
fn completed_and_verified_transaction_means_paid() {
    // The tick after the provider finishes, the poller sees paid.
    let t = tx("completed", "verified");
    assert_eq!(resolve_payment_state(Some(&t), "pending"), PaymentState::Paid);
}

#[test]
fn completed_but_unverified_falls_back_to_the_order_field() {
    let t = tx("completed", "unverified");
    assert_eq!(resolve_payment_state(Some(&t), "pending"), PaymentState::Pending);
    assert_eq!(resolve_payment_state(Some(&t), "paid"), PaymentState::Paid);
}

#[test]
fn failed_transaction_means_failed() {
    let t = tx("failed", "unverified");
    assert_eq!(resolve_payment_state(Some(&t), "pending"), PaymentState::Failed);
}

#[test]
fn no_transaction_uses_the_order_payment_status() {
    assert_eq!(resolve_payment_state(None, "pending"), PaymentState::Pending);
    assert_eq!(resolve_payment_state(None, "paid"), PaymentState::Paid);
    assert_eq!(resolve_payment_state(None, "failed"), PaymentState::Failed);
}

#[test]
fn only_async_methods_poll() {
    assert!(order("mpesa", "pending").needs_payment_poll());
    assert!(order("crypto", "pending").needs_payment_poll());
    assert!(!order("cash", "pending").needs_payment_poll());
    assert!(!order("paypal", "pending").needs_payment_poll());
}

#[test]
fn fulfilment_only_moves_forward() {
    assert!(fulfilment_transition_allowed("pending", "processing"));
    assert!(fulfilment_transition_allowed("processing", "shipped"));
    assert!(fulfilment_transition_allowed("shipped", "delivered"));
    assert!(fulfilment_transition_allowed("pending", "cancelled"));
    assert!(fulfilment_transition_allowed("processing", "cancelled"));

    assert!(!fulfilment_transition_allowed("shipped", "cancelled"));
    assert!(!fulfilment_transition_allowed("delivered", "pending"));
    assert!(!fulfilment_transition_allowed("pending", "delivered"));
    assert!(!fulfilment_transition_allowed("cancelled", "processing"));
}

#[test]
fn order_total_matches_item_totals_at_creation() {
    let mut o = order("cash", "pending");
    o.items = vec![
        sokoni::models::OrderItem {
            product_id: ObjectId::new(),
            product_name: "A".to_string(),
            quantity: 2,
            unit_price: 30.0,
            total_price: 60.0,
        },
        sokoni::models::OrderItem {
            product_id: ObjectId::new(),
            product_name: "B".to_string(),
            quantity: 1,
            unit_price: 40.0,
            total_price: 40.0,
        },
    ];
    o.total_amount = 100.0;
    assert!((o.items_total() - o.total_amount).abs() < 1e-9);
}
