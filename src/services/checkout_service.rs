use std::collections::HashMap;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;
use regex::Regex;

use crate::{
    models::{CartItem, Coupon, Order, OrderItem},
    AppState,
};

use super::{auth_service::FieldErrors, cart_service};

pub const METHODS: [&str; 4] = ["mpesa", "paypal", "cash", "crypto"];

#[derive(Debug, Default, Clone)]
pub struct CheckoutInput {
    pub payment_method: String,
    pub shipping_address: String,
    pub phone: String,
    pub tx_reference: String,
    pub coupon_code: String,
    pub terms_accepted: bool,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: ObjectId,
    pub payment_method: String,
    pub total: f64,
    pub currency: String,
    pub phone: Option<String>,
    // Crypto orders: placeholder address shown on the confirmation page.
    pub receiving_address: Option<String>,
    // PayPal orders: where to send the buyer.
    pub approval_url: Option<String>,
}

/// Safaricom-style numbers: +254 / 254 / 0 prefix followed by a 7xx or
/// 1xx mobile block.
pub fn is_valid_mpesa_phone(phone: &str) -> bool {
    let re = Regex::new(r"^(?:\+254|254|0)(?:7|1)\d{8}$").unwrap();
    re.is_match(phone.trim())
}

/// Local validation only; nothing is written until this passes.
pub fn validate(input: &CheckoutInput) -> FieldErrors {
    let mut errs: FieldErrors = HashMap::new();

    if !input.terms_accepted {
        errs.insert("terms".into(), "You must accept the terms to place an order.".into());
    }

    if !METHODS.contains(&input.payment_method.as_str()) {
        errs.insert("payment_method".into(), "Choose a payment method.".into());
    }

    if input.shipping_address.trim().is_empty() {
        errs.insert("shipping_address".into(), "Shipping address is required.".into());
    }

    match input.payment_method.as_str() {
        "mpesa" => {
            if !is_valid_mpesa_phone(&input.phone) {
                errs.insert("phone".into(), "Enter a valid M-Pesa phone number.".into());
            }
        }
        "crypto" => {
            if input.tx_reference.trim().is_empty() {
                errs.insert("tx_reference".into(), "Transaction reference is required.".into());
            }
        }
        _ => {}
    }

    errs
}

/// Deterministic placeholder receiving address derived from the order id.
pub fn crypto_receiving_address(order_id: &ObjectId) -> String {
    format!("0x{:0<40}", order_id.to_hex())
}

/// Methods that invoke the external payments collaborator at checkout.
/// Cash and crypto never leave the app.
pub fn kickoff_required(method: &str) -> bool {
    matches!(method, "mpesa" | "paypal")
}

/// Shown when the external kickoff fails: the order is already saved and
/// pending, so the message names the methods that still work.
pub fn kickoff_failure_message(method: &str, err: &str) -> String {
    let alternatives = match method {
        "mpesa" => "PayPal or cash on delivery",
        _ => "M-Pesa or cash on delivery",
    };
    format!(
        "Payment could not be started: {err}. Your order was saved and stays pending; \
         alternatively, {alternatives} are available at checkout."
    )
}

pub async fn find_coupon(state: &AppState, code: &str) -> Result<Option<Coupon>, String> {
    let coupons = state.db.collection::<Coupon>("coupons");
    coupons
        .find_one(doc! { "code": code }, None)
        .await
        .map_err(|e| e.to_string())
}

fn build_order_items(items: &[CartItem]) -> Vec<OrderItem> {
    items
        .iter()
        .map(|i| OrderItem {
            product_id: i.product_id,
            product_name: i.product_name.clone(),
            quantity: i.quantity,
            unit_price: i.unit_price,
            total_price: i.unit_price * (i.quantity as f64),
        })
        .collect()
}

/// Snapshots the cart into a pending order. Pure: the total is fixed here
/// as item totals minus the discount and is never recomputed later.
pub fn build_order(
    user_id: ObjectId,
    cart: &[CartItem],
    input: &CheckoutInput,
    coupon_code: Option<String>,
    discount: f64,
    now: i64,
) -> Order {
    let items = build_order_items(cart);
    let total = cart_service::subtotal(cart) - discount;

    Order {
        id: ObjectId::new(),
        user_id,
        items,
        total_amount: total,
        currency: "KES".to_string(),
        payment_method: input.payment_method.clone(),
        status: "pending".to_string(),
        payment_status: "pending".to_string(),
        shipping_address: input.shipping_address.trim().to_string(),
        phone: match input.payment_method.as_str() {
            "mpesa" => Some(input.phone.trim().to_string()),
            _ => None,
        },
        tx_reference: match input.payment_method.as_str() {
            "crypto" => Some(input.tx_reference.trim().to_string()),
            _ => None,
        },
        coupon_code,
        discount,
        created_at: now,
    }
}

/// The checkout orchestrator: validate, snapshot the cart into an order
/// (one insert, items embedded), clear the cart, then kick off the chosen
/// payment path. A payment kickoff failure leaves the order pending; the
/// buyer is told which other methods still work.
pub async fn place_order(
    state: &AppState,
    user_id: ObjectId,
    input: &CheckoutInput,
) -> Result<PlacedOrder, FieldErrors> {
    let mut errs = validate(input);
    if !errs.is_empty() {
        return Err(errs);
    }

    let cart = match cart_service::list_items(state, user_id).await {
        Ok(c) => c,
        Err(e) => {
            errs.insert("_form".into(), format!("db error: {e}"));
            return Err(errs);
        }
    };

    if cart.is_empty() {
        errs.insert("_form".into(), "Your cart is empty.".into());
        return Err(errs);
    }

    let now = Utc::now().timestamp();
    let subtotal = cart_service::subtotal(&cart);

    // Coupon is optional; a bad code blocks the order rather than being
    // silently ignored.
    let mut discount = 0.0;
    let mut coupon_code = None;
    let code = input.coupon_code.trim().to_uppercase();
    if !code.is_empty() {
        match find_coupon(state, &code).await {
            Ok(Some(c)) if c.usable(now) => {
                discount = c.discount_for(subtotal);
                coupon_code = Some(code);
            }
            Ok(_) => {
                errs.insert("coupon_code".into(), "This coupon is not valid.".into());
                return Err(errs);
            }
            Err(e) => {
                errs.insert("_form".into(), format!("db error: {e}"));
                return Err(errs);
            }
        }
    }

    let order = build_order(user_id, &cart, input, coupon_code, discount, now);
    let total = order.total_amount;

    // Order + items are one document, so this insert is atomic.
    let orders = state.db.collection::<Order>("orders");
    if let Err(e) = orders.insert_one(&order, None).await {
        errs.insert("_form".into(), format!("Could not place the order: {e}"));
        return Err(errs);
    }

    if let Err(e) = cart_service::clear(state, user_id).await {
        // The order exists; a stale cart is recoverable, so log and move on.
        tracing::warn!("cart clear after order {} failed: {e}", order.id.to_hex());
    }

    let mut placed = PlacedOrder {
        order_id: order.id,
        payment_method: order.payment_method.clone(),
        total,
        currency: order.currency.clone(),
        phone: order.phone.clone(),
        receiving_address: None,
        approval_url: None,
    };

    if kickoff_required(&order.payment_method) {
        match order.payment_method.as_str() {
            "mpesa" => {
                let phone = order.phone.as_deref().unwrap_or_default();
                if let Err(e) = state
                    .payments
                    .mpesa_push(phone, total, &order.id.to_hex())
                    .await
                {
                    errs.insert("_form".into(), kickoff_failure_message("mpesa", &e));
                    return Err(errs);
                }
            }
            _ => {
                match state
                    .payments
                    .paypal_create(&order.id.to_hex(), total, &order.currency)
                    .await
                {
                    Ok(url) => placed.approval_url = Some(url),
                    Err(e) => {
                        errs.insert("_form".into(), kickoff_failure_message("paypal", &e));
                        return Err(errs);
                    }
                }
            }
        }
    } else if order.payment_method == "crypto" {
        placed.receiving_address = Some(crypto_receiving_address(&order.id));
    }
    // cash: nothing to kick off

    Ok(placed)
}
