use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();

    // Layout + pages
    hb.register_template_file("layouts/base", "templates/layouts/base.hbs")
        .expect("template layouts/base");

    hb.register_template_file("pages/home", "templates/pages/home.hbs")
        .expect("template pages/home");
    hb.register_template_file("pages/not_found", "templates/pages/not_found.hbs")
        .expect("template pages/not_found");
    hb.register_template_file("pages/login", "templates/pages/login.hbs")
        .expect("template pages/login");
    hb.register_template_file("pages/register", "templates/pages/register.hbs")
        .expect("template pages/register");

    hb.register_template_file("pages/products", "templates/pages/products.hbs")
        .expect("template pages/products");
    hb.register_template_file("pages/product_detail", "templates/pages/product_detail.hbs")
        .expect("template pages/product_detail");
    hb.register_template_file("pages/cart", "templates/pages/cart.hbs")
        .expect("template pages/cart");
    hb.register_template_file("pages/checkout", "templates/pages/checkout.hbs")
        .expect("template pages/checkout");
    hb.register_template_file("pages/orders", "templates/pages/orders.hbs")
        .expect("template pages/orders");
    hb.register_template_file("pages/confirmation", "templates/pages/confirmation.hbs")
        .expect("template pages/confirmation");

    hb.register_template_file("pages/admin_products", "templates/pages/admin_products.hbs")
        .expect("template pages/admin_products");
    hb.register_template_file("pages/admin_orders", "templates/pages/admin_orders.hbs")
        .expect("template pages/admin_orders");

    // Partial endpoints (HTMX swaps)
    hb.register_template_file("partials/cart_items", "templates/partials/cart_items.hbs")
        .expect("template partials/cart_items");
    hb.register_template_file("partials/payment_status", "templates/partials/payment_status.hbs")
        .expect("template partials/payment_status");

    // cart_items doubles as an inline partial on the cart page
    let cart_items = std::fs::read_to_string("templates/partials/cart_items.hbs")
        .expect("partials/cart_items.hbs");
    hb.register_partial("cart_items", cart_items)
        .expect("register cart_items partial");

    let navbar = std::fs::read_to_string("templates/partials/navbar.hbs")
        .expect("partials/navbar.hbs");
    hb.register_partial("navbar", navbar).expect("register navbar partial");

    let footer = std::fs::read_to_string("templates/partials/footer.hbs")
        .expect("partials/footer.hbs");
    hb.register_partial("footer", footer).expect("register footer partial");

    Arc::new(hb)
}
