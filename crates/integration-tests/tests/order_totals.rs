//! Order totals across cart and checkout surfaces.
//!
//! The same lines and settings must produce the same figures everywhere, so
//! these tests drive the full path: catalog in the cache, cart state
//! machine, pricing engine.

use rust_decimal::Decimal;

use storeloft_catalog::{
    Audience, Cart, CatalogConfig, MemoryOrigin, StorefrontContext, compute_total, zone_for_city,
};
use storeloft_core::{ProductStatus, ShippingZone, StoreId, ZoneId};
use storeloft_integration_tests::{init_tracing, sample_product, sample_store};

#[tokio::test]
async fn cart_to_checkout_totals_match_the_published_figures() {
    init_tracing();
    let origin = MemoryOrigin::new();
    let context = StorefrontContext::attach(&origin, &CatalogConfig::default());

    // 15% tax, 15 default shipping, free shipping from 200 (sample_store).
    context.save_store(&sample_store("store_1", "coffee")).expect("save store");
    context
        .save_product(&sample_product("prod_beans", "store_1", 90, 10))
        .expect("save product");

    let view = context
        .cache()
        .view(&StoreId::new("store_1"), Audience::Customer)
        .expect("view");

    let beans = view
        .products
        .iter()
        .find(|p| p.id.as_str() == "prod_beans")
        .expect("product");
    let mut cart = Cart::new();
    let change = cart.add(beans, 2, None);
    assert!(change.exceeded.is_none());

    let priced = compute_total(cart.lines(), &view.products, &view.store.settings, None);
    assert_eq!(priced.totals.subtotal, Decimal::from(180));
    assert_eq!(priced.totals.tax_amount, Decimal::from(27));
    assert_eq!(priced.totals.shipping_cost, Decimal::from(15));
    assert_eq!(priced.totals.total, Decimal::from(222));
    assert!(priced.is_clean());

    context.dispose();
}

#[tokio::test]
async fn free_shipping_kicks_in_exactly_at_the_threshold() {
    init_tracing();
    let origin = MemoryOrigin::new();
    let context = StorefrontContext::attach(&origin, &CatalogConfig::default());

    context.save_store(&sample_store("store_1", "coffee")).expect("save store");
    context
        .save_product(&sample_product("prod_kit", "store_1", 100, 10))
        .expect("save product");

    let view = context
        .cache()
        .view(&StoreId::new("store_1"), Audience::Customer)
        .expect("view");
    let kit = view.products.first().expect("product");

    let mut cart = Cart::new();
    cart.add(kit, 2, None); // subtotal exactly 200

    let priced = compute_total(cart.lines(), &view.products, &view.store.settings, None);
    assert_eq!(priced.totals.shipping_cost, Decimal::ZERO);

    context.dispose();
}

#[tokio::test]
async fn stock_clamp_reaches_the_priced_quantity() {
    init_tracing();
    let origin = MemoryOrigin::new();
    let context = StorefrontContext::attach(&origin, &CatalogConfig::default());

    context.save_store(&sample_store("store_1", "coffee")).expect("save store");
    context
        .save_product(&sample_product("prod_rare", "store_1", 50, 5))
        .expect("save product");

    let view = context
        .cache()
        .view(&StoreId::new("store_1"), Audience::Customer)
        .expect("view");
    let rare = view.products.first().expect("product");

    let mut cart = Cart::new();
    let change = cart.add(rare, 50, None);
    assert_eq!(change.quantity, 5);
    assert!(change.exceeded.is_some());

    // The priced subtotal reflects the clamped quantity, not the request.
    let priced = compute_total(cart.lines(), &view.products, &view.store.settings, None);
    assert_eq!(priced.totals.subtotal, Decimal::from(250));

    context.dispose();
}

#[tokio::test]
async fn deactivated_product_flags_the_line_without_dropping_it() {
    init_tracing();
    let origin = MemoryOrigin::new();
    let context = StorefrontContext::attach(&origin, &CatalogConfig::default());

    context.save_store(&sample_store("store_1", "coffee")).expect("save store");
    let beans = sample_product("prod_beans", "store_1", 90, 10);
    context.save_product(&beans).expect("save product");

    // Cart filled while the product was active.
    let mut cart = Cart::new();
    cart.add(&beans, 2, None);

    // Merchant deactivates it afterwards.
    let mut retired = beans.clone();
    retired.status = ProductStatus::Inactive;
    context.save_product(&retired).expect("save product");

    let view = context
        .cache()
        .view(&StoreId::new("store_1"), Audience::Merchant)
        .expect("view");
    let priced = compute_total(cart.lines(), &view.products, &view.store.settings, None);

    assert_eq!(priced.totals.subtotal, Decimal::ZERO);
    assert_eq!(priced.stale_lines.len(), 1);
    // The line is still in the cart; cleanup is the surface's call.
    assert_eq!(cart.lines().len(), 1);

    context.dispose();
}

#[tokio::test]
async fn checkout_with_known_city_uses_the_zone_estimate() {
    init_tracing();
    let origin = MemoryOrigin::new();
    let context = StorefrontContext::attach(&origin, &CatalogConfig::default());

    let mut store = sample_store("store_1", "coffee");
    store.settings.shipping.free_shipping_threshold = None;
    store.settings.shipping.zones = vec![ShippingZone {
        id: ZoneId::new("zone_north"),
        cities: vec!["Tangier".to_string()],
        cost: Decimal::from(40),
        estimated_days: 3,
    }];
    context.save_store(&store).expect("save store");
    context
        .save_product(&sample_product("prod_beans", "store_1", 90, 10))
        .expect("save product");

    let view = context
        .cache()
        .view(&StoreId::new("store_1"), Audience::Customer)
        .expect("view");
    let beans = view.products.first().expect("product");

    let mut cart = Cart::new();
    cart.add(beans, 1, None);

    // Cart surface: destination unknown, default cost.
    let cart_total = compute_total(cart.lines(), &view.products, &view.store.settings, None);
    assert_eq!(cart_total.totals.shipping_cost, Decimal::from(15));

    // Checkout: city known, zone cost and estimate apply.
    let checkout_total = compute_total(
        cart.lines(),
        &view.products,
        &view.store.settings,
        Some("Tangier"),
    );
    assert_eq!(checkout_total.totals.shipping_cost, Decimal::from(40));

    let zone = zone_for_city(&view.store.settings, "Tangier").expect("zone");
    assert_eq!(zone.estimated_days, 3);

    context.dispose();
}
