//! Session cart ↔ persistent cart synchronization.

mod common;

use boutique_api::entities::ProductKind;
use boutique_api::pricing::{self, Size};
use boutique_api::services::cart::QuantityChange;
use boutique_api::session_cart::{CartKey, SessionCart, SessionItem};
use common::TestApp;
use rust_decimal_macros::dec;

fn session_line(name: &str, price: rust_decimal::Decimal, quantity: u32, size: Option<Size>) -> SessionItem {
    SessionItem {
        name: name.to_string(),
        price,
        quantity,
        image: "/media/test.jpg".to_string(),
        size,
    }
}

#[tokio::test]
async fn login_merge_is_additive_across_sessions() {
    let app = TestApp::new().await;
    let customer = app.register_customer("merge@example.com").await;
    let product = app.seed_clothing("Floral Dress", dec!(100.00), None).await;

    let key = CartKey::Sized {
        product_id: product.id,
        size: Some(Size::L),
    };
    let price = pricing::unit_price(product.price, Some(Size::L));
    assert_eq!(price, dec!(110.00));

    let mut guest_cart = SessionCart::default();
    guest_cart.add(&key, session_line(&product.title, price, 2, Some(Size::L)));

    let merged = app
        .services
        .carts
        .merge_session_cart(customer.id, &guest_cart)
        .await
        .unwrap();
    assert_eq!(merged, 1);

    // a second login with the same guest cart adds quantities again
    app.services
        .carts
        .merge_session_cart(customer.id, &guest_cart)
        .await
        .unwrap();

    let reloaded = app
        .services
        .carts
        .load_session_cart(customer.id)
        .await
        .unwrap();
    let line = reloaded.get(&key).expect("merged line missing");
    assert_eq!(line.quantity, 4);
    assert_eq!(line.price, dec!(110.00));
    assert_eq!(reloaded.count(), 4);
}

#[tokio::test]
async fn merge_keeps_unsized_kinds() {
    let app = TestApp::new().await;
    let customer = app.register_customer("cosmetic@example.com").await;
    let lipstick = app
        .seed_product(ProductKind::Cosmetic, "Velvet Lipstick", dec!(19.99), None)
        .await;

    let key = CartKey::Unsized {
        kind: ProductKind::Cosmetic,
        item_id: lipstick.id,
    };
    let mut guest_cart = SessionCart::default();
    guest_cart.add(&key, session_line(&lipstick.title, dec!(19.99), 1, None));

    app.services
        .carts
        .merge_session_cart(customer.id, &guest_cart)
        .await
        .unwrap();

    let reloaded = app
        .services
        .carts
        .load_session_cart(customer.id)
        .await
        .unwrap();
    let line = reloaded.get(&key).expect("cosmetic line did not persist");
    assert_eq!(line.quantity, 1);
    assert_eq!(line.price, dec!(19.99));
    assert!(line.size.is_none());
}

#[tokio::test]
async fn merge_overwrites_price_with_latest() {
    let app = TestApp::new().await;
    let customer = app.register_customer("price@example.com").await;
    let product = app.seed_clothing("Silk Top", dec!(40.00), None).await;

    let key = CartKey::Sized {
        product_id: product.id,
        size: Some(Size::M),
    };
    let mut stale = SessionCart::default();
    stale.add(&key, session_line(&product.title, dec!(39.00), 1, Some(Size::M)));
    app.services
        .carts
        .merge_session_cart(customer.id, &stale)
        .await
        .unwrap();

    let mut fresh = SessionCart::default();
    fresh.add(&key, session_line(&product.title, dec!(45.00), 1, Some(Size::M)));
    app.services
        .carts
        .merge_session_cart(customer.id, &fresh)
        .await
        .unwrap();

    let reloaded = app
        .services
        .carts
        .load_session_cart(customer.id)
        .await
        .unwrap();
    let line = reloaded.get(&key).unwrap();
    assert_eq!(line.quantity, 2);
    assert_eq!(line.price, dec!(45.00));
}

#[tokio::test]
async fn distinct_sizes_are_distinct_lines() {
    let app = TestApp::new().await;
    let customer = app.register_customer("sizes@example.com").await;
    let product = app.seed_clothing("Denim Jacket", dec!(80.00), None).await;

    let mut cart = SessionCart::default();
    for size in [Size::S, Size::XL] {
        cart.add(
            &CartKey::Sized {
                product_id: product.id,
                size: Some(size),
            },
            session_line(
                &product.title,
                pricing::unit_price(product.price, Some(size)),
                1,
                Some(size),
            ),
        );
    }
    app.services
        .carts
        .merge_session_cart(customer.id, &cart)
        .await
        .unwrap();

    let reloaded = app
        .services
        .carts
        .load_session_cart(customer.id)
        .await
        .unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.count(), 2);
}

#[tokio::test]
async fn quantity_changes_apply_set_semantics_and_zero_deletes() {
    let app = TestApp::new().await;
    let customer = app.register_customer("update@example.com").await;
    let product = app.seed_clothing("Wrap Skirt", dec!(60.00), None).await;

    let key = CartKey::Sized {
        product_id: product.id,
        size: Some(Size::S),
    };
    let item = session_line(&product.title, dec!(60.00), 1, Some(Size::S));
    app.services
        .carts
        .sync_item(customer.id, &key, &item)
        .await
        .unwrap();

    app.services
        .carts
        .apply_quantity_changes(
            customer.id,
            &[QuantityChange {
                key,
                quantity: 5,
                snapshot: Some(item.clone()),
            }],
        )
        .await
        .unwrap();
    let reloaded = app
        .services
        .carts
        .load_session_cart(customer.id)
        .await
        .unwrap();
    assert_eq!(reloaded.get(&key).unwrap().quantity, 5);

    app.services
        .carts
        .apply_quantity_changes(
            customer.id,
            &[QuantityChange {
                key,
                quantity: 0,
                snapshot: None,
            }],
        )
        .await
        .unwrap();
    let reloaded = app
        .services
        .carts
        .load_session_cart(customer.id)
        .await
        .unwrap();
    assert!(reloaded.is_empty());
}

#[tokio::test]
async fn oversized_session_quantities_clamp_in_the_database() {
    let app = TestApp::new().await;
    let customer = app.register_customer("hoarder@example.com").await;
    let product = app.seed_clothing("Linen Shirt", dec!(30.00), None).await;

    let key = CartKey::Sized {
        product_id: product.id,
        size: Some(Size::M),
    };
    // The quantity column is i32; a session quantity beyond it must not wrap
    // negative, and further merges must not overflow the stored value.
    let item = session_line(&product.title, dec!(35.00), u32::MAX, Some(Size::M));
    let mut cart = SessionCart::default();
    cart.add(&key, item.clone());
    app.services
        .carts
        .merge_session_cart(customer.id, &cart)
        .await
        .unwrap();
    app.services
        .carts
        .sync_item(customer.id, &key, &item)
        .await
        .unwrap();

    let reloaded = app
        .services
        .carts
        .load_session_cart(customer.id)
        .await
        .unwrap();
    assert_eq!(reloaded.get(&key).unwrap().quantity, i32::MAX as u32);
}

#[tokio::test]
async fn remove_item_deletes_only_that_line() {
    let app = TestApp::new().await;
    let customer = app.register_customer("remove@example.com").await;
    let dress = app.seed_clothing("Maxi Dress", dec!(90.00), None).await;
    let bag = app
        .seed_product(ProductKind::Bag, "Leather Tote", dec!(120.00), None)
        .await;

    let dress_key = CartKey::Sized {
        product_id: dress.id,
        size: Some(Size::M),
    };
    let bag_key = CartKey::Unsized {
        kind: ProductKind::Bag,
        item_id: bag.id,
    };
    let mut cart = SessionCart::default();
    cart.add(&dress_key, session_line(&dress.title, dec!(95.00), 1, Some(Size::M)));
    cart.add(&bag_key, session_line(&bag.title, dec!(120.00), 1, None));
    app.services
        .carts
        .merge_session_cart(customer.id, &cart)
        .await
        .unwrap();

    app.services
        .carts
        .remove_item(customer.id, &dress_key)
        .await
        .unwrap();

    let reloaded = app
        .services
        .carts
        .load_session_cart(customer.id)
        .await
        .unwrap();
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.get(&bag_key).is_some());
}
