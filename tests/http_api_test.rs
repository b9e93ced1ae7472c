//! End-to-end exercises of the HTTP surface: session cookies, the login
//! merge, checkout and the guest/customer boundary.

mod common;

use axum::http::{Method, StatusCode};
use common::{send, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};

fn as_decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("expected a decimal string")
        .parse()
        .expect("expected a decimal string")
}

fn buyer_body() -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "ada@example.com",
        "address": "12 Analytical Row",
        "city": "London",
    })
}

/// Log a registered customer in, carrying forward the guest cookie when the
/// response does not rotate it.
async fn login(router: &axum::Router, email: &str, cookie: Option<&str>) -> String {
    let response = send(
        router,
        Method::POST,
        "/auth/login",
        cookie,
        Some(json!({ "email": email, "password": "correct-horse-battery" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    response
        .cookie
        .or_else(|| cookie.map(str::to_string))
        .expect("login left no session cookie")
}

#[tokio::test]
async fn checkout_leaves_an_empty_cart_behind() {
    let app = TestApp::new().await;
    let router = app.router();
    let dress = app.seed_clothing("Evening Dress", dec!(100.00), None).await;

    let added = send(
        &router,
        Method::POST,
        &format!("/cart/items/product/{}", dress.id),
        None,
        Some(json!({ "size": "L" })),
    )
    .await;
    assert_eq!(added.status, StatusCode::OK);
    let cookie = added.cookie.expect("no session cookie issued");

    app.register_customer("ada@example.com").await;
    let cookie = login(&router, "ada@example.com", Some(&cookie)).await;

    let quote = send(&router, Method::GET, "/checkout", Some(&cookie), None).await;
    assert_eq!(quote.status, StatusCode::OK);
    assert_eq!(as_decimal(quote.field("subtotal")), dec!(110.00));
    assert_eq!(as_decimal(quote.field("total")), dec!(160.00));

    let placed = send(
        &router,
        Method::POST,
        "/checkout",
        Some(&cookie),
        Some(buyer_body()),
    )
    .await;
    assert_eq!(placed.status, StatusCode::OK);
    assert_eq!(as_decimal(placed.field("total")), dec!(160.00));

    // The session cart is empty afterwards, and so is the persistent one
    // behind it.
    let cart = send(&router, Method::GET, "/cart", Some(&cookie), None).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.field("cart_count"), 0);
    assert!(cart.field("items").as_array().unwrap().is_empty());

    let quote = send(&router, Method::GET, "/checkout", Some(&cookie), None).await;
    assert_eq!(quote.status, StatusCode::BAD_REQUEST);
    assert_eq!(*quote.field("error_code"), json!("cart_empty"));
}

#[tokio::test]
async fn placing_an_order_requires_login() {
    let app = TestApp::new().await;
    let router = app.router();

    let response = send(&router, Method::POST, "/checkout", None, Some(buyer_body())).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(*response.field("error_code"), json!("login_required"));
}

#[tokio::test]
async fn wishlist_requires_login() {
    let app = TestApp::new().await;
    let router = app.router();
    let dress = app.seed_clothing("Evening Dress", dec!(100.00), None).await;

    let response = send(
        &router,
        Method::POST,
        &format!("/wishlist/items/product/{}", dress.id),
        None,
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(*response.field("error_code"), json!("login_required"));
}

#[tokio::test]
async fn login_folds_the_guest_cart_into_the_account() {
    let app = TestApp::new().await;
    let router = app.router();
    let dress = app.seed_clothing("Evening Dress", dec!(100.00), None).await;
    let uri = format!("/cart/items/product/{}", dress.id);

    // Two guest adds of the same size accumulate on one line.
    let first = send(&router, Method::POST, &uri, None, Some(json!({ "size": "M" }))).await;
    let cookie = first.cookie.expect("no session cookie issued");
    let second = send(&router, Method::POST, &uri, Some(&cookie), Some(json!({ "size": "M" }))).await;
    assert_eq!(second.field("cart_count"), 2);

    app.register_customer("merge@example.com").await;
    let cookie = login(&router, "merge@example.com", Some(&cookie)).await;

    let cart = send(&router, Method::GET, "/cart", Some(&cookie), None).await;
    assert_eq!(cart.field("cart_count"), 2);
    let lines = cart.field("items").as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
    assert_eq!(as_decimal(&lines[0]["unit_price"]), dec!(105.00));

    // A fresh browser with no cookie sees the merged cart after logging in.
    let fresh = login(&router, "merge@example.com", None).await;
    let cart = send(&router, Method::GET, "/cart", Some(&fresh), None).await;
    assert_eq!(cart.field("cart_count"), 2);
}

#[tokio::test]
async fn cart_detail_reprices_from_the_current_catalog() {
    let app = TestApp::new().await;
    let router = app.router();
    let dress = app.seed_clothing("Evening Dress", dec!(100.00), None).await;
    let uri = format!("/cart/items/product/{}", dress.id);

    let added = send(&router, Method::POST, &uri, None, Some(json!({ "size": "L" }))).await;
    let cookie = added.cookie.clone().expect("no session cookie issued");
    assert_eq!(as_decimal(added.field("total_price")), dec!(110.00));

    let mut active: boutique_api::entities::product::ActiveModel = dress.into();
    active.price = Set(dec!(120.00));
    active.update(&*app.db).await.expect("price update failed");

    let cart = send(&router, Method::GET, "/cart", Some(&cookie), None).await;
    let lines = cart.field("items").as_array().unwrap();
    assert_eq!(as_decimal(&lines[0]["unit_price"]), dec!(130.00));
    assert_eq!(as_decimal(cart.field("total_price")), dec!(130.00));

    // Healing is written back, so the next read matches.
    let again = send(&router, Method::GET, "/cart", Some(&cookie), None).await;
    assert_eq!(as_decimal(again.field("total_price")), dec!(130.00));
}

#[tokio::test]
async fn incrementing_a_full_quantity_does_not_overflow() {
    let app = TestApp::new().await;
    let router = app.router();
    let dress = app.seed_clothing("Evening Dress", dec!(1.00), None).await;
    let uri = format!("/cart/items/product/{}", dress.id);

    let added = send(&router, Method::POST, &uri, None, Some(json!({ "size": "S" }))).await;
    let cookie = added.cookie.clone().expect("no session cookie issued");
    let key = added.field("key").as_str().unwrap().to_string();

    let set_max = send(
        &router,
        Method::PUT,
        "/cart",
        Some(&cookie),
        Some(json!({ key.as_str(): u32::MAX })),
    )
    .await;
    assert_eq!(set_max.status, StatusCode::OK);
    assert_eq!(set_max.field("cart_count"), u32::MAX);

    let bumped = send(
        &router,
        Method::PUT,
        "/cart",
        Some(&cookie),
        Some(json!({ key.as_str(): { "op": "inc" } })),
    )
    .await;
    assert_eq!(bumped.status, StatusCode::OK);
    assert_eq!(bumped.field("cart_count"), u32::MAX);
}
