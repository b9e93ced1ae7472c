//! Catalog browsing: listings, filters, detail pricing and collections.

mod common;

use boutique_api::entities::ProductKind;
use boutique_api::errors::ServiceError;
use boutique_api::pricing::Size;
use boutique_api::services::catalog::ShopFilter;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};

#[tokio::test]
async fn shop_listing_filters_by_department_and_brand() {
    let app = TestApp::new().await;
    let women = app.seed_category("women dresses", "women_dresses").await;
    let men = app.seed_category("mens wear", "mens_wear").await;
    app.seed_clothing("Summer Dress", dec!(75.00), Some(women.id))
        .await;
    app.seed_clothing("Linen Shirt", dec!(55.00), Some(men.id))
        .await;

    let listing = app
        .services
        .catalog
        .shop_listing(&ShopFilter {
            dept: "women".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listing.products.len(), 1);
    assert_eq!(listing.products[0].title, "Summer Dress");
    assert_eq!(listing.options.brands, vec!["Zara".to_string()]);
    assert!(!listing.options.price_ranges.is_empty());

    // an unmatched brand filter empties the listing but not the options
    let listing = app
        .services
        .catalog
        .shop_listing(&ShopFilter {
            dept: "women".to_string(),
            brands: vec!["Reformation".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(listing.products.is_empty());
    assert_eq!(listing.options.brands, vec!["Zara".to_string()]);
}

#[tokio::test]
async fn shop_listing_price_range_filter() {
    let app = TestApp::new().await;
    let women = app.seed_category("women tops", "women_tops").await;
    app.seed_clothing("Budget Tee", dec!(25.00), Some(women.id))
        .await;
    app.seed_clothing("Designer Blouse", dec!(180.00), Some(women.id))
        .await;

    let listing = app
        .services
        .catalog
        .shop_listing(&ShopFilter {
            dept: "women".to_string(),
            price_ranges: vec!["0-50".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listing.products.len(), 1);
    assert_eq!(listing.products[0].title, "Budget Tee");
}

#[tokio::test]
async fn shop_listing_collection_filter() {
    let app = TestApp::new().await;
    let women = app.seed_category("women dresses", "women_dresses").await;
    app.seed_clothing("Trend Dress", dec!(70.00), Some(women.id))
        .await;
    let sale = app
        .seed_clothing("Sale Dress", dec!(45.00), Some(women.id))
        .await;
    let mut active: boutique_api::entities::product::ActiveModel = sale.into();
    active.collections = Set(serde_json::json!(["Sale"]));
    active.update(&*app.db).await.unwrap();

    let listing = app
        .services
        .catalog
        .shop_listing(&ShopFilter {
            dept: "women".to_string(),
            collections: vec!["Sale".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listing.products.len(), 1);
    assert_eq!(listing.products[0].title, "Sale Dress");

    let listing = app
        .services
        .catalog
        .shop_listing(&ShopFilter {
            dept: "women".to_string(),
            collections: vec!["Clearance".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(listing.products.is_empty());
}

#[tokio::test]
async fn front_page_section_limits_and_falls_back() {
    let app = TestApp::new().await;
    let women = app.seed_category("women dresses", "women_dresses").await;
    for i in 0..8 {
        app.seed_clothing(&format!("Dress {i}"), dec!(50.00), Some(women.id))
            .await;
    }

    let section = app
        .services
        .catalog
        .front_page_section("women_dresses", 6)
        .await
        .unwrap();
    assert_eq!(section.products.len(), 6);

    // unknown slug falls back to newest clothing instead of an empty section
    let section = app
        .services
        .catalog
        .front_page_section("renamed_section", 6)
        .await
        .unwrap();
    assert_eq!(section.products.len(), 6);
}

#[tokio::test]
async fn product_detail_prices_every_size() {
    let app = TestApp::new().await;
    let product = app.seed_clothing("Pleated Skirt", dec!(100.00), None).await;

    let detail = app.services.catalog.product_detail(product.id).await.unwrap();
    assert_eq!(detail.sizes_with_prices.len(), 5);
    let by_size: Vec<_> = detail
        .sizes_with_prices
        .iter()
        .map(|sp| (sp.size, sp.price))
        .collect();
    assert!(by_size.contains(&(Size::S, dec!(100.00))));
    assert!(by_size.contains(&(Size::L, dec!(110.00))));
    assert!(by_size.contains(&(Size::XXL, dec!(120.00))));

    let err = app.services.catalog.product_detail(9999).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn unsized_detail_has_no_size_table() {
    let app = TestApp::new().await;
    let bag = app
        .seed_product(ProductKind::Bag, "Weekender", dec!(140.00), None)
        .await;
    let detail = app.services.catalog.product_detail(bag.id).await.unwrap();
    assert!(detail.sizes_with_prices.is_empty());
}

#[tokio::test]
async fn collection_groups_by_tag() {
    let app = TestApp::new().await;
    app.seed_product(ProductKind::Jewellery, "Pearl Necklace", dec!(300.00), None)
        .await;
    app.seed_product(ProductKind::Jewellery, "Charm Bracelet", dec!(120.00), None)
        .await;

    let groups = app
        .services
        .catalog
        .collection_groups(ProductKind::Jewellery)
        .await
        .unwrap();
    let trending = groups.get("Trending").expect("Trending group missing");
    assert_eq!(trending.len(), 2);
}

#[tokio::test]
async fn find_item_refuses_kind_mismatch() {
    let app = TestApp::new().await;
    let lipstick = app
        .seed_product(ProductKind::Cosmetic, "Red Lipstick", dec!(18.00), None)
        .await;

    let found = app
        .services
        .catalog
        .find_item(ProductKind::Cosmetic, lipstick.id)
        .await
        .unwrap();
    assert!(found.is_some());

    let wrong = app
        .services
        .catalog
        .find_item(ProductKind::Shoes, lipstick.id)
        .await
        .unwrap();
    assert!(wrong.is_none());
}
