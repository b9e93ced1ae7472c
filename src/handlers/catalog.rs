//! Catalog browsing endpoints.

use super::common::{map_service_error, success_response};
use crate::entities::ProductKind;
use crate::errors::ApiError;
use crate::services::catalog::ShopFilter;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Front-page category slugs, rendered in this order.
const FRONT_PAGE_SECTIONS: [&str; 4] = [
    "women_dresses",
    "mens_wear",
    "women_featured_collection",
    "men_featured_collection",
];
const FRONT_PAGE_SECTION_LIMIT: u64 = 6;

pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/storefront", get(storefront))
        .route("/categories", get(list_categories))
        .route("/products", get(shop_listing))
        .route("/products/:id", get(product_detail))
        .route("/collections/:kind", get(collection_groups))
}

async fn storefront(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let categories = state
        .services
        .catalog
        .list_categories()
        .await
        .map_err(map_service_error)?;

    let mut sections = Vec::with_capacity(FRONT_PAGE_SECTIONS.len());
    for slug in FRONT_PAGE_SECTIONS {
        sections.push(
            state
                .services
                .catalog
                .front_page_section(slug, FRONT_PAGE_SECTION_LIMIT)
                .await
                .map_err(map_service_error)?,
        );
    }

    Ok(success_response(json!({
        "categories": categories,
        "sections": sections,
    })))
}

async fn list_categories(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let categories = state
        .services
        .catalog
        .list_categories()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({ "categories": categories })))
}

/// Shop listing query. Multi-valued facets are comma-separated
/// (`?brand=Zara,Reformation&size=S,M`).
#[derive(Debug, Deserialize)]
struct ShopQuery {
    dept: Option<String>,
    brand: Option<String>,
    size: Option<String>,
    color: Option<String>,
    collection: Option<String>,
    price: Option<String>,
}

fn split_csv(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

async fn shop_listing(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShopQuery>,
) -> Result<Response, ApiError> {
    let dept = query.dept.unwrap_or_else(|| "women".to_string());
    if dept != "women" && dept != "men" {
        return Err(ApiError::bad_request(format!("Unknown department: {dept}")));
    }
    let filter = ShopFilter {
        dept,
        brands: split_csv(query.brand),
        sizes: split_csv(query.size),
        colors: split_csv(query.color),
        collections: split_csv(query.collection),
        price_ranges: split_csv(query.price),
    };
    let listing = state
        .services
        .catalog
        .shop_listing(&filter)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(listing))
}

async fn product_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let detail = state
        .services
        .catalog
        .product_detail(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

async fn collection_groups(
    State(state): State<Arc<AppState>>,
    Path(kind_tag): Path<String>,
) -> Result<Response, ApiError> {
    let kind = ProductKind::from_tag(&kind_tag)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown product kind: {kind_tag}")))?;
    let groups = state
        .services
        .catalog
        .collection_groups(kind)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(json!({
        "kind": kind,
        "collections": groups,
    })))
}
