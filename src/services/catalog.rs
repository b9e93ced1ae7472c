//! Catalog browsing: front page sections, filtered shop listings, product
//! detail and collection groupings.

use crate::entities::{category, product, Category, Product, ProductKind};
use crate::errors::ServiceError;
use crate::pricing::{self, Size};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::instrument;

/// Fallback shown when a catalog row carries no image.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.jpg";

/// Canonical color ordering for the shop filter sidebar.
const COLOR_ORDER: [&str; 12] = [
    "Black",
    "White",
    "Red",
    "Blue",
    "Pink",
    "Green",
    "Orange",
    "Yellow",
    "Grey",
    "Brown",
    "Navy Blue",
    "Other",
];

/// Price-range facets offered in the shop sidebar, $50 steps.
const PRICE_RANGES: [(&str, &str); 5] = [
    ("0-50", "$0 - $50"),
    ("51-100", "$51 - $100"),
    ("101-150", "$101 - $150"),
    ("151-200", "$151 - $200"),
    ("201-500", "$201 - $500"),
];

#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

/// Compact product representation used in listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: i64,
    pub kind: ProductKind,
    pub title: String,
    pub price: Decimal,
    pub price_display: String,
    pub image_url: String,
    pub hover_image_url: String,
    pub brand: Option<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub collections: Vec<String>,
    pub available: bool,
}

impl From<product::Model> for ProductCard {
    fn from(p: product::Model) -> Self {
        let image_url = p
            .image_url
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        let hover_image_url = p.hover_image_url.clone().unwrap_or_else(|| image_url.clone());
        let price = pricing::round_to_cents(p.price);
        ProductCard {
            id: p.id,
            kind: p.kind,
            title: p.title.clone(),
            price,
            price_display: format!("{price:.2}"),
            image_url,
            hover_image_url,
            brand: p.brand.clone(),
            sizes: p.size_codes(),
            colors: p.color_names(),
            collections: p.collection_tags(),
            available: p.available,
        }
    }
}

/// Price per size for the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct SizePrice {
    pub size: Size,
    pub price: Decimal,
    pub price_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub card: ProductCard,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub gallery: Vec<String>,
    /// Every size priced with its surcharge; empty for unsized kinds.
    pub sizes_with_prices: Vec<SizePrice>,
}

/// Selected shop filters. Empty vectors mean "no filter on this facet".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopFilter {
    pub dept: String,
    pub brands: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub collections: Vec<String>,
    pub price_ranges: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceRangeOption {
    pub value: String,
    pub label: String,
}

/// Distinct facet values available for the current department.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub brands: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub collections: Vec<String>,
    pub price_ranges: Vec<PriceRangeOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShopListing {
    pub products: Vec<ProductCard>,
    pub options: FilterOptions,
    pub selected: ShopFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrontPageSection {
    pub slug: String,
    pub products: Vec<ProductCard>,
}

fn parse_price_range(range: &str) -> Option<(Decimal, Decimal)> {
    let (lo, hi) = range.split_once('-')?;
    let lo = lo.trim().parse::<Decimal>().ok()?;
    let hi = hi.trim().parse::<Decimal>().ok()?;
    Some((lo, hi))
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        Ok(Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    /// Newest available clothing for a front-page category slug. An unknown
    /// slug falls back to the newest clothing overall, so the front page
    /// never renders an empty section just because a category was renamed.
    #[instrument(skip(self))]
    pub async fn front_page_section(
        &self,
        slug: &str,
        limit: u64,
    ) -> Result<FrontPageSection, ServiceError> {
        let category = Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?;

        let mut query = Product::find()
            .filter(product::Column::Kind.eq(ProductKind::Clothing))
            .filter(product::Column::Available.eq(true));
        if let Some(cat) = &category {
            query = query.filter(product::Column::CategoryId.eq(cat.id));
        }
        let products = query
            .order_by_desc(product::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db)
            .await?;

        Ok(FrontPageSection {
            slug: slug.to_string(),
            products: products.into_iter().map(ProductCard::from).collect(),
        })
    }

    /// Department shop listing. Brand and price filters run in the database;
    /// size, color and collection filters match against the JSON list fields
    /// in memory. Facet options are built from the whole department so a
    /// narrow filter never hides the other choices.
    #[instrument(skip(self))]
    pub async fn shop_listing(&self, filter: &ShopFilter) -> Result<ShopListing, ServiceError> {
        let dept = filter.dept.to_lowercase();
        let category_ids: Vec<i64> = Category::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .filter(|c| c.name.to_lowercase().starts_with(&dept))
            .map(|c| c.id)
            .collect();

        let dept_products = Product::find()
            .filter(product::Column::Kind.eq(ProductKind::Clothing))
            .filter(product::Column::CategoryId.is_in(category_ids.clone()))
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        let options = build_filter_options(&dept_products);

        let mut query = Product::find()
            .filter(product::Column::Kind.eq(ProductKind::Clothing))
            .filter(product::Column::CategoryId.is_in(category_ids))
            .filter(product::Column::Available.eq(true));
        if !filter.brands.is_empty() {
            query = query.filter(product::Column::Brand.is_in(filter.brands.clone()));
        }
        if !filter.price_ranges.is_empty() {
            let mut cond = Condition::any();
            for range in &filter.price_ranges {
                if let Some((lo, hi)) = parse_price_range(range) {
                    cond = cond.add(product::Column::Price.between(lo, hi));
                }
            }
            query = query.filter(cond);
        }

        let products = query
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?
            .into_iter()
            .filter(|p| {
                let sizes = p.size_codes();
                let colors = p.color_names();
                (filter.sizes.is_empty() || filter.sizes.iter().any(|s| sizes.contains(s)))
                    && (filter.colors.is_empty()
                        || filter.colors.iter().any(|c| colors.contains(c)))
                    && (filter.collections.is_empty()
                        || filter.collections.iter().any(|c| p.in_collection(c)))
            })
            .map(ProductCard::from)
            .collect();

        Ok(ShopListing {
            products,
            options,
            selected: filter.clone(),
        })
    }

    /// Detail page data; sized kinds get the full per-size price table.
    #[instrument(skip(self))]
    pub async fn product_detail(&self, id: i64) -> Result<ProductDetail, ServiceError> {
        let product = Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {id}")))?;

        let sizes_with_prices = if product.kind.is_sized() {
            Size::ALL
                .iter()
                .map(|&size| {
                    let price = pricing::unit_price(product.price, Some(size));
                    SizePrice {
                        size,
                        price,
                        price_display: format!("{price:.2}"),
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut gallery = Vec::new();
        if let Some(url) = &product.image_url {
            gallery.push(url.clone());
        }
        if let Some(url) = &product.hover_image_url {
            gallery.push(url.clone());
        }

        let slug = product.slug.clone();
        let description = product.description.clone();
        let category_id = product.category_id;
        Ok(ProductDetail {
            card: ProductCard::from(product),
            slug,
            description,
            category_id,
            gallery,
            sizes_with_prices,
        })
    }

    /// One catalog item of a specific kind; `None` on a kind mismatch so a
    /// cosmetic id cannot resolve through a bag URL.
    pub async fn find_item(
        &self,
        kind: ProductKind,
        id: i64,
    ) -> Result<Option<product::Model>, ServiceError> {
        Ok(Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .filter(|p| p.kind == kind))
    }

    pub async fn get_item(
        &self,
        kind: ProductKind,
        id: i64,
    ) -> Result<product::Model, ServiceError> {
        self.find_item(kind, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("{} {id}", kind.as_tag())))
    }

    /// Items of a kind grouped by their collection tags, for the family
    /// landing pages (cosmetics, jewellery, bags, shoes).
    #[instrument(skip(self))]
    pub async fn collection_groups(
        &self,
        kind: ProductKind,
    ) -> Result<BTreeMap<String, Vec<ProductCard>>, ServiceError> {
        let items = Product::find()
            .filter(product::Column::Kind.eq(kind))
            .filter(product::Column::Available.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut groups: BTreeMap<String, Vec<ProductCard>> = BTreeMap::new();
        for item in items {
            for tag in item.collection_tags() {
                groups
                    .entry(tag)
                    .or_default()
                    .push(ProductCard::from(item.clone()));
            }
        }
        Ok(groups)
    }
}

fn build_filter_options(products: &[product::Model]) -> FilterOptions {
    let mut brands = BTreeSet::new();
    let mut sizes = BTreeSet::new();
    let mut colors = BTreeSet::new();
    let mut collections = BTreeSet::new();
    for p in products {
        if let Some(brand) = &p.brand {
            brands.insert(brand.clone());
        }
        sizes.extend(p.size_codes());
        colors.extend(p.color_names());
        collections.extend(p.collection_tags());
    }

    // sizes in garment order, colors in sidebar order
    let ordered_sizes = Size::ALL
        .iter()
        .map(|s| s.to_string())
        .filter(|s| sizes.contains(s))
        .collect();
    let ordered_colors = COLOR_ORDER
        .iter()
        .map(|c| c.to_string())
        .filter(|c| colors.contains(c))
        .collect();

    FilterOptions {
        brands: brands.into_iter().collect(),
        sizes: ordered_sizes,
        colors: ordered_colors,
        collections: collections.into_iter().collect(),
        price_ranges: PRICE_RANGES
            .iter()
            .map(|(value, label)| PriceRangeOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_range_parsing() {
        assert_eq!(parse_price_range("0-50"), Some((dec!(0), dec!(50))));
        assert_eq!(parse_price_range("51-100"), Some((dec!(51), dec!(100))));
        assert_eq!(parse_price_range("cheap"), None);
        assert_eq!(parse_price_range("10-"), None);
    }
}
