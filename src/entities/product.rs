use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminant for the single catalog table. The string values are the
/// legacy category tags, which also appear in cart keys and wishlist rows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ProductKind {
    #[sea_orm(string_value = "product")]
    #[serde(rename = "product")]
    Clothing,
    #[sea_orm(string_value = "cosmetic")]
    #[serde(rename = "cosmetic")]
    Cosmetic,
    #[sea_orm(string_value = "jewellery")]
    #[serde(rename = "jewellery")]
    Jewellery,
    #[sea_orm(string_value = "bag")]
    #[serde(rename = "bag")]
    Bag,
    #[sea_orm(string_value = "shoes")]
    #[serde(rename = "shoes")]
    Shoes,
}

impl ProductKind {
    /// The wire tag used in cart keys and URLs.
    pub fn as_tag(&self) -> &'static str {
        match self {
            ProductKind::Clothing => "product",
            ProductKind::Cosmetic => "cosmetic",
            ProductKind::Jewellery => "jewellery",
            ProductKind::Bag => "bag",
            ProductKind::Shoes => "shoes",
        }
    }

    /// Parse a wire tag. `"shoe"` is accepted as a legacy alias for `shoes`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "product" => Some(ProductKind::Clothing),
            "cosmetic" => Some(ProductKind::Cosmetic),
            "jewellery" => Some(ProductKind::Jewellery),
            "bag" => Some(ProductKind::Bag),
            "shoes" | "shoe" => Some(ProductKind::Shoes),
            _ => None,
        }
    }

    /// Only clothing carries garment sizes and size price offsets.
    pub fn is_sized(&self) -> bool {
        matches!(self, ProductKind::Clothing)
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for ProductKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductKind::from_tag(s).ok_or_else(|| format!("unknown product kind: {s}"))
    }
}

/// A catalog item. One table covers all the storefront's product families;
/// `kind` selects the family.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: ProductKind,
    /// Clothing belongs to a category (women/men departments); other kinds
    /// have none.
    #[sea_orm(nullable)]
    pub category_id: Option<i64>,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// JSON array of size codes, e.g. `["S","M","L"]`; empty for unsized kinds.
    pub sizes: Json,
    /// JSON array of color names.
    pub colors: Json,
    #[sea_orm(nullable)]
    pub brand: Option<String>,
    /// JSON array of collection tags ("Trending", "Sale", ...).
    pub collections: Json,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    #[sea_orm(nullable)]
    pub image_url: Option<String>,
    #[sea_orm(nullable)]
    pub hover_image_url: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn string_list(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

impl Model {
    pub fn size_codes(&self) -> Vec<String> {
        string_list(&self.sizes)
    }

    pub fn color_names(&self) -> Vec<String> {
        string_list(&self.colors)
    }

    pub fn collection_tags(&self) -> Vec<String> {
        string_list(&self.collections)
    }

    pub fn in_collection(&self, tag: &str) -> bool {
        self.collection_tags().iter().any(|t| t == tag)
    }
}
