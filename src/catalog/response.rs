//! Catalog API request and response types.
//!
//! These types model the subset of the parts-search and product-details
//! payloads the validator reads. Every field the catalog may omit or null
//! is optional or defaulted, so a sparse response still deserializes.

use serde::{Deserialize, Serialize};

// ============================================================================
// Keyword search
// ============================================================================

/// Keyword search request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeywordSearchRequest {
    pub keywords: String,
    pub record_count: u32,
    #[serde(rename = "FilterOptionsRequest", skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

/// Optional search filters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchFilters {
    pub manufacturer_filter: Vec<FilterId>,
}

/// A filter value referenced by id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterId {
    pub id: String,
}

impl KeywordSearchRequest {
    /// Build a search for one MPN, optionally restricted to a manufacturer.
    #[must_use]
    pub fn new(keywords: impl Into<String>, record_count: u32, manufacturer_id: Option<&str>) -> Self {
        Self {
            keywords: keywords.into(),
            record_count,
            filters: manufacturer_id.map(|id| SearchFilters {
                manufacturer_filter: vec![FilterId { id: id.to_string() }],
            }),
        }
    }
}

/// Keyword search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeywordSearchResponse {
    /// Entries the catalog considers exact keyword hits
    #[serde(default)]
    pub exact_matches: Vec<ProductEntry>,
    /// General search hits
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

impl KeywordSearchResponse {
    /// Exact matches followed by general matches.
    pub fn entries(&self) -> impl Iterator<Item = &ProductEntry> {
        self.exact_matches.iter().chain(self.products.iter())
    }
}

/// One product in a search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductEntry {
    #[serde(default)]
    pub manufacturer_product_number: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<ManufacturerRef>,
    #[serde(default)]
    pub product_variations: Vec<ProductVariation>,
    #[serde(default)]
    pub category: Option<CategoryNode>,
}

/// Manufacturer reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManufacturerRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One orderable variation (packaging) of a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductVariation {
    /// Distributor part number, used for product-details lookups
    #[serde(default, rename = "DigiKeyProductNumber", alias = "ReferencePartNumber")]
    pub reference_part_number: Option<String>,
    #[serde(default)]
    pub package_type: Option<PackageType>,
}

/// Package type of a variation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageType {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Category node of a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "CategoryId")]
    pub id: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

// ============================================================================
// Product details
// ============================================================================

/// Product-details response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductDetailsResponse {
    #[serde(default)]
    pub product: Option<ProductDetail>,
}

/// Lifecycle-relevant fields of a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductDetail {
    #[serde(default)]
    pub product_status: Option<ProductStatus>,
    #[serde(default)]
    pub end_of_life: Option<bool>,
    #[serde(default)]
    pub discontinued: Option<bool>,
    #[serde(default)]
    pub normally_stocking: Option<bool>,
    #[serde(default)]
    pub date_last_buy_chance: Option<String>,
}

/// Product status wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductStatus {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}
