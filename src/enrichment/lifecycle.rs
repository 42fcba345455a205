//! Lifecycle (end-of-life) enrichment for matched parts.

use crate::catalog::response::ProductDetail;
use crate::catalog::CatalogClient;
use crate::error::OptionContext;
use crate::model::{Lifecycle, ValidationResult};
use std::sync::Arc;

/// What an enrichment attempt did to a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// Lifecycle detail attached
    Enriched,
    /// Nothing to look up (invalid result or no reference part)
    Skipped,
    /// Lookup failed; the result is unchanged
    Failed(String),
}

/// Attaches lifecycle detail to valid results.
///
/// Implementations never fail the result: a lookup error leaves
/// `lifecycle` empty and is reported through [`EnrichOutcome::Failed`].
pub trait LifecycleEnricher: Send + Sync {
    fn enrich(&self, mpn: &str, result: &mut ValidationResult) -> EnrichOutcome;

    /// Name of the data source, for logs.
    fn name(&self) -> &'static str;
}

/// Enricher used when lifecycle lookups are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLifecycleEnricher;

impl LifecycleEnricher for NoOpLifecycleEnricher {
    fn enrich(&self, _mpn: &str, _result: &mut ValidationResult) -> EnrichOutcome {
        EnrichOutcome::Skipped
    }

    fn name(&self) -> &'static str {
        "NoOp"
    }
}

/// Reads lifecycle detail from the catalog's product-details endpoint.
pub struct CatalogLifecycleEnricher {
    client: Arc<CatalogClient>,
}

impl CatalogLifecycleEnricher {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }
}

impl LifecycleEnricher for CatalogLifecycleEnricher {
    fn enrich(&self, mpn: &str, result: &mut ValidationResult) -> EnrichOutcome {
        if !result.valid {
            return EnrichOutcome::Skipped;
        }
        let Some(reference) = result.reference_part_number.clone() else {
            return EnrichOutcome::Skipped;
        };

        let product = self.client.product_details(&reference).and_then(|details| {
            details
                .product
                .context_none(format!("empty product details for {reference}"))
        });
        match product {
            Ok(product) => {
                result.set_lifecycle(lifecycle_from(&product));
                EnrichOutcome::Enriched
            }
            Err(e) => {
                let detail = e.detail();
                tracing::warn!("Lifecycle lookup for {mpn} failed: {detail}");
                EnrichOutcome::Failed(detail)
            }
        }
    }

    fn name(&self) -> &'static str {
        "catalog product details"
    }
}

/// Map catalog product detail onto [`Lifecycle`].
#[must_use]
pub fn lifecycle_from(product: &ProductDetail) -> Lifecycle {
    Lifecycle {
        status: product
            .product_status
            .as_ref()
            .and_then(|s| s.status.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        end_of_life: product.end_of_life.unwrap_or(false),
        discontinued: product.discontinued.unwrap_or(false),
        normally_stocking: product.normally_stocking.unwrap_or(false),
        last_buy_chance: product
            .date_last_buy_chance
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}
