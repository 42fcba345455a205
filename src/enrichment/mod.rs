//! Enrichment of validated parts with catalog metadata.
//!
//! Enrichment runs only for valid matches and never changes a verdict:
//! a failed lookup is logged and the result is kept without the extra data.

mod lifecycle;

pub use lifecycle::{
    lifecycle_from, CatalogLifecycleEnricher, EnrichOutcome, LifecycleEnricher,
    NoOpLifecycleEnricher,
};
