//! Part-number matching.
//!
//! - [`normalize`]: canonical lookup key for a raw MPN
//! - [`package_label`] / [`annotate`]: compact package labels for suggestions
//! - [`evaluate`]: strict match verdict over a catalog search response

mod engine;
mod normalize;
mod package;

pub use engine::{
    collect_candidates, evaluate, extract_category, select_reference_part, Candidate,
    MatchOutcome,
};
pub use normalize::{normalize, same_part, VENDOR_SUFFIXES};
pub use package::{annotate, package_label};
