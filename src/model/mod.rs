//! Data model shared by every stage of the validation pipeline.
//!
//! A [`ValidationResult`] is the only record a caller ever sees. It is
//! scoped by [`Locale`] so that results fetched for one site, language or
//! currency never leak into another.

mod locale;
mod result;

pub use locale::*;
pub use result::*;
