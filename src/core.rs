//! Resources, fields and related-resource resolution.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dehydra::core::fields::{Field, RelatedTarget};
//! use dehydra::core::resolver::RelatedResolver;
//! ```

pub use dehydra_core::*;
