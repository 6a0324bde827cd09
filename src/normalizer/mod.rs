//! Param normalizer
//!
//! Coerces a flat record of request params to the types a schema declares
//! and reports every problem found along the way.
//!
//! # Design Principles
//!
//! - `normalize` is pure: no I/O, no logging, no shared state
//! - Never fails: problems are collected, not raised
//! - Ordered: coercion errors in input order, then required-field errors in
//!   schema order
//!
//! ```ignore
//! use paramnorm::normalizer::{normalize, FieldDef, FieldType, Schema};
//!
//! let schema = Schema::new()
//!     .field("name", FieldDef::required(FieldType::String))
//!     .field("price", FieldDef::required(FieldType::Number));
//!
//! let result = normalize(&body, &schema);
//! if !result.validated.status() {
//!     eprintln!("{}", result.validated.message());
//! }
//! ```

mod errors;
mod loader;
mod normalize;
mod types;
mod value;

pub use errors::{ParamError, Validation};
pub use loader::{SchemaError, SchemaLoader, SchemaResult};
pub use normalize::{normalize, normalize_values, Normalized, ProcessedParams};
pub use types::{FieldDef, FieldType, Schema};
pub use value::{is_empty_like, ParamValue};
