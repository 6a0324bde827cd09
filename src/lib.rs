//! paramnorm - schema-driven request parameter normalization
//!
//! Loosely typed request params (often strings) are coerced into the types a
//! schema declares, and every problem is collected into one validation result.
//! The HTTP layer turns a failed validation into a 400 response.

pub mod cli;
pub mod http_server;
pub mod normalizer;
pub mod observability;
