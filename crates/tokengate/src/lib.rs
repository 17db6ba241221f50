//! Tokengate library.
//!
//! Password login that hands out short-lived signed access tokens, and an
//! axum router that gates routes on the roles carried by those tokens.
//! Exposed as a library so the binary and the integration tests build the
//! same application.

pub mod api;
pub mod auth;
pub mod db;
pub mod store;
