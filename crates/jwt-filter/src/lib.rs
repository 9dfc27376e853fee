//! An HTTP request filter that authenticates requests by verifying an
//! ECDSA-signed JWT presented in the `Authenticated-User-Jwt` header.
//!
//! On success the request is forwarded to the host unchanged; on failure the
//! filter answers `401` with the specific verification failure reason. See
//! [`filter::JwtAuthFilter`] for the entry point hosts embed against.

pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod jwk;
pub mod jwt;
pub mod metrics;
pub mod refresher;
pub mod sig;
pub mod store;
pub mod verify;

pub use config::FilterConfig;
pub use filter::{FilterResponse, FilterResult, HeaderMap, JwtAuthFilter, RequestFilter};
pub use verify::VerifyStatus;
