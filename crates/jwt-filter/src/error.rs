//! Error types for the JWT filter.

use thiserror::Error;

/// Errors raised synchronously while constructing a filter from configuration.
///
/// These abort startup; they never surface once the filter is serving requests.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("issuer must not be empty")]
    EmptyIssuer,

    #[error("either \"keys\" or \"jwks_api_cluster\"/\"jwks_api_path\" must be configured")]
    NoKeySource,

    #[error("jwks_api_path must not be empty when fetching from jwks_api_cluster")]
    EmptyJwksPath,

    #[error("static key at index {index} failed to import: {source}")]
    StaticKeyImport {
        index: usize,
        #[source]
        source: KeyImportError,
    },

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to construct the JWKS HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Errors importing a single JWK into a usable public-key handle (C2).
#[derive(Error, Debug)]
pub enum KeyImportError {
    #[error("missing \"kid\"")]
    MissingKid,

    #[error("unrecognized or missing \"crv\"")]
    UnsupportedCurve,

    #[error("missing or empty \"x\"/\"y\" coordinate")]
    MissingCoordinate,

    #[error("base64url decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("point construction failed: {0}")]
    OpenSsl(#[from] openssl::error::ErrorStack),
}

/// Errors fetching and parsing a JWKS document from the upstream cluster (C5).
///
/// Always recovered into the refresher's backoff schedule; never propagated
/// to request handling.
#[derive(Error, Debug)]
pub enum JwksFetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned non-2xx status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid JWKS JSON: {0}")]
    Json(#[from] serde_json::Error),
}
