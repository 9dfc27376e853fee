//! Verification pipeline (C6): parse → issuer → audience → temporal → key
//! lookup → signature, collapsed into a single classified `VerifyStatus`.

use serde_json::Value;

use crate::clock::Clock;
use crate::config::FilterConfig;
use crate::jwt::{self, Jwt};
use crate::sig;
use crate::store::Snapshot;

/// Mutually exclusive, exhaustive verification outcomes (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyStatus {
    Success,
    NotPresent,
    Malformed,
    IssuerMismatch,
    AudienceMismatch,
    NotBefore,
    Expired,
    NoValidators,
    InvalidSignature,
    FailUnknown,
}

impl VerifyStatus {
    /// The ASCII wire name used as the 401 response body (§6).
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::NotPresent => "JWT_VERIFY_FAIL_NOT_PRESENT",
            Self::Malformed => "JWT_VERIFY_FAIL_MALFORMED",
            Self::IssuerMismatch => "JWT_VERIFY_FAIL_ISSUER_MISMATCH",
            Self::AudienceMismatch => "JWT_VERIFY_FAIL_AUDIENCE_MISMATCH",
            Self::NotBefore => "JWT_VERIFY_FAIL_NOT_BEFORE",
            Self::Expired => "JWT_VERIFY_FAIL_EXPIRED",
            Self::NoValidators => "JWT_VERIFY_FAIL_NO_VALIDATORS",
            Self::InvalidSignature => "JWT_VERIFY_FAIL_INVALID_SIGNATURE",
            Self::FailUnknown => "JWT_VERIFY_FAIL_UNKNOWN",
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Run the full pipeline for one request.
///
/// `header_value` is the raw `Authenticated-User-Jwt` header value, if
/// present, exactly as received (no trimming, no `Bearer` stripping).
#[must_use]
pub fn verify(
    header_value: Option<&str>,
    snapshot: &Snapshot,
    cfg: &FilterConfig,
    clock: &dyn Clock,
) -> VerifyStatus {
    let Some(raw) = header_value else {
        return VerifyStatus::NotPresent;
    };

    let jwt = jwt::decode(raw);
    if !jwt.parsed {
        return VerifyStatus::Malformed;
    }

    if let Some(status) = check_issuer(&jwt, cfg) {
        return status;
    }
    if let Some(status) = check_audience(&jwt, cfg) {
        return status;
    }
    if let Some(status) = check_not_before(&jwt, clock) {
        return status;
    }
    if let Some(status) = check_expiry(&jwt, clock) {
        return status;
    }

    let Some(kid) = jwt.kid() else {
        return VerifyStatus::NoValidators;
    };
    let Some(key) = snapshot.lookup(kid) else {
        return VerifyStatus::NoValidators;
    };

    let Some(alg) = jwt.alg() else {
        return VerifyStatus::InvalidSignature;
    };

    if sig::verify(&jwt.signing_input(), &jwt.signature, alg, key) {
        VerifyStatus::Success
    } else {
        VerifyStatus::InvalidSignature
    }
}

fn check_issuer(jwt: &Jwt, cfg: &FilterConfig) -> Option<VerifyStatus> {
    let iss = jwt.payload.get("iss").and_then(Value::as_str);
    match iss {
        Some(iss) if iss == cfg.allowed_issuer => None,
        _ => Some(VerifyStatus::IssuerMismatch),
    }
}

fn check_audience(jwt: &Jwt, cfg: &FilterConfig) -> Option<VerifyStatus> {
    let token_aud: Vec<&str> = match jwt.payload.get("aud") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => return Some(VerifyStatus::AudienceMismatch),
    };

    let satisfied = cfg
        .allowed_audiences
        .iter()
        .any(|allowed| token_aud.contains(&allowed.as_str()));

    if satisfied { None } else { Some(VerifyStatus::AudienceMismatch) }
}

/// Truncate an integer-or-float numeric claim to whole seconds.
fn truncated_seconds(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    value.as_f64().map(f64::trunc).map(|f| f as i64)
}

fn check_not_before(jwt: &Jwt, clock: &dyn Clock) -> Option<VerifyStatus> {
    let Some(raw) = jwt.payload.get("nbf") else {
        return None;
    };
    let Some(nbf) = truncated_seconds(raw) else {
        return Some(VerifyStatus::NotBefore);
    };
    if nbf < 0 || clock.now_unix() < nbf {
        return Some(VerifyStatus::NotBefore);
    }
    None
}

fn check_expiry(jwt: &Jwt, clock: &dyn Clock) -> Option<VerifyStatus> {
    let Some(raw) = jwt.payload.get("exp") else {
        return None;
    };
    let Some(exp) = truncated_seconds(raw) else {
        return Some(VerifyStatus::Expired);
    };
    if exp < 0 || clock.now_unix() > exp {
        return Some(VerifyStatus::Expired);
    }
    None
}
