//! ECDSA signature verification (C3).
//!
//! JOSE ECDSA signatures are the raw concatenation `R || S`; OpenSSL's
//! digest-verify API expects the ASN.1 DER `SEQUENCE { INTEGER R, INTEGER S }`
//! encoding instead, so every verification reassembles the signature first.

use openssl::bn::BigNum;
use openssl::ecdsa::EcdsaSig;
use openssl::sign::Verifier;

use crate::jwk::{Algorithm, PublicKey};

/// Split a raw JOSE ECDSA signature into `(R, S)` and DER-encode it.
///
/// Returns `None` if the signature has odd length or either half fails to
/// parse as a big-endian unsigned integer.
fn reassemble_der(raw: &[u8]) -> Option<Vec<u8>> {
    if raw.is_empty() || raw.len() % 2 != 0 {
        return None;
    }
    let half = raw.len() / 2;
    let r = BigNum::from_slice(&raw[..half]).ok()?;
    let s = BigNum::from_slice(&raw[half..]).ok()?;
    let sig = EcdsaSig::from_private_components(r, s).ok()?;
    sig.to_der().ok()
}

/// Verify `signing_input` against `raw_signature` under the algorithm named in
/// the JWT header, using `key`.
///
/// Returns `false` on any mismatch, unsupported algorithm, or internal
/// failure. This function never panics and never logs the inputs.
#[must_use]
pub fn verify(signing_input: &[u8], raw_signature: &[u8], header_alg: &str, key: &PublicKey) -> bool {
    let Some(alg) = Algorithm::from_header(header_alg) else {
        return false;
    };
    if alg != key.alg {
        return false;
    }
    let Some(der) = reassemble_der(raw_signature) else {
        return false;
    };

    let Ok(mut verifier) = Verifier::new(alg.digest(), &key.pkey) else {
        return false;
    };
    if verifier.update(signing_input).is_err() {
        return false;
    }
    verifier.verify(&der).unwrap_or(false)
}
