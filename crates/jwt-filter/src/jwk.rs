//! EC JWK import (C2): turn a `kty=EC` JWK JSON object into a usable public key.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use openssl::bn::{BigNum, BigNumContext};
use openssl::ec::{EcGroup, EcKey, EcPoint};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Public};
use serde_json::Value;

use crate::error::KeyImportError;

/// Algorithms recognized by the signature verifier (C3); also recorded on the
/// imported key so a token can't present `alg` inconsistent with the key's
/// curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Es256,
    Es384,
    Es512,
}

impl Algorithm {
    #[must_use]
    pub fn from_header(alg: &str) -> Option<Self> {
        match alg {
            "ES256" => Some(Self::Es256),
            "ES384" => Some(Self::Es384),
            "ES512" => Some(Self::Es512),
            _ => None,
        }
    }

    #[must_use]
    pub fn digest(self) -> MessageDigest {
        match self {
            Self::Es256 => MessageDigest::sha256(),
            Self::Es384 => MessageDigest::sha384(),
            Self::Es512 => MessageDigest::sha512(),
        }
    }

    fn curve_nid(self) -> Nid {
        match self {
            Self::Es256 => Nid::X9_62_PRIME256V1,
            Self::Es384 => Nid::SECP384R1,
            Self::Es512 => Nid::SECP521R1,
        }
    }
}

/// An opaque handle to an imported EC public key. Identified externally by
/// `kid`; no `Eq`/`Hash` is defined on the key itself.
#[derive(Clone)]
pub struct PublicKey {
    pub(crate) pkey: PKey<Public>,
    pub(crate) alg: Algorithm,
}

/// Import a JWK JSON object (`kty=EC`) into a `(kid, PublicKey)` pair.
pub fn import(jwk: &Value) -> Result<(String, PublicKey), KeyImportError> {
    let kid = jwk
        .get("kid")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(KeyImportError::MissingKid)?;

    let crv = jwk.get("crv").and_then(Value::as_str).unwrap_or("");
    let alg = match crv {
        "P-256" => Algorithm::Es256,
        "P-384" => Algorithm::Es384,
        "P-521" => Algorithm::Es512,
        _ => return Err(KeyImportError::UnsupportedCurve),
    };

    let x = jwk
        .get("x")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(KeyImportError::MissingCoordinate)?;
    let y = jwk
        .get("y")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(KeyImportError::MissingCoordinate)?;

    let x_bytes = URL_SAFE_NO_PAD.decode(x)?;
    let y_bytes = URL_SAFE_NO_PAD.decode(y)?;

    let group = EcGroup::from_curve_name(alg.curve_nid())?;
    let x_num = BigNum::from_slice(&x_bytes)?;
    let y_num = BigNum::from_slice(&y_bytes)?;
    let mut ctx = BigNumContext::new()?;
    let mut point = EcPoint::new(&group)?;
    point.set_affine_coordinates_gfp(&group, &x_num, &y_num, &mut ctx)?;

    let ec_key = EcKey::from_public_key(&group, &point)?;
    let pkey = PKey::from_ec_key(ec_key)?;

    Ok((kid.to_string(), PublicKey { pkey, alg }))
}
