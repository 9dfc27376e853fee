//! Compact-JWS decoding (C1).
//!
//! Decoding never fails loudly: any malformed input simply produces a `Jwt`
//! with `parsed = false`, which downstream checks treat as `MALFORMED`.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

/// An immutable parsed (or rejected) token.
#[derive(Debug, Clone)]
pub struct Jwt {
    pub header_raw: String,
    pub payload_raw: String,
    pub header: Value,
    pub payload: Value,
    pub signature: Vec<u8>,
    pub parsed: bool,
}

impl Jwt {
    fn malformed() -> Self {
        Self {
            header_raw: String::new(),
            payload_raw: String::new(),
            header: Value::Null,
            payload: Value::Null,
            signature: Vec::new(),
            parsed: false,
        }
    }

    /// The bytes that were signed: `header_raw + "." + payload_raw`, byte-exact.
    #[must_use]
    pub fn signing_input(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header_raw.len() + 1 + self.payload_raw.len());
        out.extend_from_slice(self.header_raw.as_bytes());
        out.push(b'.');
        out.extend_from_slice(self.payload_raw.as_bytes());
        out
    }

    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.header.get("alg")?.as_str()
    }

    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.header.get("kid")?.as_str()
    }
}

/// Decode a compact JWS (`header.payload.signature`) byte-for-byte, per §4.1.
///
/// No whitespace trimming and no `Bearer` stripping happen here or anywhere
/// upstream of this call; the raw header value is the input.
#[must_use]
pub fn decode(raw: &str) -> Jwt {
    let segments: Vec<&str> = raw.split('.').collect();
    let [header_raw, payload_raw, sig_raw] = segments.as_slice() else {
        return Jwt::malformed();
    };

    let Some(header) = decode_json_segment(header_raw) else {
        return Jwt::malformed();
    };
    let Some(payload) = decode_json_segment(payload_raw) else {
        return Jwt::malformed();
    };

    let Ok(signature) = URL_SAFE_NO_PAD.decode(sig_raw) else {
        return Jwt::malformed();
    };
    if signature.is_empty() {
        return Jwt::malformed();
    }

    Jwt {
        header_raw: (*header_raw).to_string(),
        payload_raw: (*payload_raw).to_string(),
        header,
        payload,
        signature,
        parsed: true,
    }
}

fn decode_json_segment(segment: &str) -> Option<Value> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&bytes).ok()
}
