use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CodecError, SessionCodec};

/// Characters left alone by a browser's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Unsigned percent-encoded JSON, the format the dashboard wrote before
/// tokens were signed. Anyone holding the cookie can rewrite its role.
#[derive(Debug, Clone, Default)]
pub struct PlainCodec;

impl PlainCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SessionCodec for PlainCodec {
    fn encode<T: Serialize>(&self, payload: &T) -> Result<String, CodecError> {
        let json = serde_json::to_string(payload).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(utf8_percent_encode(&json, COMPONENT).to_string())
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, CodecError> {
        let json = percent_decode_str(token)
            .decode_utf8()
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::types::role::Role;
    use crate::types::session::Identity;

    use super::*;

    #[test]
    fn test_plain_wire_format() {
        let codec = PlainCodec::new();
        let identity = Identity {
            email: String::from("staff@8718.jp"),
            role: Role::Staff,
            timestamp: 1700000000000,
        };

        let token = codec.encode(&identity).unwrap();
        assert_eq!(
            token,
            "%7B%22email%22%3A%22staff%408718.jp%22%2C%22role%22%3A%22staff%22%2C%22timestamp%22%3A1700000000000%7D"
        );

        let decoded: Identity = codec.decode(&token).unwrap();
        assert_eq!(decoded, identity);
    }

    #[test]
    fn test_plain_reads_browser_cookie() {
        let codec = PlainCodec::new();

        // Already decoded by the cookie parser.
        let raw = r#"{"email":"boss@8718.jp","role":"boss","timestamp":1700000000000}"#;
        let decoded: Identity = codec.decode(raw).unwrap();
        assert_eq!(decoded.role, Role::Boss);

        let result: Result<Identity, CodecError> = codec.decode("%7B%22email");
        assert!(result.is_err());
        let result: Result<Identity, CodecError> = codec.decode("%FF%FE");
        assert!(result.is_err());
    }
}
