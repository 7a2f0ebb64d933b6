use anyhow::{bail, Result};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{CodecError, SessionCodec};

/// JWT issuer identifier
const ISSUER: &str = "petalgate/session";

/// Registered claims wrapped around the payload. The payload fields are
/// flattened into the token body so the JSON shape of the session stays
/// `{email, role, timestamp, ...}`.
#[derive(Serialize)]
struct SignedClaims<'a, T> {
    #[serde(flatten)]
    payload: &'a T,

    iat: u64,
    exp: u64,
    iss: &'static str,
}

/// HS256 signed tokens. The role claim cannot be edited by the client
/// without invalidating the signature.
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity_secs: u64,
}

impl JwtCodec {
    const MIN_SECRET_LENGTH: usize = 16;

    pub fn new(secret: &[u8], validity_secs: u64) -> Result<Self> {
        if secret.len() < Self::MIN_SECRET_LENGTH {
            bail!(
                "session secret must be at least {} bytes",
                Self::MIN_SECRET_LENGTH
            );
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validity_secs,
        })
    }
}

impl SessionCodec for JwtCodec {
    fn encode<T: Serialize>(&self, payload: &T) -> Result<String, CodecError> {
        let now = Utc::now().timestamp() as u64;
        let claims = SignedClaims {
            payload,
            iat: now,
            exp: now + self.validity_secs,
            iss: ISSUER,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, CodecError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);

        match decode::<T>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(CodecError::Expired),
                ErrorKind::InvalidSignature => Err(CodecError::Signature),
                _ => Err(CodecError::Malformed(e.to_string())),
            },
        }
    }
}
