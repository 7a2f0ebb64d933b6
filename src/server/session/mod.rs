pub mod config;
pub mod cookie;
pub mod factory;
pub mod jwt;
pub mod plain;

use actix_web::cookie::Cookie;
use chrono::Utc;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::types::permission::CompactPermissions;
use crate::types::role::Role;
use crate::types::session::Identity;

use self::jwt::JwtCodec;
use self::plain::PlainCodec;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature mismatch")]
    Signature,

    #[error("token expired")]
    Expired,

    #[error("encode token: {0}")]
    Encode(String),
}

/// Turns a claim payload into a cookie-safe string and back.
pub trait SessionCodec {
    fn encode<T: Serialize>(&self, payload: &T) -> Result<String, CodecError>;
    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, CodecError>;
}

pub enum UnionCodec {
    Jwt(JwtCodec),
    Plain(PlainCodec),
}

impl SessionCodec for UnionCodec {
    fn encode<T: Serialize>(&self, payload: &T) -> Result<String, CodecError> {
        match self {
            UnionCodec::Jwt(c) => c.encode(payload),
            UnionCodec::Plain(c) => c.encode(payload),
        }
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, CodecError> {
        match self {
            UnionCodec::Jwt(c) => c.decode(token),
            UnionCodec::Plain(c) => c.decode(token),
        }
    }
}

/// Issues and reads the two cookies the gate depends on: the session
/// identity and the compacted permissions.
///
/// Decoding never fails loudly. A corrupt, forged or expired value is
/// reported as absent, which the gate treats as "not logged in" for the
/// session and "no matrix configured" for the permissions.
pub struct SessionManager {
    codec: UnionCodec,
    validity_secs: u64,

    session_cookie: String,
    permissions_cookie: String,
    secure_cookie: bool,
}

impl SessionManager {
    /// Issue times this far in the future are still accepted.
    const CLOCK_SKEW_MILLIS: i64 = 60 * 1000;

    pub fn new(codec: UnionCodec, validity_secs: u64, cookie_prefix: &str) -> Self {
        Self {
            codec,
            validity_secs,
            session_cookie: format!("{cookie_prefix}_auth"),
            permissions_cookie: format!("{cookie_prefix}_perms"),
            secure_cookie: false,
        }
    }

    pub fn set_secure_cookie(&mut self, secure: bool) {
        self.secure_cookie = secure;
    }

    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    pub fn permissions_cookie(&self) -> &str {
        &self.permissions_cookie
    }

    pub fn validity_secs(&self) -> u64 {
        self.validity_secs
    }

    pub fn build_session_cookie(&self, token: String) -> Cookie<'static> {
        cookie::build_cookie(
            &self.session_cookie,
            token,
            self.validity_secs,
            self.secure_cookie,
        )
    }

    pub fn build_permissions_cookie(&self, token: String) -> Cookie<'static> {
        cookie::build_cookie(
            &self.permissions_cookie,
            token,
            self.validity_secs,
            self.secure_cookie,
        )
    }

    pub fn removal_cookies(&self) -> [Cookie<'static>; 2] {
        [
            cookie::removal_cookie(&self.session_cookie),
            cookie::removal_cookie(&self.permissions_cookie),
        ]
    }

    pub fn encode(&self, email: &str, role: Role) -> Result<String, CodecError> {
        let identity = Identity {
            email: email.to_string(),
            role,
            timestamp: Utc::now().timestamp_millis(),
        };
        self.encode_identity(&identity)
    }

    pub fn encode_identity(&self, identity: &Identity) -> Result<String, CodecError> {
        self.codec.encode(identity)
    }

    pub fn decode(&self, raw: &str) -> Option<Identity> {
        self.decode_at(raw, Utc::now().timestamp_millis())
    }

    pub fn decode_at(&self, raw: &str, now_millis: i64) -> Option<Identity> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let identity: Identity = match self.codec.decode(raw) {
            Ok(identity) => identity,
            Err(e) => {
                debug!("Drop session token: {e}");
                return None;
            }
        };

        if identity.email.is_empty() {
            debug!("Drop session token: empty email");
            return None;
        }

        let validity_millis = (self.validity_secs as i64).saturating_mul(1000);
        if now_millis.saturating_sub(identity.timestamp) >= validity_millis {
            debug!("Drop session token for '{}': expired", identity.email);
            return None;
        }
        if identity.timestamp > now_millis + Self::CLOCK_SKEW_MILLIS {
            debug!("Drop session token for '{}': issued in the future", identity.email);
            return None;
        }

        Some(identity)
    }

    pub fn encode_permissions(&self, perms: &CompactPermissions) -> Result<String, CodecError> {
        self.codec.encode(perms)
    }

    pub fn decode_permissions(&self, raw: &str) -> Option<CompactPermissions> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match self.codec.decode(raw) {
            Ok(perms) => Some(perms),
            Err(e) => {
                debug!("Drop permissions token: {e}");
                None
            }
        }
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let codec = JwtCodec::new(b"petalgate-test-secret-0123456789", 86400).unwrap();
        Self::new(UnionCodec::Jwt(codec), 86400, "8718")
    }

    #[cfg(test)]
    pub fn new_test_plain() -> Self {
        Self::new(UnionCodec::Plain(PlainCodec::new()), 86400, "8718")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_session_tests(manager: &SessionManager) {
        let users = [
            ("boss@8718.jp", Role::Boss),
            ("shop-manager@8718.jp", Role::Manager),
            ("hana@8718.jp", Role::Staff),
            ("admin@8718.jp", Role::Admin),
            ("demo@8718.jp", Role::Demo),
        ];
        for (email, role) in users {
            let token = manager.encode(email, role).unwrap();
            let identity = manager.decode(&token).unwrap();
            assert_eq!(identity.email, email);
            assert_eq!(identity.role, role);
            assert!(identity.timestamp > 0);
        }

        assert!(manager.decode("").is_none());
        assert!(manager.decode("not a token").is_none());
        assert!(manager.decode("%7B%22email%22").is_none());
    }

    #[test]
    fn test_jwt_session() {
        run_session_tests(&SessionManager::new_test());
    }

    #[test]
    fn test_plain_session() {
        run_session_tests(&SessionManager::new_test_plain());
    }

    #[test]
    fn test_session_expiry() {
        let manager = SessionManager::new_test_plain();
        let now = Utc::now().timestamp_millis();
        let identity = Identity {
            email: String::from("staff@8718.jp"),
            role: Role::Staff,
            timestamp: now,
        };
        let token = manager.encode_identity(&identity).unwrap();

        let day = 86400 * 1000;
        assert!(manager.decode_at(&token, now + day - 1).is_some());
        assert!(manager.decode_at(&token, now + day).is_none());
        assert!(manager.decode_at(&token, now - 10 * 60 * 1000).is_none());
    }

    #[test]
    fn test_session_cookie_names() {
        let manager = SessionManager::new_test();
        assert_eq!(manager.session_cookie(), "8718_auth");
        assert_eq!(manager.permissions_cookie(), "8718_perms");
    }

    #[test]
    fn test_permissions_token() {
        let perms = CompactPermissions {
            boss: vec![String::from("/invoice"), String::from("/analytics")],
            manager: vec![String::from("/expenses")],
            staff: vec![],
        };
        for manager in [SessionManager::new_test(), SessionManager::new_test_plain()] {
            let token = manager.encode_permissions(&perms).unwrap();
            assert_eq!(manager.decode_permissions(&token).unwrap(), perms);

            assert!(manager.decode_permissions("{not json").is_none());
            assert!(manager.decode_permissions("").is_none());
        }
    }

    #[test]
    fn test_foreign_signature() {
        let manager = SessionManager::new_test();
        let other = JwtCodec::new(b"another-secret-abcdefghijklmnop", 86400).unwrap();
        let other = SessionManager::new(UnionCodec::Jwt(other), 86400, "8718");

        let token = other.encode("boss@8718.jp", Role::Boss).unwrap();
        assert!(manager.decode(&token).is_none());
    }
}
