use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    #[serde(rename = "jwt")]
    Jwt,
    #[serde(rename = "plain")]
    Plain,
}

/// Session cookie configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Token format. `jwt` signs the claims with `secret`; `plain` writes
    /// unsigned percent-encoded JSON and must only be used in development.
    #[serde(default = "SessionConfig::default_codec")]
    pub codec: CodecKind,

    /// HMAC secret for `jwt`. When empty, the secret is read from
    /// `secret_path`, and generated there if the file does not exist.
    #[serde(default = "SessionConfig::default_secret")]
    pub secret: String,

    /// Default: {config_path}/pki/session.key
    #[serde(default = "SessionConfig::default_secret_path")]
    pub secret_path: String,

    /// Absolute lifetime of both cookies, in seconds. Sessions are not
    /// renewed on activity.
    #[serde(default = "SessionConfig::default_validity_secs")]
    pub validity_secs: u64,

    /// Cookies are named `{prefix}_auth` and `{prefix}_perms`.
    #[serde(default = "SessionConfig::default_cookie_prefix")]
    pub cookie_prefix: String,

    /// Mark cookies `Secure`. Enable when serving behind TLS.
    #[serde(default = "SessionConfig::default_secure_cookie")]
    pub secure_cookie: bool,
}

impl CommonConfig for SessionConfig {
    fn default() -> Self {
        Self {
            codec: Self::default_codec(),
            secret: Self::default_secret(),
            secret_path: Self::default_secret_path(),
            validity_secs: Self::default_validity_secs(),
            cookie_prefix: Self::default_cookie_prefix(),
            secure_cookie: Self::default_secure_cookie(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if self.validity_secs < Self::MIN_VALIDITY_SECS
            || self.validity_secs > Self::MAX_VALIDITY_SECS
        {
            bail!(
                "validity_secs must be in range [{}, {}]",
                Self::MIN_VALIDITY_SECS,
                Self::MAX_VALIDITY_SECS
            );
        }

        if self.cookie_prefix.is_empty() {
            bail!("cookie_prefix cannot be empty");
        }
        if !self
            .cookie_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            bail!("cookie_prefix may only contain ascii letters, digits, '-' and '_'");
        }

        self.secret = expandenv("secret", &self.secret)?;
        self.secret_path = expandenv("secret_path", &self.secret_path)?;
        if self.secret_path.is_empty() {
            let path = ps.pki_path.join("session.key");
            self.secret_path = format!("{}", path.display());
        }

        Ok(())
    }
}

impl SessionConfig {
    const MIN_VALIDITY_SECS: u64 = 60;
    const MAX_VALIDITY_SECS: u64 = 60 * 60 * 24 * 7;

    pub fn default_codec() -> CodecKind {
        CodecKind::Jwt
    }

    pub fn default_secret() -> String {
        String::new()
    }

    pub fn default_secret_path() -> String {
        String::new()
    }

    pub fn default_validity_secs() -> u64 {
        60 * 60 * 24 // 24 hours
    }

    pub fn default_cookie_prefix() -> String {
        String::from("8718")
    }

    pub fn default_secure_cookie() -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config() {
        let dir = tempfile::tempdir().unwrap();
        let ps = PathSet::new_test(dir.path());

        let mut cfg = SessionConfig::default();
        cfg.complete(&ps).unwrap();
        assert_eq!(cfg.validity_secs, 86400);
        assert!(cfg.secret_path.ends_with("session.key"));

        let mut cfg = SessionConfig::default();
        cfg.validity_secs = 10;
        assert!(cfg.complete(&ps).is_err());

        let mut cfg = SessionConfig::default();
        cfg.cookie_prefix = String::from("bad prefix;");
        assert!(cfg.complete(&ps).is_err());

        let cfg: SessionConfig = toml::from_str(r#"codec = "plain""#).unwrap();
        assert_eq!(cfg.codec, CodecKind::Plain);
        assert_eq!(cfg.cookie_prefix, "8718");
    }
}
