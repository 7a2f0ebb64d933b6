use std::fs::{self, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use rand::RngCore;

use crate::dirs::ensure_dir_exists;

use super::config::{CodecKind, SessionConfig};
use super::jwt::JwtCodec;
use super::plain::PlainCodec;
use super::{SessionManager, UnionCodec};

pub struct SessionFactory {
    cfg: SessionConfig,
    secret: Option<Vec<u8>>,
}

impl SessionFactory {
    const GENERATED_SECRET_LENGTH: usize = 32;

    pub fn new(cfg: &SessionConfig) -> Result<Self> {
        let secret = match cfg.codec {
            CodecKind::Jwt if !cfg.secret.is_empty() => Some(cfg.secret.as_bytes().to_vec()),
            CodecKind::Jwt => Some(Self::load_secret(&cfg.secret_path)?),
            CodecKind::Plain => None,
        };

        Ok(Self {
            cfg: cfg.clone(),
            secret,
        })
    }

    pub fn build_session_manager(&self) -> Result<SessionManager> {
        let codec = match self.cfg.codec {
            CodecKind::Jwt => {
                let secret = match self.secret {
                    Some(ref secret) => secret,
                    None => bail!("session secret is not loaded"),
                };
                let codec = JwtCodec::new(secret, self.cfg.validity_secs)
                    .context("init jwt session codec")?;
                UnionCodec::Jwt(codec)
            }
            CodecKind::Plain => {
                warn!("Using plain session cookies, roles are NOT signed. DO NOT USE IN PRODUCTION");
                UnionCodec::Plain(PlainCodec::new())
            }
        };

        let mut manager =
            SessionManager::new(codec, self.cfg.validity_secs, &self.cfg.cookie_prefix);
        manager.set_secure_cookie(self.cfg.secure_cookie);

        Ok(manager)
    }

    fn load_secret(path: &str) -> Result<Vec<u8>> {
        match fs::read_to_string(path) {
            Ok(data) => {
                let secret = data.trim();
                if secret.is_empty() {
                    bail!("session secret file '{path}' is empty");
                }
                Ok(secret.as_bytes().to_vec())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("Session secret not found, generating a new one to '{path}'");
                let secret = Self::generate_secret();
                if let Some(dir) = Path::new(path).parent() {
                    ensure_dir_exists(dir).context("ensure session secret dir")?;
                }
                Self::write_secret(path, &secret).context("write session secret")?;
                Ok(secret.into_bytes())
            }
            Err(err) => Err(err).context("read session secret failed"),
        }
    }

    /// The key file is readable by the owner only.
    fn write_secret(path: &str, secret: &str) -> io::Result<()> {
        let mut opts = OpenOptions::new();
        opts.write(true).create_new(true);
        #[cfg(unix)]
        opts.mode(0o600);

        let mut file = opts.open(path)?;
        file.write_all(secret.as_bytes())
    }

    fn generate_secret() -> String {
        let mut buf = [0u8; Self::GENERATED_SECRET_LENGTH];
        rand::thread_rng().fill_bytes(&mut buf);
        buf.iter().map(|b| format!("{b:02x}")).collect()
    }
}
