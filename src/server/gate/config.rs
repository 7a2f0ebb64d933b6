use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};

/// Navigation gate configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GateConfig {
    /// Where anonymous visitors of protected paths are sent.
    #[serde(default = "GateConfig::default_login_path")]
    pub login_path: String,

    /// Where logged-in users are sent from the login page and from paths
    /// their role may not open.
    #[serde(default = "GateConfig::default_landing_path")]
    pub landing_path: String,

    /// Paths anyone may open.
    #[serde(default = "GateConfig::default_public_paths")]
    pub public_paths: Vec<String>,

    /// Paths that require a session. `/` always does.
    #[serde(default = "GateConfig::default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
}

impl CommonConfig for GateConfig {
    fn default() -> Self {
        Self {
            login_path: Self::default_login_path(),
            landing_path: Self::default_landing_path(),
            public_paths: Self::default_public_paths(),
            protected_prefixes: Self::default_protected_prefixes(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        let paths = [&self.login_path, &self.landing_path]
            .into_iter()
            .chain(self.public_paths.iter())
            .chain(self.protected_prefixes.iter());
        for path in paths {
            if !path.starts_with('/') {
                bail!("gate path '{path}' must start with '/'");
            }
        }

        if self.login_path == self.landing_path {
            bail!("login_path and landing_path cannot be the same");
        }

        Ok(())
    }
}

impl GateConfig {
    pub fn default_login_path() -> String {
        String::from("/login")
    }

    pub fn default_landing_path() -> String {
        String::from("/dashboard")
    }

    pub fn default_public_paths() -> Vec<String> {
        vec![String::from("/login"), String::from("/api/auth")]
    }

    pub fn default_protected_prefixes() -> Vec<String> {
        [
            "/dashboard",
            "/arrivals",
            "/warehouse",
            "/inventory",
            "/supplies",
            "/transfer",
            "/invoice",
            "/expenses",
            "/disposals",
            "/alerts",
            "/settings",
            "/admin",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
}
