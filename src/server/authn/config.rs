use std::collections::HashSet;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

/// Login and API authentication configuration.
///
/// Roles are assigned on the server at login from the email address; the
/// lists below are matched case-insensitively against the trimmed address.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthnConfig {
    #[serde(default = "AuthnConfig::default_admin_emails")]
    pub admin_emails: HashSet<String>,

    #[serde(default = "AuthnConfig::default_boss_emails")]
    pub boss_emails: HashSet<String>,

    #[serde(default = "AuthnConfig::default_manager_emails")]
    pub manager_emails: HashSet<String>,

    /// Addresses whose local part ends with this suffix log in as manager,
    /// e.g. `toyohira-manager@8718.jp`. Empty disables the rule.
    #[serde(default = "AuthnConfig::default_manager_suffix")]
    pub manager_suffix: String,

    #[serde(default)]
    pub demo_emails: HashSet<String>,

    #[serde(default)]
    pub store_emails: HashSet<String>,

    /// Password required for admin login. Empty disables admin login.
    #[serde(default = "AuthnConfig::default_admin_password")]
    pub admin_password: String,

    /// Client IPs admin may log in and act from, `*` for any.
    #[serde(default = "AuthnConfig::default_admin_allow_list")]
    pub admin_allow_list: HashSet<String>,
}

impl CommonConfig for AuthnConfig {
    fn default() -> Self {
        Self {
            admin_emails: Self::default_admin_emails(),
            boss_emails: Self::default_boss_emails(),
            manager_emails: Self::default_manager_emails(),
            manager_suffix: Self::default_manager_suffix(),
            demo_emails: HashSet::new(),
            store_emails: HashSet::new(),
            admin_password: Self::default_admin_password(),
            admin_allow_list: Self::default_admin_allow_list(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        self.admin_password = expandenv("admin_password", &self.admin_password)?;

        for email in self
            .admin_emails
            .iter()
            .chain(self.boss_emails.iter())
            .chain(self.manager_emails.iter())
            .chain(self.demo_emails.iter())
            .chain(self.store_emails.iter())
        {
            if !email.contains('@') {
                bail!("invalid email '{email}' in role lists");
            }
        }

        if self.manager_suffix.contains('@') {
            bail!("manager_suffix cannot contain '@'");
        }

        Ok(())
    }
}

impl AuthnConfig {
    pub fn default_admin_emails() -> HashSet<String> {
        [String::from("admin@8718.jp")].into_iter().collect()
    }

    pub fn default_boss_emails() -> HashSet<String> {
        [
            String::from("boss@8718.jp"),
            String::from("hanaichiya@8718.jp"),
        ]
        .into_iter()
        .collect()
    }

    pub fn default_manager_emails() -> HashSet<String> {
        [String::from("manager@8718.jp"), String::from("410@8718.jp")]
            .into_iter()
            .collect()
    }

    pub fn default_manager_suffix() -> String {
        String::from("-manager")
    }

    pub fn default_admin_password() -> String {
        String::from("admin")
    }

    pub fn default_admin_allow_list() -> HashSet<String> {
        vec![String::from("127.0.0.1")].into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authn_config() {
        let dir = tempfile::tempdir().unwrap();
        let ps = PathSet::new_test(dir.path());

        let mut cfg = AuthnConfig::default();
        cfg.complete(&ps).unwrap();
        assert!(cfg.admin_emails.contains("admin@8718.jp"));

        let toml_str = r#"
            boss_emails = ["owner"]
        "#;
        let mut cfg: AuthnConfig = toml::from_str(toml_str).unwrap();
        assert!(cfg.complete(&ps).is_err());

        let toml_str = r#"
            store_emails = ["shop1@8718.jp"]
            admin_password = ""
        "#;
        let mut cfg: AuthnConfig = toml::from_str(toml_str).unwrap();
        cfg.complete(&ps).unwrap();
        assert!(cfg.admin_password.is_empty());
        assert_eq!(cfg.manager_suffix, "-manager");
    }
}
