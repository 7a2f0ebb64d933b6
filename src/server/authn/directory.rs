use std::collections::HashSet;

use crate::types::role::Role;

use super::config::AuthnConfig;

/// Assigns a role to an email address at login.
pub struct RoleDirectory {
    admin: HashSet<String>,
    boss: HashSet<String>,
    manager: HashSet<String>,
    manager_suffix: String,
    demo: HashSet<String>,
    store: HashSet<String>,
}

impl RoleDirectory {
    pub fn new(cfg: &AuthnConfig) -> Self {
        Self {
            admin: Self::normalize_set(&cfg.admin_emails),
            boss: Self::normalize_set(&cfg.boss_emails),
            manager: Self::normalize_set(&cfg.manager_emails),
            manager_suffix: cfg.manager_suffix.trim().to_lowercase(),
            demo: Self::normalize_set(&cfg.demo_emails),
            store: Self::normalize_set(&cfg.store_emails),
        }
    }

    pub fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn normalize_set(emails: &HashSet<String>) -> HashSet<String> {
        emails.iter().map(|e| Self::normalize(e)).collect()
    }

    /// Rules are checked in order: admin list, boss list, manager list or
    /// suffix, demo list, store list. Everyone else is staff.
    pub fn infer(&self, email: &str) -> Role {
        let email = Self::normalize(email);

        if self.admin.contains(&email) {
            return Role::Admin;
        }
        if self.boss.contains(&email) {
            return Role::Boss;
        }
        if self.manager.contains(&email) || self.has_manager_suffix(&email) {
            return Role::Manager;
        }
        if self.demo.contains(&email) {
            return Role::Demo;
        }
        if self.store.contains(&email) {
            return Role::Store;
        }

        Role::Staff
    }

    fn has_manager_suffix(&self, email: &str) -> bool {
        if self.manager_suffix.is_empty() {
            return false;
        }
        match email.split_once('@') {
            Some((local, _)) => local.ends_with(&self.manager_suffix),
            None => false,
        }
    }
}
