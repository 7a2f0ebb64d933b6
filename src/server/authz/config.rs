use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};
use crate::types::permission::FeatureRoute;

use super::registry::FeatureRegistry;

/// Authorization related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthzConfig {
    /// Features the permission matrix can control, each bound to the path
    /// prefix it governs. Paths not covered here are uncontrolled and open to
    /// every logged-in role.
    #[serde(default = "AuthzConfig::default_features")]
    pub features: Vec<FeatureRoute>,

    /// Paths reachable by admin only. The matrix never applies to them.
    #[serde(default = "AuthzConfig::default_admin_paths")]
    pub admin_paths: Vec<String>,

    /// Where the matrix is persisted.
    /// Default: {data_path}/permissions.json
    #[serde(default = "AuthzConfig::default_matrix_file")]
    pub matrix_file: String,
}

impl CommonConfig for AuthzConfig {
    fn default() -> Self {
        Self {
            features: Self::default_features(),
            admin_paths: Self::default_admin_paths(),
            matrix_file: Self::default_matrix_file(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        FeatureRegistry::new(self.features.clone(), self.admin_paths.clone())
            .context("validate features")?;

        self.matrix_file = expandenv("matrix_file", &self.matrix_file)?;
        if self.matrix_file.is_empty() {
            let path = ps.data_path.join("permissions.json");
            self.matrix_file = format!("{}", path.display());
        }

        Ok(())
    }
}

impl AuthzConfig {
    pub fn build_registry(&self) -> Result<FeatureRegistry> {
        let registry = FeatureRegistry::new(self.features.clone(), self.admin_paths.clone())?;
        Ok(registry)
    }

    pub fn default_features() -> Vec<FeatureRoute> {
        [
            ("dashboard", "Dashboard", "/dashboard"),
            ("arrivals", "Arrivals", "/arrivals"),
            ("bucket-paper", "Cup printing", "/bucket-paper"),
            ("transfer-entry", "Flower take-out entry", "/transfer-entry"),
            ("supply-transfers", "Supply take-out entry", "/supply-transfers"),
            ("warehouse", "Warehouse inventory", "/warehouse"),
            ("disposals", "Disposals and loss", "/disposals"),
            ("expenses", "Expense entry", "/expenses"),
            ("invoice", "Sales invoices", "/invoice"),
            ("analytics", "Analytics and reports", "/analytics"),
            ("master-data", "Master data", "/settings"),
            ("user-management", "User management", "/admin/permissions"),
            ("system-settings", "System settings", "/system-settings"),
        ]
        .into_iter()
        .map(|(id, label, path)| FeatureRoute {
            id: String::from(id),
            label: String::from(label),
            path: String::from(path),
        })
        .collect()
    }

    pub fn default_admin_paths() -> Vec<String> {
        vec![String::from("/settings"), String::from("/admin")]
    }

    pub fn default_matrix_file() -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authz_config() {
        let dir = tempfile::tempdir().unwrap();
        let ps = PathSet::new_test(dir.path());

        let mut cfg = AuthzConfig::default();
        cfg.complete(&ps).unwrap();
        assert!(cfg.matrix_file.ends_with("permissions.json"));
        assert_eq!(cfg.features.len(), 13);

        let toml_str = r#"
            admin_paths = ["/admin"]

            [[features]]
            id = "invoice"
            label = "Invoices"
            path = "/invoice"

            [[features]]
            id = "invoice-copy"
            label = "Invoices again"
            path = "/invoice"
        "#;
        let mut cfg: AuthzConfig = toml::from_str(toml_str).unwrap();
        assert!(cfg.complete(&ps).is_err());
    }
}
