use std::sync::Arc;

use crate::types::permission::{CompactPermissions, NavItem, PermissionMatrix};
use crate::types::role::Role;

use super::registry::FeatureRegistry;

/// Whether an admin has configured the matrix yet. Until then every
/// logged-in role may use every feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixState {
    Unconfigured,
    Configured(PermissionMatrix),
}

impl MatrixState {
    pub fn matrix(&self) -> Option<&PermissionMatrix> {
        match self {
            MatrixState::Unconfigured => None,
            MatrixState::Configured(matrix) => Some(matrix),
        }
    }
}

/// Answers feature and path questions against a matrix snapshot.
pub struct Resolver {
    registry: Arc<FeatureRegistry>,
}

impl Resolver {
    pub fn new(registry: Arc<FeatureRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn is_feature_allowed(&self, role: Role, feature: &str, state: &MatrixState) -> bool {
        if role.is_admin() {
            return true;
        }

        let matrix = match state {
            MatrixState::Unconfigured => return true,
            MatrixState::Configured(matrix) => matrix,
        };

        match matrix.row(feature) {
            Some(row) => row.allows(role),
            // An incomplete matrix must not lock anyone out.
            None => true,
        }
    }

    pub fn is_path_allowed(&self, role: Role, path: &str, state: &MatrixState) -> bool {
        if role.is_admin() {
            return true;
        }
        if self.registry.is_admin_path(path) {
            return false;
        }

        match self.registry.resolve(path) {
            Some(feature) => self.is_feature_allowed(role, &feature.id, state),
            None => true,
        }
    }

    /// Converts the row-oriented matrix into role-keyed path lists. Rows for
    /// features without a registered path are dropped.
    pub fn compact(&self, matrix: &PermissionMatrix) -> CompactPermissions {
        let mut compact = CompactPermissions::default();
        for row in matrix.rows.iter() {
            let path = match self.registry.path_for(&row.feature) {
                Some(path) => path.to_string(),
                None => continue,
            };
            if row.boss {
                compact.boss.push(path.clone());
            }
            if row.manager {
                compact.manager.push(path.clone());
            }
            if row.staff {
                compact.staff.push(path);
            }
        }
        compact
    }

    /// Registered features `role` may open, in registry order.
    pub fn nav_items(&self, role: Role, state: &MatrixState) -> Vec<NavItem> {
        self.registry
            .features()
            .iter()
            .filter(|f| self.is_path_allowed(role, &f.path, state))
            .map(|f| NavItem {
                label: f.label.clone(),
                path: f.path.clone(),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        Self::new(Arc::new(FeatureRegistry::new_test()))
    }
}

#[cfg(test)]
mod tests {
    use crate::types::permission::{FeatureRoute, PermissionRow};

    use super::*;

    const NON_ADMIN: [Role; 6] = [
        Role::Boss,
        Role::Manager,
        Role::Staff,
        Role::Demo,
        Role::Store,
        Role::Unknown,
    ];

    fn row(feature: &str, boss: bool, manager: bool, staff: bool) -> PermissionRow {
        PermissionRow {
            feature: feature.to_string(),
            boss,
            manager,
            staff,
        }
    }

    fn configured(rows: Vec<PermissionRow>) -> MatrixState {
        MatrixState::Configured(PermissionMatrix::new(rows))
    }

    #[test]
    fn test_admin_paths_denied() {
        let resolver = Resolver::new_test();
        let states = [
            MatrixState::Unconfigured,
            configured(vec![row("master-data", true, true, true)]),
        ];

        for state in states.iter() {
            for path in ["/settings", "/settings/items", "/admin", "/admin/permissions"] {
                for role in NON_ADMIN {
                    assert!(
                        !resolver.is_path_allowed(role, path, state),
                        "{role} should not reach {path}"
                    );
                }
                assert!(resolver.is_path_allowed(Role::Admin, path, state));
            }
        }
    }

    #[test]
    fn test_unconfigured_allows_features() {
        let resolver = Resolver::new_test();
        let state = MatrixState::Unconfigured;

        for role in [Role::Boss, Role::Manager, Role::Staff, Role::Demo] {
            for feature in resolver.registry().features() {
                assert!(resolver.is_feature_allowed(role, &feature.id, &state));
                assert!(resolver.is_path_allowed(role, "/invoice/2024", &state));
            }
            assert!(resolver.is_feature_allowed(role, "not-registered", &state));
        }
    }

    #[test]
    fn test_matrix_row() {
        let registry = FeatureRegistry::new(
            vec![FeatureRoute {
                id: String::from("X"),
                label: String::from("Feature X"),
                path: String::from("/x"),
            }],
            vec![],
        )
        .unwrap();
        let resolver = Resolver::new(Arc::new(registry));
        let state = configured(vec![row("X", true, false, false)]);

        assert!(resolver.is_path_allowed(Role::Boss, "/x", &state));
        assert!(!resolver.is_path_allowed(Role::Manager, "/x", &state));
        assert!(!resolver.is_path_allowed(Role::Staff, "/x/sub", &state));
        assert!(!resolver.is_path_allowed(Role::Demo, "/x", &state));

        // Unregistered paths stay open.
        assert!(resolver.is_path_allowed(Role::Staff, "/x-report", &state));
        assert!(resolver.is_path_allowed(Role::Staff, "/transfer", &state));
    }

    #[test]
    fn test_missing_row_fails_open() {
        let resolver = Resolver::new_test();
        let state = configured(vec![row("invoice", true, false, false)]);

        assert!(!resolver.is_path_allowed(Role::Staff, "/invoice", &state));
        assert!(resolver.is_path_allowed(Role::Staff, "/analytics", &state));
        assert!(resolver.is_feature_allowed(Role::Manager, "analytics", &state));
    }

    #[test]
    fn test_unknown_roles_denied() {
        let resolver = Resolver::new_test();
        let state = configured(vec![row("warehouse", true, true, true)]);

        assert!(!resolver.is_feature_allowed(Role::Store, "warehouse", &state));
        assert!(!resolver.is_feature_allowed(Role::Unknown, "warehouse", &state));
        assert!(resolver.is_feature_allowed(Role::Demo, "warehouse", &state));

        // Rows absent from the matrix fail open for every role.
        assert!(resolver.is_feature_allowed(Role::Store, "expenses", &state));
    }

    #[test]
    fn test_compact() {
        let resolver = Resolver::new_test();
        let matrix = PermissionMatrix::new(vec![
            row("dashboard", true, true, true),
            row("invoice", true, false, false),
            row("expenses", true, true, false),
            row("retired-feature", true, true, true),
        ]);

        let compact = resolver.compact(&matrix);
        assert_eq!(compact.boss, vec!["/dashboard", "/invoice", "/expenses"]);
        assert_eq!(compact.manager, vec!["/dashboard", "/expenses"]);
        assert_eq!(compact.staff, vec!["/dashboard"]);
    }

    #[test]
    fn test_nav_items() {
        let resolver = Resolver::new_test();
        let state = configured(vec![
            row("invoice", true, false, false),
            row("analytics", true, false, false),
        ]);

        let staff: Vec<String> = resolver
            .nav_items(Role::Staff, &state)
            .into_iter()
            .map(|item| item.path)
            .collect();
        assert!(staff.contains(&String::from("/dashboard")));
        assert!(!staff.contains(&String::from("/invoice")));
        assert!(!staff.contains(&String::from("/settings")));
        assert!(!staff.contains(&String::from("/admin/permissions")));

        let admin = resolver.nav_items(Role::Admin, &state);
        assert_eq!(admin.len(), resolver.registry().features().len());
    }
}
