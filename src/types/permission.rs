use serde::{Deserialize, Serialize};

use super::role::Role;

/// One entry of the feature registry: a named capability and the path prefix
/// it governs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRoute {
    pub id: String,
    pub label: String,
    pub path: String,
}

/// A row of the permission matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRow {
    pub feature: String,

    #[serde(default)]
    pub boss: bool,

    #[serde(default)]
    pub manager: bool,

    #[serde(default)]
    pub staff: bool,
}

impl PermissionRow {
    /// The flag for `role`. `demo` reads the staff column; roles without a
    /// column are never allowed.
    pub fn allows(&self, role: Role) -> bool {
        match role {
            Role::Boss => self.boss,
            Role::Manager => self.manager,
            Role::Staff | Role::Demo => self.staff,
            _ => false,
        }
    }
}

/// The admin-edited permission matrix, one row per feature, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    pub rows: Vec<PermissionRow>,
}

impl PermissionMatrix {
    pub fn new(rows: Vec<PermissionRow>) -> Self {
        Self { rows }
    }

    pub fn row(&self, feature: &str) -> Option<&PermissionRow> {
        self.rows.iter().find(|row| row.feature == feature)
    }
}

/// Role-keyed path lists derived from the matrix; this is what the gate
/// reads from the permissions cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactPermissions {
    #[serde(default)]
    pub boss: Vec<String>,

    #[serde(default)]
    pub manager: Vec<String>,

    #[serde(default)]
    pub staff: Vec<String>,
}

impl CompactPermissions {
    pub fn paths_for(&self, role: Role) -> &[String] {
        match role {
            Role::Boss => &self.boss,
            Role::Manager => &self.manager,
            Role::Staff | Role::Demo => &self.staff,
            _ => &[],
        }
    }

    /// Every path that appears in any role's list.
    pub fn all_paths(&self) -> impl Iterator<Item = &String> {
        self.boss
            .iter()
            .chain(self.manager.iter())
            .chain(self.staff.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaniResponse {
    pub path: String,
    pub allow: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// The matrix as the admin editor sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixResponse {
    pub configured: bool,
    pub matrix: PermissionMatrix,

    /// What the permissions cookie carries for this matrix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact: Option<CompactPermissions>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_json() {
        let json = r#"[
            {"feature": "invoice", "boss": true, "manager": false, "staff": false},
            {"feature": "expenses", "boss": true, "manager": true}
        ]"#;
        let matrix: PermissionMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(matrix.rows.len(), 2);

        let row = matrix.row("expenses").unwrap();
        assert!(row.allows(Role::Manager));
        assert!(!row.allows(Role::Staff));
        assert!(!row.allows(Role::Demo));
        assert!(matrix.row("analytics").is_none());
    }

    #[test]
    fn test_row_unknown_roles() {
        let row = PermissionRow {
            feature: String::from("warehouse"),
            boss: true,
            manager: true,
            staff: true,
        };
        assert!(row.allows(Role::Demo));
        assert!(!row.allows(Role::Store));
        assert!(!row.allows(Role::Unknown));
        assert!(!row.allows(Role::Admin));
    }

    #[test]
    fn test_compact_paths() {
        let compact: CompactPermissions =
            serde_json::from_str(r#"{"boss": ["/invoice"], "staff": ["/warehouse"]}"#).unwrap();
        assert!(compact.manager.is_empty());
        assert_eq!(compact.paths_for(Role::Demo), &[String::from("/warehouse")]);
        assert!(compact.paths_for(Role::Store).is_empty());
        assert_eq!(compact.all_paths().count(), 2);
    }
}
