use std::fmt;

use serde::{Deserialize, Serialize};

/// Roles known to the dashboard.
///
/// `admin > boss > manager > staff` form a total order. `demo` sits at the
/// `staff` level and is governed by the staff column of the permission
/// matrix. `store` is the in-shop terminal context: it has no rank and no
/// matrix column. Any other value deserializes to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Boss,
    Manager,
    Staff,
    Demo,
    Store,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn rank(&self) -> Option<u8> {
        match self {
            Role::Admin => Some(3),
            Role::Boss => Some(2),
            Role::Manager => Some(1),
            Role::Staff | Role::Demo => Some(0),
            Role::Store | Role::Unknown => None,
        }
    }

    /// Returns `true` if this role is ranked at or above `min`. Roles outside
    /// the ordering never satisfy a rank requirement.
    pub fn has_min_role(&self, min: Role) -> bool {
        match (self.rank(), min.rank()) {
            (Some(have), Some(want)) => have >= want,
            _ => false,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Boss => "Boss",
            Role::Manager => "Manager",
            Role::Staff => "Staff",
            Role::Demo => "Demo",
            Role::Store => "Store",
            Role::Unknown => "Unknown",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Boss => "boss",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Demo => "demo",
            Role::Store => "store",
            Role::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Role {
        match s.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "boss" => Role::Boss,
            "manager" => Role::Manager,
            "staff" => Role::Staff,
            "demo" => Role::Demo,
            "store" => Role::Store,
            _ => Role::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_order() {
        assert!(Role::Admin.has_min_role(Role::Boss));
        assert!(Role::Boss.has_min_role(Role::Manager));
        assert!(Role::Manager.has_min_role(Role::Staff));
        assert!(Role::Staff.has_min_role(Role::Staff));
        assert!(!Role::Staff.has_min_role(Role::Manager));

        assert!(Role::Demo.has_min_role(Role::Staff));
        assert!(!Role::Demo.has_min_role(Role::Manager));

        assert!(!Role::Store.has_min_role(Role::Staff));
        assert!(!Role::Unknown.has_min_role(Role::Staff));
    }

    #[test]
    fn test_role_serde() {
        let role: Role = serde_json::from_str(r#""manager""#).unwrap();
        assert_eq!(role, Role::Manager);

        let role: Role = serde_json::from_str(r#""superuser""#).unwrap();
        assert_eq!(role, Role::Unknown);

        assert_eq!(serde_json::to_string(&Role::Demo).unwrap(), r#""demo""#);
        assert_eq!(Role::parse(" Boss "), Role::Boss);
        assert_eq!(Role::parse("root"), Role::Unknown);
    }
}
