//! User and role models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub roles: Vec<RoleName>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn can_manage_inventory(&self) -> bool {
        can_manage_inventory(&self.roles)
    }
}

/// Roles known to the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Admin,
    Manager,
    Clerk,
}

impl RoleName {
    pub const ALL: [RoleName; 3] = [RoleName::Admin, RoleName::Manager, RoleName::Clerk];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Manager => "manager",
            RoleName::Clerk => "clerk",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoleName::Admin => "Full system access",
            RoleName::Manager => "Can manage inventory and view reports",
            RoleName::Clerk => "Can process sales and view stock",
        }
    }

    /// Case-insensitive lookup ignoring surrounding whitespace
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        RoleName::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(name))
    }

    /// Role assigned at registration: unknown or missing names fall back to clerk
    pub fn for_registration(name: Option<&str>) -> Self {
        name.and_then(Self::from_name).unwrap_or(RoleName::Clerk)
    }

    pub fn can_manage_inventory(self) -> bool {
        matches!(self, RoleName::Admin | RoleName::Manager)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when the role set intersects {manager, admin}
pub fn can_manage_inventory(roles: &[RoleName]) -> bool {
    roles.iter().any(|r| r.can_manage_inventory())
}

/// Parse stored role names, dropping any the system does not know
pub fn parse_roles<S: AsRef<str>>(names: &[S]) -> Vec<RoleName> {
    let mut roles: Vec<RoleName> = names
        .iter()
        .filter_map(|n| RoleName::from_name(n.as_ref()))
        .collect();
    roles.sort();
    roles.dedup();
    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_role_is_case_insensitive() {
        assert_eq!(RoleName::for_registration(Some("Manager")), RoleName::Manager);
        assert_eq!(RoleName::for_registration(Some("  ADMIN ")), RoleName::Admin);
    }

    #[test]
    fn unknown_role_falls_back_to_clerk() {
        assert_eq!(RoleName::for_registration(Some("bogus")), RoleName::Clerk);
        assert_eq!(RoleName::for_registration(None), RoleName::Clerk);
        assert_eq!(RoleName::for_registration(Some("")), RoleName::Clerk);
    }

    #[test]
    fn manager_gate() {
        assert!(can_manage_inventory(&[RoleName::Clerk, RoleName::Manager]));
        assert!(can_manage_inventory(&[RoleName::Admin]));
        assert!(!can_manage_inventory(&[RoleName::Clerk]));
        assert!(!can_manage_inventory(&[]));
    }

    #[test]
    fn parse_roles_skips_unknown() {
        assert_eq!(
            parse_roles(&["clerk", "owner", "admin", "clerk"]),
            vec![RoleName::Admin, RoleName::Clerk]
        );
    }
}
