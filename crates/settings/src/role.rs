//! Role settings
//!
//! A process may run the main controllers, the inventory service, or both.

use crate::env::get_env_string;
use crate::error::SettingsError;
use std::collections::BTreeSet;

/// Roles variable
pub const ROLE: &str = "ROLE";

/// Process role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Migration controllers
    Main,
    /// Inventory service
    Inventory,
}

impl Role {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "main" => Some(Self::Main),
            "inventory" => Some(Self::Inventory),
            _ => None,
        }
    }
}

/// Enabled roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSettings {
    roles: BTreeSet<Role>,
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            roles: BTreeSet::from([Role::Main]),
        }
    }
}

impl RoleSettings {
    pub(crate) fn load<F>(lookup: &F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = get_env_string(lookup, ROLE, "main");
        let mut roles = BTreeSet::new();
        for name in raw.split(',').map(|s| s.trim().to_ascii_lowercase()) {
            if name.is_empty() {
                continue;
            }
            let role = Role::parse(&name).ok_or_else(|| SettingsError::UnknownRole {
                name: ROLE.to_string(),
                role: name.clone(),
            })?;
            roles.insert(role);
        }
        if roles.is_empty() {
            roles.insert(Role::Main);
        }
        Ok(Self { roles })
    }

    /// Whether the role is enabled.
    pub fn has(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
