//! Controller settings
//!
//! Settings are loaded once at start-up into an explicit [`Settings`] value
//! that is passed to the reconciler and builder constructors. Integer limits
//! must be positive integers; booleans fall back to their default when
//! malformed.
//!
//! # Example
//!
//! ```
//! use settings::Settings;
//!
//! let settings = Settings::load_from(|name| match name {
//!     "MAX_VM_INFLIGHT" => Some("5".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//! assert_eq!(settings.migration.max_in_flight, 5);
//! ```

mod env;
pub mod error;
pub mod inventory;
pub mod migration;
pub mod role;

pub use error::SettingsError;
pub use inventory::InventorySettings;
pub use migration::MigrationSettings;
pub use role::{Role, RoleSettings};

use tracing::debug;

/// Process-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Enabled roles
    pub role: RoleSettings,
    /// Inventory service settings
    pub inventory: InventorySettings,
    /// Migration controller settings
    pub migration: MigrationSettings,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(|name| std::env::var(name).ok())
    }

    /// Load settings using `lookup` to resolve variable names.
    pub fn load_from<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Self {
            role: RoleSettings::load(&lookup)?,
            inventory: InventorySettings::load(&lookup)?,
            migration: MigrationSettings::load(&lookup)?,
        };
        debug!(
            inventory_url = %settings.inventory.url,
            max_in_flight = settings.migration.max_in_flight,
            reconcile_concurrency = settings.migration.reconcile_concurrency,
            "Loaded settings"
        );
        Ok(settings)
    }
}
