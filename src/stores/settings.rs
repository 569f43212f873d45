//! Site-wide settings edited from the admin back-office.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use crate::features::vocab::NotificationType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub site_name: String,
    pub support_email: String,
    pub maintenance_mode: bool,
    pub default_notification_type: NotificationType,
    pub updated_at: DateTime<Utc>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Client Portal".to_string(),
            support_email: "support@example.com".to_string(),
            maintenance_mode: false,
            default_notification_type: NotificationType::System,
            updated_at: Utc::now(),
        }
    }
}

/// Partial update; `None` leaves the current value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub site_name: Option<String>,
    pub support_email: Option<String>,
    pub maintenance_mode: Option<bool>,
    pub default_notification_type: Option<NotificationType>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &SettingsPatch::default()
    }
}

pub trait SettingsStore: Send + Sync {
    fn get(&self) -> StoreResult<SiteSettings>;

    /// Merge `patch` into the current settings and return the result
    fn apply(&self, patch: SettingsPatch) -> StoreResult<SiteSettings>;
}

#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<SiteSettings>,
}

impl InMemorySettingsStore {
    pub fn new(initial: SiteSettings) -> Self {
        Self {
            settings: RwLock::new(initial),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get(&self) -> StoreResult<SiteSettings> {
        let settings = self.settings.read().map_err(|_| StoreError::poisoned())?;
        Ok(settings.clone())
    }

    fn apply(&self, patch: SettingsPatch) -> StoreResult<SiteSettings> {
        let mut settings = self.settings.write().map_err(|_| StoreError::poisoned())?;

        if let Some(site_name) = patch.site_name {
            settings.site_name = site_name;
        }
        if let Some(support_email) = patch.support_email {
            settings.support_email = support_email;
        }
        if let Some(maintenance_mode) = patch.maintenance_mode {
            settings.maintenance_mode = maintenance_mode;
        }
        if let Some(kind) = patch.default_notification_type {
            settings.default_notification_type = kind;
        }
        settings.updated_at = Utc::now();

        Ok(settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_touches_present_values() {
        let store = InMemorySettingsStore::default();
        let before = store.get().unwrap();

        let after = store
            .apply(SettingsPatch {
                maintenance_mode: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert!(after.maintenance_mode);
        assert_eq!(after.site_name, before.site_name);
        assert_eq!(after.support_email, before.support_email);
    }

    #[test]
    fn test_empty_patch() {
        assert!(SettingsPatch::default().is_empty());
        assert!(!SettingsPatch {
            site_name: Some("Acme".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
