//! Admin site settings. Every field is optional; blank inputs leave the
//! current value alone.

use std::sync::Arc;

use serde::Deserialize;

use super::vocab::NotificationType;
use crate::pipeline::{Action, ActionFuture, ActionOutcome, Feature};
use crate::schema::{boolean, one_of, string, Schema, SchemaResult};
use crate::services::Services;
use crate::stores::{SettingsPatch, SettingsStore, SiteSettings};

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("site_settings")
        .field(
            "siteName",
            string()
                .min_len(1, "Site name is required")
                .max_len(100, "Site name must be less than 100 characters")
                .optional()
                .empty_as_absent(),
        )
        .field(
            "supportEmail",
            string()
                .email("Invalid email address")
                .optional()
                .empty_as_absent(),
        )
        .field("maintenanceMode", boolean().optional().empty_as_absent())
        .field(
            "defaultNotificationType",
            one_of(NotificationType::ALL).optional().empty_as_absent(),
        )
        .build()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    pub site_name: Option<String>,
    pub support_email: Option<String>,
    pub maintenance_mode: Option<bool>,
    pub default_notification_type: Option<NotificationType>,
}

impl From<SettingsInput> for SettingsPatch {
    fn from(input: SettingsInput) -> Self {
        SettingsPatch {
            site_name: input.site_name,
            support_email: input.support_email,
            maintenance_mode: input.maintenance_mode,
            default_notification_type: input.default_notification_type,
        }
    }
}

pub struct UpdateSettingsAction {
    store: Arc<dyn SettingsStore>,
}

impl UpdateSettingsAction {
    pub fn new(services: &Services) -> Self {
        Self {
            store: services.settings.clone(),
        }
    }

    fn apply(&self, input: SettingsInput) -> ActionOutcome<SiteSettings> {
        Ok(self.store.apply(input.into())?)
    }
}

impl Action for UpdateSettingsAction {
    type Input = SettingsInput;
    type Output = SiteSettings;

    fn name(&self) -> &'static str {
        "update_settings"
    }

    fn run(&self, input: SettingsInput) -> ActionFuture<'_, SiteSettings> {
        Box::pin(async move { self.apply(input) })
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<UpdateSettingsAction>> {
    Ok(Feature::new(schema()?, UpdateSettingsAction::new(services))
        .with_general_message("Failed to update settings."))
}
