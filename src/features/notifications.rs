//! Admin-created notification for one client profile.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::vocab::NotificationType;
use crate::auth::UserRepository;
use crate::pipeline::{Action, ActionFuture, ActionOutcome, Feature};
use crate::schema::{one_of, string, Schema, SchemaResult};
use crate::services::Services;
use crate::stores::{NewNotification, Notification, NotificationStore, StoreError};

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("create_notification")
        .field("profileId", string().uuid("Invalid user ID"))
        .field("notificationType", one_of(NotificationType::ALL))
        .field(
            "title",
            string()
                .min_len(1, "Title is required")
                .max_len(200, "Title too long"),
        )
        .field(
            "body",
            string().max_len(2000, "Body too long").optional().empty_as_absent(),
        )
        .field(
            "actionUrl",
            string().url("Invalid URL").optional().empty_as_absent(),
        )
        .field(
            "expiresAt",
            string()
                .datetime("Invalid date and time")
                .optional()
                .empty_as_absent(),
        )
        .build()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    pub profile_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: Option<String>,
    pub action_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct CreateNotificationAction {
    users: Arc<dyn UserRepository>,
    notifications: Arc<dyn NotificationStore>,
}

impl CreateNotificationAction {
    pub fn new(services: &Services) -> Self {
        Self {
            users: services.users.clone(),
            notifications: services.notifications.clone(),
        }
    }

    fn create(&self, input: NotificationInput) -> ActionOutcome<Notification> {
        if self.users.find_by_id(input.profile_id)?.is_none() {
            return Err(StoreError::NotFound("Profile".to_string()).into());
        }

        let saved = self.notifications.create(NewNotification {
            profile_id: input.profile_id,
            notification_type: input.notification_type,
            title: input.title,
            body: input.body,
            action_url: input.action_url,
            expires_at: input.expires_at,
        })?;
        Ok(saved)
    }
}

impl Action for CreateNotificationAction {
    type Input = NotificationInput;
    type Output = Notification;

    fn name(&self) -> &'static str {
        "create_notification"
    }

    fn run(&self, input: NotificationInput) -> ActionFuture<'_, Notification> {
        Box::pin(async move { self.create(input) })
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<CreateNotificationAction>> {
    Ok(Feature::new(schema()?, CreateNotificationAction::new(services))
        .with_general_message("Failed to create notification."))
}
