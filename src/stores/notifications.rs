//! In-portal notifications.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use crate::features::vocab::NotificationType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: Option<String>,
    pub action_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub profile_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: Option<String>,
    pub action_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub trait NotificationStore: Send + Sync {
    /// Persist a notification; new notifications are unread
    fn create(&self, notification: NewNotification) -> StoreResult<Notification>;

    /// Notifications addressed to `profile_id`, oldest first
    fn list_for(&self, profile_id: Uuid) -> StoreResult<Vec<Notification>>;

    fn mark_read(&self, id: Uuid) -> StoreResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn create(&self, notification: NewNotification) -> StoreResult<Notification> {
        let mut notifications = self
            .notifications
            .write()
            .map_err(|_| StoreError::poisoned())?;

        let saved = Notification {
            id: Uuid::new_v4(),
            profile_id: notification.profile_id,
            notification_type: notification.notification_type,
            title: notification.title,
            body: notification.body,
            action_url: notification.action_url,
            expires_at: notification.expires_at,
            read: false,
            created_at: Utc::now(),
        };
        notifications.push(saved.clone());
        Ok(saved)
    }

    fn list_for(&self, profile_id: Uuid) -> StoreResult<Vec<Notification>> {
        let notifications = self
            .notifications
            .read()
            .map_err(|_| StoreError::poisoned())?;
        Ok(notifications
            .iter()
            .filter(|n| n.profile_id == profile_id)
            .cloned()
            .collect())
    }

    fn mark_read(&self, id: Uuid) -> StoreResult<()> {
        let mut notifications = self
            .notifications
            .write()
            .map_err(|_| StoreError::poisoned())?;

        match notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(())
            }
            None => Err(StoreError::NotFound("Notification".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_notification(profile_id: Uuid) -> NewNotification {
        NewNotification {
            profile_id,
            notification_type: NotificationType::Billing,
            title: "Invoice ready".into(),
            body: None,
            action_url: Some("https://portal.example.com/client/billing".into()),
            expires_at: None,
        }
    }

    #[test]
    fn test_created_unread_and_scoped_to_profile() {
        let store = InMemoryNotificationStore::new();
        let ana = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let saved = store.create(new_notification(ana)).unwrap();
        store.create(new_notification(bob)).unwrap();

        assert!(!saved.read);
        assert_eq!(store.list_for(ana).unwrap(), vec![saved]);
    }

    #[test]
    fn test_mark_read() {
        let store = InMemoryNotificationStore::new();
        let ana = Uuid::new_v4();
        let saved = store.create(new_notification(ana)).unwrap();

        store.mark_read(saved.id).unwrap();
        assert!(store.list_for(ana).unwrap()[0].read);
        assert!(matches!(
            store.mark_read(Uuid::new_v4()),
            Err(StoreError::NotFound(_))
        ));
    }
}
