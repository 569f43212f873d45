//! # Stores
//!
//! Persistence collaborators for the portal features. Each store is a
//! trait with an in-memory implementation; actions only see the trait.

mod billing;
mod errors;
mod notifications;
mod settings;
mod tickets;

pub use billing::{InMemoryPaymentMethodStore, NewPaymentMethod, PaymentMethod, PaymentMethodStore};
pub use errors::{StoreError, StoreResult};
pub use notifications::{
    InMemoryNotificationStore, NewNotification, Notification, NotificationStore,
};
pub use settings::{InMemorySettingsStore, SettingsPatch, SettingsStore, SiteSettings};
pub use tickets::{InMemoryTicketStore, NewTicket, Ticket, TicketStore};
