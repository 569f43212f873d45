//! Support ticket storage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use crate::features::vocab::{TicketCategory, TicketPriority, TicketStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub contact_email: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub contact_email: String,
}

pub trait TicketStore: Send + Sync {
    /// Persist a ticket; new tickets are always `open`
    fn create(&self, ticket: NewTicket) -> StoreResult<Ticket>;

    fn get(&self, id: Uuid) -> StoreResult<Ticket>;
}

#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    tickets: RwLock<Vec<Ticket>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TicketStore for InMemoryTicketStore {
    fn create(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        let mut tickets = self.tickets.write().map_err(|_| StoreError::poisoned())?;

        let saved = Ticket {
            id: Uuid::new_v4(),
            subject: ticket.subject,
            message: ticket.message,
            category: ticket.category,
            priority: ticket.priority,
            contact_email: ticket.contact_email,
            status: TicketStatus::Open,
            created_at: Utc::now(),
        };
        tickets.push(saved.clone());
        Ok(saved)
    }

    fn get(&self, id: Uuid) -> StoreResult<Ticket> {
        let tickets = self.tickets.read().map_err(|_| StoreError::poisoned())?;
        tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("Ticket".to_string()))
    }
}
