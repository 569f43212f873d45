//! Open a support ticket.

use std::sync::Arc;

use serde::Deserialize;

use super::vocab::{TicketCategory, TicketPriority};
use crate::auth::{EmailSender, EmailTemplate};
use crate::observability::{Event, Logger, Severity};
use crate::pipeline::{Action, ActionFuture, ActionOutcome, Feature};
use crate::schema::{one_of, string, Schema, SchemaResult};
use crate::services::Services;
use crate::stores::{NewTicket, Ticket, TicketStore};

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("support_ticket")
        .field(
            "subject",
            string()
                .min_len(5, "Subject must be at least 5 characters")
                .max_len(200, "Subject must be less than 200 characters"),
        )
        .field(
            "message",
            string()
                .min_len(20, "Message must be at least 20 characters")
                .max_len(5000, "Message must be less than 5000 characters"),
        )
        .field(
            "category",
            one_of(TicketCategory::ALL).message("Please select a category"),
        )
        .field(
            "priority",
            one_of(TicketPriority::ALL).message("Please select a priority"),
        )
        .field(
            "contactEmail",
            string()
                .min_len(1, "Email is required")
                .email("Please enter a valid email address"),
        )
        .build()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketInput {
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub contact_email: String,
}

pub struct CreateTicketAction {
    tickets: Arc<dyn TicketStore>,
    email: Arc<dyn EmailSender>,
}

impl CreateTicketAction {
    pub fn new(services: &Services) -> Self {
        Self {
            tickets: services.tickets.clone(),
            email: services.email.clone(),
        }
    }

    async fn create(&self, input: TicketInput) -> ActionOutcome<Ticket> {
        let ticket = self.tickets.create(NewTicket {
            subject: input.subject,
            message: input.message,
            category: input.category,
            priority: input.priority,
            contact_email: input.contact_email,
        })?;

        let confirmation = EmailTemplate::TicketCreated {
            user_email: ticket.contact_email.clone(),
            ticket_id: ticket.id.to_string(),
            subject: ticket.subject.clone(),
        };
        if let Err(err) = self.email.send(confirmation).await {
            let cause = err.to_string();
            Logger::emit(
                Severity::Warn,
                Event::EmailSendFailed,
                &[("cause", &cause), ("template", "ticket_created")],
            );
        }

        Ok(ticket)
    }
}

impl Action for CreateTicketAction {
    type Input = TicketInput;
    type Output = Ticket;

    fn name(&self) -> &'static str {
        "create_ticket"
    }

    fn run(&self, input: TicketInput) -> ActionFuture<'_, Ticket> {
        Box::pin(self.create(input))
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<CreateTicketAction>> {
    Ok(Feature::new(schema()?, CreateTicketAction::new(services))
        .with_general_message("Failed to create support ticket"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MockEmailSender;
    use crate::features::vocab::TicketStatus;
    use crate::schema::RawInput;
    use serde_json::json;

    fn ticket() -> RawInput {
        RawInput::from_json(json!({
            "subject": "Broken link",
            "message": "The pricing page links to a page that returns 404.",
            "category": "technical",
            "priority": "high",
            "contactEmail": "ana@example.com",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_ticket_opened_and_confirmed() {
        let mail = Arc::new(MockEmailSender::new());
        let services = Services::in_memory().with_email_sender(mail.clone());

        let result = feature(&services).unwrap().dispatch(&ticket()).await;

        let saved = result.data().unwrap();
        assert_eq!(saved.status, TicketStatus::Open);
        assert_eq!(services.tickets.get(saved.id).unwrap(), *saved);
        assert_eq!(mail.sent()[0].recipient(), "ana@example.com");
    }

    #[tokio::test]
    async fn test_confirmation_failure_keeps_ticket() {
        let services = Services::in_memory()
            .with_email_sender(Arc::new(MockEmailSender::failing("relay down")));

        let result = feature(&services).unwrap().dispatch(&ticket()).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_select_messages_override_enum_default() {
        let input = ticket().with("category", "").with("priority", "urgent");
        let result = feature(&Services::in_memory()).unwrap().dispatch(&input).await;

        let errors = result.field_errors().unwrap();
        assert_eq!(
            errors.get("category"),
            Some(&["Please select a category".to_string()][..])
        );
        assert_eq!(
            errors.get("priority"),
            Some(&["Please select a priority".to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_short_message_rejected() {
        let input = ticket().with("message", "Help");
        let result = feature(&Services::in_memory()).unwrap().dispatch(&input).await;
        assert_eq!(
            result.field_errors().unwrap().get("message"),
            Some(&["Message must be at least 20 characters".to_string()][..])
        );
    }
}
