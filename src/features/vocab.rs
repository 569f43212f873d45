//! Fixed vocabularies shared by schemas, typed inputs and stores.
//!
//! Each vocabulary is declared once: the enum's serde spelling and the
//! `ALL` list fed to [`one_of`](crate::schema::one_of) come from the same
//! macro arm, so the schema and the typed input cannot drift apart.

use serde::{Deserialize, Serialize};

pub use crate::auth::OtpType;

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted spelling, in declaration order
            pub const ALL: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Kind of stored payment method
    PaymentMethodType {
        CreditCard => "credit_card",
        DebitCard => "debit_card",
        BankAccount => "bank_account",
    }
}

vocabulary! {
    /// Notification category
    NotificationType {
        Subscription => "subscription",
        Billing => "billing",
        Support => "support",
        SiteStatus => "site_status",
        System => "system",
        Onboarding => "onboarding",
    }
}

vocabulary! {
    /// Support ticket category
    TicketCategory {
        Technical => "technical",
        ContentChange => "content_change",
        Billing => "billing",
        GeneralInquiry => "general_inquiry",
    }
}

vocabulary! {
    /// Service a contact-form visitor is asking about
    ServiceInterest {
        WebsiteBuild => "website_build",
        Consultation => "consultation",
        Support => "support",
        Other => "other",
    }
}

vocabulary! {
    /// Support ticket priority
    TicketPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

vocabulary! {
    /// Support ticket lifecycle
    TicketStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use serde_json::Value;

    fn assert_all_deserialize<T: DeserializeOwned + std::fmt::Debug>(all: &[&str]) {
        for text in all {
            let parsed: Result<T, _> = serde_json::from_value(Value::String(text.to_string()));
            assert!(parsed.is_ok(), "'{}' did not deserialize", text);
        }
    }

    #[test]
    fn test_every_allowed_value_deserializes() {
        assert_all_deserialize::<PaymentMethodType>(PaymentMethodType::ALL);
        assert_all_deserialize::<NotificationType>(NotificationType::ALL);
        assert_all_deserialize::<TicketCategory>(TicketCategory::ALL);
        assert_all_deserialize::<TicketPriority>(TicketPriority::ALL);
        assert_all_deserialize::<TicketStatus>(TicketStatus::ALL);
        assert_all_deserialize::<ServiceInterest>(ServiceInterest::ALL);
        assert_all_deserialize::<OtpType>(OtpType::ALL);
    }

    #[test]
    fn test_spelling_round_trips_through_as_str() {
        assert_eq!(PaymentMethodType::CreditCard.as_str(), "credit_card");
        assert_eq!(NotificationType::SiteStatus.to_string(), "site_status");
        assert_eq!(
            serde_json::to_value(TicketCategory::GeneralInquiry).unwrap(),
            "general_inquiry"
        );
    }

    #[test]
    fn test_notification_vocabulary_is_closed() {
        assert_eq!(
            NotificationType::ALL,
            &["subscription", "billing", "support", "site_status", "system", "onboarding"]
        );
        assert!(serde_json::from_value::<PaymentMethodType>(Value::from("bitcoin")).is_err());
    }
}
