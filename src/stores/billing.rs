//! Payment method storage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use crate::features::vocab::PaymentMethodType;

/// A saved payment method. Only the last four digits are ever kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub method_type: PaymentMethodType,
    pub holder_name: String,
    pub last4: String,
    pub exp_month: Option<u8>,
    pub exp_year: Option<u16>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when saving a payment method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentMethod {
    pub method_type: PaymentMethodType,
    pub holder_name: String,
    pub last4: String,
    pub exp_month: Option<u8>,
    pub exp_year: Option<u16>,
    pub make_default: bool,
}

pub trait PaymentMethodStore: Send + Sync {
    /// Save a method. The first saved method always becomes the default;
    /// a method saved with `make_default` takes the default from the rest.
    fn add(&self, method: NewPaymentMethod) -> StoreResult<PaymentMethod>;

    fn list(&self) -> StoreResult<Vec<PaymentMethod>>;
}

#[derive(Debug, Default)]
pub struct InMemoryPaymentMethodStore {
    methods: RwLock<Vec<PaymentMethod>>,
}

impl InMemoryPaymentMethodStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaymentMethodStore for InMemoryPaymentMethodStore {
    fn add(&self, method: NewPaymentMethod) -> StoreResult<PaymentMethod> {
        let mut methods = self.methods.write().map_err(|_| StoreError::poisoned())?;

        let is_default = method.make_default || methods.is_empty();
        if is_default {
            for existing in methods.iter_mut() {
                existing.is_default = false;
            }
        }

        let saved = PaymentMethod {
            id: Uuid::new_v4(),
            method_type: method.method_type,
            holder_name: method.holder_name,
            last4: method.last4,
            exp_month: method.exp_month,
            exp_year: method.exp_year,
            is_default,
            created_at: Utc::now(),
        };
        methods.push(saved.clone());
        Ok(saved)
    }

    fn list(&self) -> StoreResult<Vec<PaymentMethod>> {
        let methods = self.methods.read().map_err(|_| StoreError::poisoned())?;
        Ok(methods.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(make_default: bool) -> NewPaymentMethod {
        NewPaymentMethod {
            method_type: PaymentMethodType::CreditCard,
            holder_name: "Ana Lima".to_string(),
            last4: "4242".to_string(),
            exp_month: Some(12),
            exp_year: Some(2030),
            make_default,
        }
    }

    #[test]
    fn test_first_method_becomes_default() {
        let store = InMemoryPaymentMethodStore::new();
        assert!(store.add(card(false)).unwrap().is_default);
        assert!(!store.add(card(false)).unwrap().is_default);
    }

    #[test]
    fn test_single_default_after_explicit_default() {
        let store = InMemoryPaymentMethodStore::new();
        let first = store.add(card(false)).unwrap();
        let second = store.add(card(true)).unwrap();

        let methods = store.list().unwrap();
        assert_eq!(methods.iter().filter(|m| m.is_default).count(), 1);
        assert!(methods.iter().any(|m| m.id == second.id && m.is_default));
        assert!(methods.iter().any(|m| m.id == first.id && !m.is_default));
    }

    #[test]
    fn test_serialized_shape_uses_form_names() {
        let store = InMemoryPaymentMethodStore::new();
        let saved = store.add(card(false)).unwrap();
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["type"], "credit_card");
        assert_eq!(json["holderName"], "Ana Lima");
        assert_eq!(json["isDefault"], true);
    }
}
