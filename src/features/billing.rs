//! Save a payment method from the client billing page.

use std::sync::Arc;

use serde::Deserialize;

use super::vocab::PaymentMethodType;
use crate::pipeline::{Action, ActionFuture, ActionOutcome, Feature};
use crate::schema::{boolean, integer, one_of, string, Schema, SchemaResult};
use crate::services::Services;
use crate::stores::{NewPaymentMethod, PaymentMethod, PaymentMethodStore};

pub fn schema() -> SchemaResult<Schema> {
    Schema::builder("billing_payment_method")
        .field("type", one_of(PaymentMethodType::ALL))
        .field(
            "holderName",
            string()
                .trim()
                .min_len(2, "Name must be at least 2 characters")
                .max_len(100, "Name must be less than 100 characters"),
        )
        .field(
            "last4",
            string()
                .min_len(4, "Enter the last 4 digits")
                .max_len(4, "Enter the last 4 digits")
                .digits("Only digits are allowed"),
        )
        .field("expMonth", integer().at_least(1).at_most(12).optional())
        .field("expYear", integer().at_least(2000).at_most(2100).optional())
        .field("isDefault", boolean().optional())
        .build()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodInput {
    #[serde(rename = "type")]
    pub method_type: PaymentMethodType,
    pub holder_name: String,
    pub last4: String,
    pub exp_month: Option<u8>,
    pub exp_year: Option<u16>,
    pub is_default: Option<bool>,
}

pub struct SavePaymentMethodAction {
    store: Arc<dyn PaymentMethodStore>,
}

impl SavePaymentMethodAction {
    pub fn new(services: &Services) -> Self {
        Self {
            store: services.payment_methods.clone(),
        }
    }

    fn save(&self, input: PaymentMethodInput) -> ActionOutcome<PaymentMethod> {
        let saved = self.store.add(NewPaymentMethod {
            method_type: input.method_type,
            holder_name: input.holder_name,
            last4: input.last4,
            exp_month: input.exp_month,
            exp_year: input.exp_year,
            make_default: input.is_default.unwrap_or(false),
        })?;
        Ok(saved)
    }
}

impl Action for SavePaymentMethodAction {
    type Input = PaymentMethodInput;
    type Output = PaymentMethod;

    fn name(&self) -> &'static str {
        "save_payment_method"
    }

    fn run(&self, input: PaymentMethodInput) -> ActionFuture<'_, PaymentMethod> {
        Box::pin(async move { self.save(input) })
    }
}

pub fn feature(services: &Services) -> SchemaResult<Feature<SavePaymentMethodAction>> {
    Ok(Feature::new(schema()?, SavePaymentMethodAction::new(services))
        .with_general_message("Failed to save payment method."))
}
