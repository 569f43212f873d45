//! Server-side actions
//!
//! An action is the effect half of a feature: it receives the typed input
//! produced by validation and performs the external side effect.

use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::ActionOutcome;

/// Boxed future returned by [`Action::run`]
pub type ActionFuture<'a, T> = Pin<Box<dyn Future<Output = ActionOutcome<T>> + Send + 'a>>;

/// A named server-side operation.
///
/// `run` is invoked at most once per dispatch, and only with input that
/// passed the paired schema. Timeouts, cancellation and retries are the
/// action's own business; the dispatcher simply awaits the outcome.
pub trait Action: Send + Sync {
    /// Typed input, deserialized from the validated fields
    type Input: DeserializeOwned + Send + 'static;

    /// Data returned to the caller on success
    type Output: Serialize + Send;

    /// Action name, used in logs
    fn name(&self) -> &'static str;

    /// Perform the effect
    fn run(&self, input: Self::Input) -> ActionFuture<'_, Self::Output>;
}
