//! # Validated Action Pipeline
//!
//! Raw input → schema validation → typed input → action → [`ActionResult`].
//!
//! The pipeline is stateless. Each dispatch is independent, may run
//! concurrently with others, and invokes its action zero or one times.

mod action;
mod dispatcher;
mod errors;
mod feature;

pub use action::{Action, ActionFuture};
pub use dispatcher::{
    dispatch, dispatch_with, ActionFailure, ActionResult, FailureMessages,
    DEFAULT_GENERAL_MESSAGE, DEFAULT_INVALID_MESSAGE,
};
pub use errors::{ActionError, ActionOutcome};
pub use feature::Feature;
