//! Observability for formgate
//!
//! Structured JSON logging of typed events. Observability is read-only: it
//! never changes the outcome of a dispatch.
//!
//! ```ignore
//! use formgate::observability::{Event, Logger, Severity};
//!
//! Logger::emit(Severity::Info, Event::ActionSucceeded, &[("action", "login")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{render, Logger, Severity};
