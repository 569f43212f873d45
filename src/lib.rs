//! formgate - schema-validated form actions for a client portal
//!
//! Every mutation the portal exposes is a feature: a schema that checks the
//! submitted form and an action that runs only on valid input. The outcome
//! always comes back as an [`pipeline::ActionResult`].

pub mod auth;
pub mod cli;
pub mod config;
pub mod features;
pub mod http_server;
pub mod observability;
pub mod pipeline;
pub mod schema;
pub mod services;
pub mod stores;
