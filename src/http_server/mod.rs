//! # HTTP Server Module
//!
//! Exposes every feature as a form endpoint.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /actions/{feature}` - Validate and dispatch a submission
//! - `GET /actions/{feature}/schema` - Field definitions for a feature
//!
//! Status codes: 200 on success, 422 on field errors, 400 on action failure
//! or an unreadable body, 404 for an unknown feature.

pub mod action_routes;
pub mod config;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
