//! # flowmail-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for the workflow editor
//!   (`/api/automations`, `/api/automations/{id}/test`, `/api/test-runs/{id}`, …)
//! - Serve the built editor frontend with a single-page-app fallback
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `flowmail-app` (for port traits and services) and `flowmail-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
