//! # flowmail-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationRepository` — CRUD for automations
//!   - `TestRunRepository` — create & query test runs
//!   - `RunTracker` — record how a run ended
//!   - `Mailer` — deliver one email
//! - Define **driving/inbound ports** as use-case structs:
//!   - `AutomationService` — create, update, list, get, delete
//!   - `TestRunService` — start, inspect and cancel test runs
//!   - `ExecutionEngine` — walk an automation graph for one recipient
//! - Provide **in-process infrastructure** (run registry) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `flowmail-domain` only (plus `tokio` for timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod execution_engine;
pub mod ports;
pub mod run_registry;
pub mod services;
