//! # flowmail-domain
//!
//! Pure domain model for the flowmail email automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Automations** (named graphs of typed steps and connections)
//! - Define the pure helpers the execution engine relies on:
//!   graph lookups, condition evaluation, delay calculation
//! - Define **Test runs** (one execution record per recipient)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod email;
pub mod test_run;
