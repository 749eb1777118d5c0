//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod automation_repo;
pub mod mailer;
pub mod test_run_repo;

pub use automation_repo::AutomationRepository;
pub use mailer::Mailer;
pub use test_run_repo::{RunTracker, TestRunRepository};
