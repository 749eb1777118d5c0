//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`FlowMailError`] via `From`. Adapter errors are boxed so the domain
//! never names an IO crate.

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum FlowMailError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// Persistence failure, raised by a storage adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Mail delivery failure, raised by a mail adapter.
    #[error("delivery error")]
    Delivery(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant or input rule was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("Automation name already exists")]
    DuplicateName,

    #[error("Duplicate step id: {0}")]
    DuplicateStepId(String),

    #[error("Email is required")]
    EmptyEmail,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid identifier")]
    InvalidId,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found")]
pub struct NotFoundError {
    /// Kind of thing that was looked up, e.g. `"Automation"`.
    pub entity: &'static str,
    pub id: String,
}

/// The request is well-formed but conflicts with the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("Test run is not running")]
    RunNotLive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_validation_messages_for_api_consumers() {
        assert_eq!(ValidationError::EmptyName.to_string(), "Name is required");
        assert_eq!(
            ValidationError::NameTooLong { max: 100 }.to_string(),
            "Name must be at most 100 characters"
        );
        assert_eq!(
            ValidationError::DuplicateName.to_string(),
            "Automation name already exists"
        );
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Invalid email format"
        );
    }

    #[test]
    fn should_display_not_found_with_entity_name() {
        let err = NotFoundError {
            entity: "Automation",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Automation not found");
    }

    #[test]
    fn should_convert_validation_error_into_top_level_error() {
        let err: FlowMailError = ValidationError::EmptyEmail.into();
        assert!(matches!(
            err,
            FlowMailError::Validation(ValidationError::EmptyEmail)
        ));
    }
}
