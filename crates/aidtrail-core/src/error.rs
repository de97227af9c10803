use aidtrail_registry::RegistryError;
use aidtrail_types::DeliveryStatus;
use thiserror::Error;

/// Aid pipeline errors.
///
/// Every failure is a synchronous, atomic abort: the operation that returns
/// one of these has not mutated any state.
#[derive(Debug, Error)]
pub enum AidError {
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

impl AidError {
    pub fn wrong_status(expected: DeliveryStatus, actual: DeliveryStatus) -> Self {
        Self::InvalidState {
            expected: expected.name().to_string(),
            actual: actual.name().to_string(),
        }
    }

    pub fn invalid_state(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidState {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl From<RegistryError> for AidError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::InvalidInput(msg) => Self::InvalidInput(msg),
            RegistryError::AlreadyRegistered(id) => {
                Self::invalid_state("no existing record", format!("identity {id} already registered"))
            }
            RegistryError::IdentifierCollision(identifier) => {
                Self::invalid_state("unique identifier", format!("'{identifier}' already in use"))
            }
        }
    }
}
