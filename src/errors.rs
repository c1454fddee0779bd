use thiserror::Error;

/// Errors that can occur in the vitals engine.
///
/// The taxonomy drives recovery: `AuthRequired` is fatal to the session
/// (all timers stop), `Transient` is swallowed by background ticks and
/// retried on the next scheduled tick, `ActionFailed` is surfaced to the
/// caller while the simulation continues.
#[derive(Error, Debug)]
pub enum VitalsError {
    /// The backend rejected the credential (HTTP 401/403). Fatal to the
    /// session; control returns to the authentication collaborator.
    #[error("Authentication required: backend rejected the credential (HTTP {status})")]
    AuthRequired { status: u16 },

    /// Timeout, connection failure or 5xx. Background ticks log and retry;
    /// no state is mutated.
    #[error("Transient network error: {0}")]
    Transient(String),

    /// A user-initiated action (feed, cuddle, equip, create, delete) was
    /// rejected by the backend.
    #[error("Action failed with HTTP {status}: {message}")]
    ActionFailed { status: u16, message: String },

    /// Invalid engine or API configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A response body could not be decoded into the expected shape.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A user action was requested while no pet is active.
    #[error("No active pet")]
    NoActivePet,
}

impl VitalsError {
    /// Classify an unsuccessful HTTP status per the error taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => VitalsError::AuthRequired { status },
            500..=599 => VitalsError::Transient(format!("HTTP {status}: {message}")),
            _ => VitalsError::ActionFailed { status, message },
        }
    }

    /// True for errors that end the session.
    pub fn is_auth(&self) -> bool {
        matches!(self, VitalsError::AuthRequired { .. })
    }

    /// True for errors background ticks may silently retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, VitalsError::Transient(_))
    }
}

/// Result type used throughout the vitals engine.
pub type Result<T> = std::result::Result<T, VitalsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses_are_fatal() {
        assert!(VitalsError::from_status(401, "unauthorized").is_auth());
        assert!(VitalsError::from_status(403, "forbidden").is_auth());
    }

    #[test]
    fn test_server_errors_are_transient() {
        let err = VitalsError::from_status(503, "unavailable");
        assert!(err.is_transient());
        assert!(!err.is_auth());
    }

    #[test]
    fn test_client_errors_are_action_failures() {
        let err = VitalsError::from_status(404, "no such pet");
        assert!(!err.is_transient());
        assert!(!err.is_auth());
        assert!(matches!(err, VitalsError::ActionFailed { status: 404, .. }));
    }
}
