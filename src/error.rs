use crate::auth::{Role, ViewSection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned across the authentication boundary.
///
/// Unknown users and wrong passwords both map to `InvalidCredentials`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("A session is already active; log out first")]
    SessionActive,
    #[error("Role {role} may not open the {section} section")]
    Forbidden { role: Role, section: ViewSection },
    #[error("Too many failed login attempts")]
    RateLimited,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error("unknown section '{0}'")]
    UnknownSection(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read principal registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed principal registry: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Verifier for '{0}' is not a hex-encoded SHA-256 digest")]
    InvalidVerifier(String),
    #[error("Principal '{0}' is registered more than once")]
    DuplicatePrincipal(String),
    #[error("Principal usernames must not be empty")]
    EmptyUsername,
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Struct representing an error as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable snake-case error code.
    pub error: String,

    /// Human-readable text suitable for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str, description: Option<&str>) -> Self {
        ErrorResponse {
            error: error.to_string(),
            error_description: description.map(|s| s.to_string()),
        }
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ErrorResponse::new(
                "invalid_credentials",
                Some("Invalid username or password."),
            ),
            AuthError::SessionActive => ErrorResponse::new(
                "session_active",
                Some("Log out before signing in as another user."),
            ),
            AuthError::Forbidden { section, .. } => {
                let description = format!("You do not have access to the {} section.", section);
                ErrorResponse::new("forbidden", Some(&description))
            }
            AuthError::RateLimited => ErrorResponse::new(
                "rate_limited",
                Some("Too many failed attempts. Try again later."),
            ),
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        ErrorResponse::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_response() {
        let response = ErrorResponse::from(AuthError::InvalidCredentials);
        assert_eq!(response.error, "invalid_credentials");
        assert_eq!(
            response.error_description.as_deref(),
            Some("Invalid username or password.")
        );
    }

    #[test]
    fn test_forbidden_response_names_section() {
        let err = AuthError::Forbidden {
            role: Role::Veterinarian,
            section: ViewSection::Financial,
        };
        let response = ErrorResponse::from(&err);
        assert_eq!(response.error, "forbidden");
        assert!(response.error_description.unwrap().contains("Financial"));
    }

    #[test]
    fn test_response_omits_missing_description() {
        let json = serde_json::to_string(&ErrorResponse::new("rate_limited", None)).unwrap();
        assert_eq!(json, r#"{"error":"rate_limited"}"#);
    }
}
