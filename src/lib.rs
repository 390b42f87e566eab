use crate::auth::{CredentialAuthority, SessionSlot};
use crate::config::AuthConfig;

// Expose the auth, config, error, and security modules
pub mod auth;
pub mod config;
pub mod error;
pub mod security;

pub use auth::{Role, Session, ViewSection};
pub use error::{AuthError, ConfigError};

/// Build the authority and an empty session slot from configuration.
pub fn bootstrap(config: &AuthConfig) -> Result<(CredentialAuthority, SessionSlot), ConfigError> {
    let registry = config.load_registry()?;
    let authority = CredentialAuthority::new(registry);
    let slot = SessionSlot::with_throttle(config.login_throttle());
    Ok((authority, slot))
}
