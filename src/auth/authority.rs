use super::rbac::authorize;
use super::registry::{DirectoryEntry, PrincipalRegistry};
use super::{Session, UserAuthenticator, Verifier, ViewSection};
use crate::error::AuthError;
use log::{info, warn};

/// Verifies credentials against an immutable registry and issues sessions.
///
/// Holds no mutable state, so one instance can serve any number of calls.
#[derive(Debug)]
pub struct CredentialAuthority {
    registry: PrincipalRegistry,
}

impl CredentialAuthority {
    pub fn new(registry: PrincipalRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PrincipalRegistry {
        &self.registry
    }

    /// Verify a `(username, password)` pair.
    ///
    /// The supplied password is always hashed and always compared once, against
    /// the dummy verifier when the username is absent, so an unknown user and a
    /// wrong password follow the same path and fail with the same error.
    pub fn verify(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let candidate = Verifier::from_password(password);
        let principal = self.registry.get(username);

        let stored = match principal {
            Some(p) => &p.password_verifier,
            None => self.registry.dummy_verifier(),
        };
        let digest_matches = candidate.matches(stored);

        match principal {
            Some(principal) if digest_matches => {
                let session = Session::issue(principal);
                info!(
                    "User '{}' logged in as {}",
                    session.identity, session.role
                );
                Ok(session)
            }
            _ => {
                warn!("Rejected login attempt for '{}'", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Admin-panel user listing, available only to roles that unlock it.
    pub fn user_directory(&self, session: &Session) -> Result<Vec<DirectoryEntry>, AuthError> {
        authorize(session, ViewSection::AdminPanel)?;
        Ok(self.registry.directory())
    }
}

impl UserAuthenticator for CredentialAuthority {
    fn verify(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        CredentialAuthority::verify(self, username, password)
    }
}
