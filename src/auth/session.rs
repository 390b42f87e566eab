use super::{Session, UserAuthenticator};
use crate::error::AuthError;
use crate::security::LoginThrottle;
use log::{info, warn};

/// Login state of the process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(Session),
}

/// The single session slot owned by an interactive process.
///
/// `LoggedOut --login--> LoggedIn --end_session/logout--> LoggedOut`. A second
/// login while logged in is refused; the caller must log out first.
#[derive(Debug)]
pub struct SessionSlot {
    state: SessionState,
    throttle: LoginThrottle,
}

impl Default for SessionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::with_throttle(LoginThrottle::disabled())
    }

    pub fn with_throttle(throttle: LoginThrottle) -> Self {
        Self {
            state: SessionState::LoggedOut,
            throttle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current(&self) -> Option<&Session> {
        match &self.state {
            SessionState::LoggedIn(session) => Some(session),
            SessionState::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    /// Verify credentials and move to `LoggedIn`.
    ///
    /// On any failure the slot is left untouched.
    pub fn login<A: UserAuthenticator + ?Sized>(
        &mut self,
        authenticator: &A,
        username: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if let Some(active) = self.current() {
            warn!(
                "Login as '{}' refused: '{}' is still logged in",
                username, active.identity
            );
            return Err(AuthError::SessionActive);
        }

        if self.throttle.is_locked(username) {
            warn!("Login for '{}' throttled", username);
            return Err(AuthError::RateLimited);
        }

        match authenticator.verify(username, password) {
            Ok(session) => {
                self.throttle.reset(username);
                self.state = SessionState::LoggedIn(session.clone());
                Ok(session)
            }
            Err(err) => {
                self.throttle.record_failure(username);
                Err(err)
            }
        }
    }

    /// End `session` if it is the one held here. Otherwise does nothing, so
    /// repeated calls with the same session are harmless.
    pub fn end_session(&mut self, session: &Session) {
        let held = matches!(&self.state, SessionState::LoggedIn(current) if current.id == session.id);
        if held {
            info!("User '{}' logged out", session.identity);
            self.state = SessionState::LoggedOut;
        }
    }

    /// End whatever session is active.
    pub fn logout(&mut self) -> Option<Session> {
        match std::mem::take(&mut self.state) {
            SessionState::LoggedIn(session) => {
                info!("User '{}' logged out", session.identity);
                Some(session)
            }
            SessionState::LoggedOut => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialAuthority, PrincipalRegistry, Role};
    use chrono::Duration;

    fn authority() -> CredentialAuthority {
        CredentialAuthority::new(PrincipalRegistry::demo())
    }

    #[test]
    fn test_initial_state_logged_out() {
        let slot = SessionSlot::new();
        assert_eq!(slot.state(), &SessionState::LoggedOut);
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_login_then_end_session() {
        let authority = authority();
        let mut slot = SessionSlot::new();

        let session = slot.login(&authority, "farmer", "farmer123").unwrap();
        assert_eq!(session.role, Role::Farmer);
        assert!(slot.is_logged_in());

        slot.end_session(&session);
        assert!(!slot.is_logged_in());

        // second call is a no-op
        slot.end_session(&session);
        assert_eq!(slot.state(), &SessionState::LoggedOut);
    }

    #[test]
    fn test_failed_login_keeps_logged_out() {
        let authority = authority();
        let mut slot = SessionSlot::new();
        assert_eq!(
            slot.login(&authority, "admin", "wrongpass").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(slot.state(), &SessionState::LoggedOut);
    }

    #[test]
    fn test_relogin_requires_logout() {
        let authority = authority();
        let mut slot = SessionSlot::new();
        slot.login(&authority, "vet", "vet123").unwrap();

        assert_eq!(
            slot.login(&authority, "admin", "admin123").unwrap_err(),
            AuthError::SessionActive
        );
        assert_eq!(slot.current().unwrap().identity, "vet");

        assert_eq!(slot.logout().unwrap().identity, "vet");
        assert_eq!(
            slot.login(&authority, "admin", "admin123").unwrap().role,
            Role::Admin
        );
    }

    #[test]
    fn test_stale_session_does_not_end_current() {
        let authority = authority();
        let mut slot = SessionSlot::new();

        let old = slot.login(&authority, "vet", "vet123").unwrap();
        slot.end_session(&old);
        slot.login(&authority, "farmer", "farmer123").unwrap();

        slot.end_session(&old);
        assert_eq!(slot.current().unwrap().identity, "farmer");
    }

    #[test]
    fn test_logout_when_logged_out() {
        let mut slot = SessionSlot::new();
        assert!(slot.logout().is_none());
    }

    #[test]
    fn test_throttle_blocks_after_failures() {
        let authority = authority();
        let mut slot = SessionSlot::with_throttle(LoginThrottle::new(2, Duration::seconds(300)));

        for _ in 0..2 {
            assert_eq!(
                slot.login(&authority, "admin", "nope").unwrap_err(),
                AuthError::InvalidCredentials
            );
        }
        assert_eq!(
            slot.login(&authority, "admin", "admin123").unwrap_err(),
            AuthError::RateLimited
        );
        // other usernames are unaffected
        assert!(slot.login(&authority, "vet", "vet123").is_ok());
    }

    #[test]
    fn test_throttle_treats_unknown_users_alike() {
        let authority = authority();
        let mut slot = SessionSlot::with_throttle(LoginThrottle::new(1, Duration::seconds(300)));
        slot.login(&authority, "nobody", "x").unwrap_err();
        slot.login(&authority, "admin", "x").unwrap_err();
        assert_eq!(
            slot.login(&authority, "nobody", "x").unwrap_err(),
            slot.login(&authority, "admin", "x").unwrap_err()
        );
    }
}
