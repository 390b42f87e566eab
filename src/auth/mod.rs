use crate::error::{AuthError, ParseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub mod authority;
pub mod rbac;
pub mod registry;
pub mod session;

pub use authority::CredentialAuthority;
pub use rbac::{authorize, can_access, capabilities_for, visible_tabs};
pub use registry::{AccountStatus, DirectoryEntry, PrincipalRegistry, PrincipalSpec};
pub use session::{SessionSlot, SessionState};

/// Trait for verifying a login attempt
pub trait UserAuthenticator {
    /// Check the credentials and issue a session bound to the principal's role
    fn verify(&self, username: &str, password: &str) -> Result<Session, AuthError>;
}

/// Roles a principal can hold. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Farmer,
    Veterinarian,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Farmer, Role::Veterinarian];

    /// Upper-case text shown in the role badge.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Farmer => "FARMER",
            Role::Veterinarian => "VETERINARIAN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "Admin",
            Role::Farmer => "Farmer",
            Role::Veterinarian => "Veterinarian",
        };
        f.pad(name)
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "farmer" => Ok(Role::Farmer),
            "veterinarian" | "vet" => Ok(Role::Veterinarian),
            _ => Err(ParseError::UnknownRole(s.to_string())),
        }
    }
}

/// Dashboard sections, declared in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewSection {
    Overview,
    Health,
    Vaccination,
    Feed,
    Financial,
    AdminPanel,
}

impl ViewSection {
    pub const ALL: [ViewSection; 6] = [
        ViewSection::Overview,
        ViewSection::Health,
        ViewSection::Vaccination,
        ViewSection::Feed,
        ViewSection::Financial,
        ViewSection::AdminPanel,
    ];

    /// Tab caption.
    pub fn title(&self) -> &'static str {
        match self {
            ViewSection::Overview => "Overview",
            ViewSection::Health => "Cattle Health",
            ViewSection::Vaccination => "Vaccination",
            ViewSection::Feed => "Feed",
            ViewSection::Financial => "Financial",
            ViewSection::AdminPanel => "Admin",
        }
    }
}

impl fmt::Display for ViewSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.title())
    }
}

impl FromStr for ViewSection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(ViewSection::Overview),
            "health" | "cattle_health" => Ok(ViewSection::Health),
            "vaccination" => Ok(ViewSection::Vaccination),
            "feed" => Ok(ViewSection::Feed),
            "financial" => Ok(ViewSection::Financial),
            "admin" | "admin_panel" => Ok(ViewSection::AdminPanel),
            _ => Err(ParseError::UnknownSection(s.to_string())),
        }
    }
}

/// One-way SHA-256 digest of a password.
#[derive(Clone, PartialEq, Eq)]
pub struct Verifier([u8; 32]);

impl Verifier {
    pub fn from_password(password: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Verifier(digest)
    }

    /// Parse a hex-encoded digest. Returns `None` unless it decodes to exactly 32 bytes.
    pub fn from_hex(digest: &str) -> Option<Self> {
        let bytes = hex::decode(digest.trim()).ok()?;
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(Verifier(array))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Constant-time comparison against another digest.
    pub fn matches(&self, other: &Verifier) -> bool {
        constant_time_eq::constant_time_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Verifier(..)")
    }
}

/// A registered identity.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
    pub password_verifier: Verifier,
    pub role: Role,
    /// Farm or clinic name shown next to the role badge
    pub display_name: String,
    pub contact_email: String,
}

/// Runtime record of a successfully authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub identity: String,
    pub role: Role,
    pub display_name: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn issue(principal: &Principal) -> Self {
        Session {
            id: Uuid::new_v4(),
            identity: principal.username.clone(),
            role: principal.role,
            display_name: principal.display_name.clone(),
            issued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Farmer".parse::<Role>().unwrap(), Role::Farmer);
        assert_eq!("vet".parse::<Role>().unwrap(), Role::Veterinarian);
        assert_eq!("veterinarian".parse::<Role>().unwrap(), Role::Veterinarian);
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(ParseError::UnknownRole("superuser".to_string()))
        );
    }

    #[test]
    fn test_role_serde_names() {
        assert_eq!(serde_json::to_string(&Role::Veterinarian).unwrap(), "\"veterinarian\"");
        let role: Role = serde_json::from_str("\"farmer\"").unwrap();
        assert_eq!(role, Role::Farmer);
    }

    #[test]
    fn test_section_parsing() {
        assert_eq!("Financial".parse::<ViewSection>(), Ok(ViewSection::Financial));
        assert_eq!("admin".parse::<ViewSection>(), Ok(ViewSection::AdminPanel));
        let err = "barn".parse::<ViewSection>().unwrap_err();
        assert_eq!(err, ParseError::UnknownSection("barn".to_string()));
        assert_eq!(err.to_string(), "unknown section 'barn'");
    }

    #[test]
    fn test_sections_sort_in_tab_order() {
        let mut sections = vec![ViewSection::AdminPanel, ViewSection::Overview, ViewSection::Feed];
        sections.sort();
        assert_eq!(
            sections,
            vec![ViewSection::Overview, ViewSection::Feed, ViewSection::AdminPanel]
        );
        assert_eq!(ViewSection::Health.title(), "Cattle Health");
    }

    #[test]
    fn test_verifier_known_digest() {
        // sha256("admin123")
        let expected = "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9";
        let verifier = Verifier::from_password("admin123");
        assert_eq!(verifier.to_hex(), expected);
        assert!(verifier.matches(&Verifier::from_hex(expected).unwrap()));
        assert!(!verifier.matches(&Verifier::from_password("admin124")));
    }

    #[test]
    fn test_verifier_rejects_bad_hex() {
        assert!(Verifier::from_hex("not-hex").is_none());
        assert!(Verifier::from_hex("abcd").is_none());
    }

    #[test]
    fn test_verifier_debug_hides_digest() {
        let verifier = Verifier::from_password("secret");
        assert_eq!(format!("{:?}", verifier), "Verifier(..)");
    }
}
