use super::{Principal, Role, Verifier};
use crate::error::ConfigError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

// Stands in for a real verifier when the username is not registered.
const DUMMY_SECRET: &str = "agrostock:absent-principal";

// username, password, role, display name, contact email
const DEMO_ACCOUNTS: [(&str, &str, Role, &str, &str); 3] = [
    ("admin", "admin123", Role::Admin, "AgroStock HQ", "admin@agrostock.com"),
    ("farmer", "farmer123", Role::Farmer, "Green Valley Farm", "farmer@greenfarm.com"),
    ("vet", "vet123", Role::Veterinarian, "Animal Care Clinic", "vet@animalcare.com"),
];

/// Registry entry as written in a principals file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalSpec {
    pub username: String,
    /// Hex-encoded SHA-256 digest of the password
    pub password_sha256: String,
    pub role: Role,
    pub display_name: String,
    pub contact_email: String,
}

impl PrincipalSpec {
    /// Build a spec from a plaintext password. The password is hashed here, once.
    pub fn with_password(
        username: &str,
        password: &str,
        role: Role,
        display_name: &str,
        contact_email: &str,
    ) -> Self {
        PrincipalSpec {
            username: username.to_string(),
            password_sha256: Verifier::from_password(password).to_hex(),
            role,
            display_name: display_name.to_string(),
            contact_email: contact_email.to_string(),
        }
    }

    fn into_principal(self) -> Result<Principal, ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        let password_verifier = Verifier::from_hex(&self.password_sha256)
            .ok_or_else(|| ConfigError::InvalidVerifier(self.username.clone()))?;

        Ok(Principal {
            username: self.username,
            password_verifier,
            role: self.role,
            display_name: self.display_name,
            contact_email: self.contact_email,
        })
    }
}

/// Account state shown in the admin panel. Registered accounts are always active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountStatus {
    Active,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Active => f.pad("Active"),
        }
    }
}

/// Admin-panel listing of a principal. Carries no verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub username: String,
    pub role: Role,
    pub contact_email: String,
    pub display_name: String,
    pub status: AccountStatus,
}

/// Immutable username → principal table, fixed at construction.
#[derive(Debug)]
pub struct PrincipalRegistry {
    principals: HashMap<String, Principal>,
    dummy_verifier: Verifier,
}

impl PrincipalRegistry {
    pub fn from_principals<I>(specs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = PrincipalSpec>,
    {
        let mut principals = HashMap::new();
        for spec in specs {
            let principal = spec.into_principal()?;
            if principals.contains_key(&principal.username) {
                return Err(ConfigError::DuplicatePrincipal(principal.username));
            }
            debug!("Registered principal '{}' as {}", principal.username, principal.role);
            principals.insert(principal.username.clone(), principal);
        }

        Ok(Self::with_table(principals))
    }

    fn with_table(principals: HashMap<String, Principal>) -> Self {
        PrincipalRegistry {
            principals,
            dummy_verifier: Verifier::from_password(DUMMY_SECRET),
        }
    }

    /// The three built-in demo accounts.
    pub fn demo() -> Self {
        let principals = DEMO_ACCOUNTS
            .iter()
            .map(|&(username, password, role, display_name, contact_email)| Principal {
                username: username.to_string(),
                password_verifier: Verifier::from_password(password),
                role,
                display_name: display_name.to_string(),
                contact_email: contact_email.to_string(),
            });
        Self::with_table(principals.map(|p| (p.username.clone(), p)).collect())
    }

    /// Parse a JSON array of principal specs.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let specs: Vec<PrincipalSpec> = serde_json::from_str(json)?;
        Self::from_principals(specs)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let registry = Self::from_json(&contents)?;
        info!(
            "Loaded {} principals from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn get(&self, username: &str) -> Option<&Principal> {
        self.principals.get(username)
    }

    pub(crate) fn dummy_verifier(&self) -> &Verifier {
        &self.dummy_verifier
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }

    /// All principals sorted by username, for the admin panel.
    pub fn directory(&self) -> Vec<DirectoryEntry> {
        let mut entries: Vec<DirectoryEntry> = self
            .principals
            .values()
            .map(|p| DirectoryEntry {
                username: p.username.clone(),
                role: p.role,
                contact_email: p.contact_email.clone(),
                display_name: p.display_name.clone(),
                status: AccountStatus::Active,
            })
            .collect();
        entries.sort_by(|a, b| a.username.cmp(&b.username));
        entries
    }
}
