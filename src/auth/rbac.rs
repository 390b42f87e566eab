use super::{Role, Session, ViewSection};
use crate::error::AuthError;
use log::debug;
use std::collections::BTreeSet;

/// Sections unlocked by each role, in tab order.
fn sections(role: Role) -> &'static [ViewSection] {
    use ViewSection::*;

    match role {
        Role::Admin => &[Overview, Health, Vaccination, Feed, Financial, AdminPanel],
        Role::Farmer => &[Overview, Health, Vaccination, Feed, Financial],
        Role::Veterinarian => &[Overview, Health, Vaccination, Feed],
    }
}

/// Looks up the capability matrix for `role`.
///
/// # Example
///
/// ```
/// use agrostock_auth::auth::{capabilities_for, Role, ViewSection};
///
/// let sections = capabilities_for(Role::Veterinarian);
/// assert!(sections.contains(&ViewSection::Health));
/// assert!(!sections.contains(&ViewSection::Financial));
/// ```
pub fn capabilities_for(role: Role) -> BTreeSet<ViewSection> {
    sections(role).iter().copied().collect()
}

pub fn can_access(role: Role, section: ViewSection) -> bool {
    sections(role).contains(&section)
}

/// Check that the session's role unlocks `section`.
pub fn authorize(session: &Session, section: ViewSection) -> Result<(), AuthError> {
    if can_access(session.role, section) {
        Ok(())
    } else {
        debug!(
            "Denied {} section to '{}' ({})",
            section, session.identity, session.role
        );
        Err(AuthError::Forbidden {
            role: session.role,
            section,
        })
    }
}

/// Tab captions to render for `role`.
pub fn visible_tabs(role: Role) -> Vec<&'static str> {
    sections(role).iter().map(|s| s.title()).collect()
}
