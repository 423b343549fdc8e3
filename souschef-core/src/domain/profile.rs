//! Profile domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user profile row, keyed by the identity id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Fields to change on a profile; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Profile {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            username: None,
            email: None,
            phone: None,
        }
    }

    /// Apply an update, returning the merged profile
    pub fn merged(mut self, update: ProfileUpdate) -> Self {
        if update.username.is_some() {
            self.username = update.username;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.username = Some("chef".to_string());
        profile.phone = Some("555-0100".to_string());

        let merged = profile.merged(ProfileUpdate {
            email: Some("chef@example.com".to_string()),
            ..Default::default()
        });

        assert_eq!(merged.username.as_deref(), Some("chef"));
        assert_eq!(merged.email.as_deref(), Some("chef@example.com"));
        assert_eq!(merged.phone.as_deref(), Some("555-0100"));
    }
}
