//! Profile service - the signed-in user's profile row

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::{Profile, ProfileUpdate};
use crate::ports::{RemoteStore, Row};
use crate::services::identity::{owned_by, require_identity};

pub const DEFAULT_PROFILE_TABLE: &str = "profiles";
const PROFILE_COLUMNS: &[&str] = &["id", "username", "email", "phone"];

/// Profile reads/writes and sign-out
pub struct ProfileService {
    store: Arc<dyn RemoteStore>,
    table: String,
}

impl ProfileService {
    pub fn new(store: Arc<dyn RemoteStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// The signed-in user's profile, `None` if no row exists yet
    pub async fn get(&self) -> Result<Option<Profile>> {
        let identity = require_identity(self.store.as_ref()).await?;
        let rows = self
            .store
            .select(&self.table, PROFILE_COLUMNS, &[owned_by("id", &identity)])
            .await?;

        rows.into_iter().next().map(parse_profile).transpose()
    }

    /// Create or update the signed-in user's profile.
    ///
    /// A missing email falls back to the one on the identity.
    pub async fn update(&self, update: ProfileUpdate) -> Result<Profile> {
        let identity = require_identity(self.store.as_ref()).await?;
        let current = self
            .store
            .select(&self.table, PROFILE_COLUMNS, &[owned_by("id", &identity)])
            .await?
            .into_iter()
            .next()
            .map(parse_profile)
            .transpose()?
            .unwrap_or_else(|| Profile::new(identity.id));

        let mut profile = current.merged(update);
        if profile.email.is_none() {
            profile.email = identity.email.clone();
        }

        let row = match serde_json::to_value(&profile)? {
            JsonValue::Object(row) => row,
            _ => return Err(Error::validation("Profile did not serialize to an object")),
        };
        self.store.upsert(&self.table, &row).await?;
        Ok(profile)
    }

    /// End the current session
    pub async fn sign_out(&self) -> Result<()> {
        self.store.sign_out().await
    }
}

fn parse_profile(row: Row) -> Result<Profile> {
    serde_json::from_value(JsonValue::Object(row))
        .map_err(|e| Error::remote(format!("Malformed profile row: {}", e)))
}
