//! Identity lookup shared by the store-backed services

use crate::domain::result::{Error, Result};
use crate::domain::Identity;
use crate::ports::{Filter, RemoteStore};

/// Current identity, `None` when nobody is signed in
pub async fn resolve_identity(store: &dyn RemoteStore) -> Result<Option<Identity>> {
    store.current_identity().await
}

/// Current identity, or `NotAuthenticated` before any store call is made
pub async fn require_identity(store: &dyn RemoteStore) -> Result<Identity> {
    resolve_identity(store).await?.ok_or(Error::NotAuthenticated)
}

/// Equality filter on an owner column
pub fn owned_by(column: &str, identity: &Identity) -> Filter {
    Filter::eq(column, identity.id.to_string())
}
