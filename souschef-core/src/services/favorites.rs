//! Favorites service - saved recipes synced with the remote store
//!
//! Every call is scoped to the signed-in identity with an equality filter on
//! `user_id`. The service also keeps the last fetched list and a loading flag
//! for the presentation layer.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::Favorite;
use crate::ports::{Filter, RemoteStore, Row};
use crate::services::identity::{owned_by, require_identity, resolve_identity};

pub const FAVORITES_TABLE: &str = "favorites";
const OWNER_COLUMN: &str = "user_id";
const FAVORITE_COLUMNS: &[&str] = &["id", "recipe", OWNER_COLUMN];

/// What the presentation layer renders
#[derive(Debug, Clone, Default, Serialize)]
pub struct FavoritesState {
    pub favorites: Vec<Favorite>,
    pub loading: bool,
}

/// Clears the loading flag when a fetch ends, including when it is dropped mid-flight
struct LoadingFlag<'a>(&'a Mutex<FavoritesState>);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).loading = false;
    }
}

/// Favorites synchronizer
pub struct FavoritesService {
    store: Arc<dyn RemoteStore>,
    state: Mutex<FavoritesState>,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            state: Mutex::new(FavoritesState::default()),
        }
    }

    /// Snapshot of the current list and loading flag
    pub fn state(&self) -> FavoritesState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, FavoritesState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fetch the signed-in user's favorites.
    ///
    /// Without an identity this is an empty list, not an error. On failure the
    /// previous list is kept; the loading flag is cleared either way.
    pub async fn fetch_all(&self) -> Result<Vec<Favorite>> {
        self.lock().loading = true;
        let _loading = LoadingFlag(&self.state);

        let result = self.load().await;

        if let Ok(favorites) = &result {
            self.lock().favorites = favorites.clone();
        }
        result
    }

    async fn load(&self) -> Result<Vec<Favorite>> {
        let Some(identity) = resolve_identity(self.store.as_ref()).await? else {
            return Ok(Vec::new());
        };

        let rows = self
            .store
            .select(FAVORITES_TABLE, FAVORITE_COLUMNS, &[owned_by(OWNER_COLUMN, &identity)])
            .await?;

        rows.into_iter().map(parse_favorite).collect()
    }

    /// Save a recipe for the signed-in user. The list is not refreshed.
    pub async fn add(&self, recipe_text: &str) -> Result<()> {
        let identity = require_identity(self.store.as_ref()).await?;

        let mut row = Row::new();
        row.insert(OWNER_COLUMN.to_string(), JsonValue::from(identity.id.to_string()));
        row.insert("recipe".to_string(), JsonValue::from(recipe_text));

        self.store.insert(FAVORITES_TABLE, &[row]).await
    }

    /// Delete one of the signed-in user's favorites, then refetch.
    ///
    /// Callers confirm with the user first. Deleting an id that does not exist
    /// succeeds.
    pub async fn delete(&self, favorite_id: i64) -> Result<Vec<Favorite>> {
        let identity = require_identity(self.store.as_ref()).await?;

        self.store
            .delete(
                FAVORITES_TABLE,
                &[owned_by(OWNER_COLUMN, &identity), Filter::eq("id", favorite_id)],
            )
            .await?;

        self.fetch_all().await
    }
}

fn parse_favorite(row: Row) -> Result<Favorite> {
    serde_json::from_value(JsonValue::Object(row))
        .map_err(|e| Error::remote(format!("Malformed favorite row: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::Identity;
    use uuid::Uuid;

    fn setup() -> (Arc<InMemoryStore>, FavoritesService) {
        let store = Arc::new(InMemoryStore::new());
        let service = FavoritesService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_fetch_without_identity_is_empty() {
        let (store, service) = setup();
        store.set_fail_tables(true);

        let favorites = service.fetch_all().await.unwrap();

        assert!(favorites.is_empty());
        assert!(!service.state().loading);
        // Nothing was asked of the tables
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_fetch_delete_scenario() {
        let (store, service) = setup();
        let user = Identity::new(Uuid::new_v4());
        store.sign_in_as(user.clone());

        assert!(service.fetch_all().await.unwrap().is_empty());

        service.add("Pasta recipe...").await.unwrap();
        let favorites = service.fetch_all().await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].recipe, "Pasta recipe...");
        assert_eq!(favorites[0].owner, user.id);

        let after_delete = service.delete(favorites[0].id).await.unwrap();
        assert!(after_delete.is_empty());
        assert!(service.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_keeps_text_verbatim_and_does_not_refresh() {
        let (store, service) = setup();
        store.sign_in_as(Identity::new(Uuid::new_v4()));

        let text = "  Soup\n\n1. Boil water  \n";
        service.add(text).await.unwrap();

        assert!(service.state().favorites.is_empty());
        let favorites = service.fetch_all().await.unwrap();
        assert_eq!(favorites[0].recipe, text);
    }

    #[tokio::test]
    async fn test_add_twice_creates_two_rows() {
        let (store, service) = setup();
        store.sign_in_as(Identity::new(Uuid::new_v4()));

        service.add("Same").await.unwrap();
        service.add("Same").await.unwrap();

        let favorites = service.fetch_all().await.unwrap();
        assert_eq!(favorites.len(), 2);
        assert_ne!(favorites[0].id, favorites[1].id);
    }

    #[tokio::test]
    async fn test_add_and_delete_without_identity_never_reach_store() {
        let (store, service) = setup();

        assert!(matches!(service.add("x").await, Err(Error::NotAuthenticated)));
        assert!(matches!(service.delete(1).await, Err(Error::NotAuthenticated)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_identities_do_not_see_each_other() {
        let (store, service) = setup();
        let alice = Identity::new(Uuid::new_v4());
        let bob = Identity::new(Uuid::new_v4());

        store.sign_in_as(alice.clone());
        service.add("Alice's curry").await.unwrap();
        let alice_favorite = service.fetch_all().await.unwrap()[0].clone();

        store.sign_in_as(bob.clone());
        service.add("Bob's stew").await.unwrap();
        let bobs = service.fetch_all().await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert!(bobs.iter().all(|f| f.owner == bob.id));

        // Bob cannot delete Alice's row by id
        service.delete(alice_favorite.id).await.unwrap();
        store.sign_in_as(alice);
        assert_eq!(service.fetch_all().await.unwrap(), vec![alice_favorite]);
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_ok() {
        let (store, service) = setup();
        store.sign_in_as(Identity::new(Uuid::new_v4()));
        service.add("Keep me").await.unwrap();

        let favorites = service.delete(999).await.unwrap();
        assert_eq!(favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_list() {
        let (store, service) = setup();
        store.sign_in_as(Identity::new(Uuid::new_v4()));
        service.add("Tacos").await.unwrap();
        service.fetch_all().await.unwrap();

        store.set_fail_tables(true);
        let err = service.fetch_all().await.unwrap_err();

        assert!(matches!(err, Error::RemoteFailure(_)));
        let state = service.state();
        assert!(!state.loading);
        assert_eq!(state.favorites.len(), 1);
        assert_eq!(state.favorites[0].recipe, "Tacos");
    }

    /// Store whose identity lookup never completes
    struct StalledStore;

    #[async_trait::async_trait]
    impl RemoteStore for StalledStore {
        async fn current_identity(&self) -> Result<Option<Identity>> {
            std::future::pending().await
        }
        async fn select(&self, _: &str, _: &[&str], _: &[Filter]) -> Result<Vec<Row>> {
            Ok(Vec::new())
        }
        async fn insert(&self, _: &str, _: &[Row]) -> Result<()> {
            Ok(())
        }
        async fn delete(&self, _: &str, _: &[Filter]) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _: &str, _: &Row) -> Result<()> {
            Ok(())
        }
        async fn sign_out(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_abandoned_fetch_clears_loading() {
        let service = FavoritesService::new(Arc::new(StalledStore));

        let fetch = tokio::time::timeout(std::time::Duration::from_millis(20), service.fetch_all());
        assert!(fetch.await.is_err());

        assert!(!service.state().loading);
    }

    #[tokio::test]
    async fn test_delete_failure_leaves_state_unchanged() {
        let (store, service) = setup();
        store.sign_in_as(Identity::new(Uuid::new_v4()));
        service.add("Tacos").await.unwrap();
        let before = service.fetch_all().await.unwrap();

        store.set_fail_tables(true);
        assert!(service.delete(before[0].id).await.is_err());
        store.set_fail_tables(false);

        assert_eq!(service.state().favorites, before);
        assert_eq!(service.fetch_all().await.unwrap(), before);
    }
}
