//! SousChef Core - recipe generation and synced favorites
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: entities (Favorite, Identity, RecipeDraft, Profile) and errors
//! - **ports**: traits for the hosted store and the completion service
//! - **services**: favorites sync, recipe generation, profile, event log
//! - **adapters**: Supabase, OpenAI and in-memory implementations of the ports

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;
pub mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::openai::OpenAiClient;
use adapters::supabase::SupabaseClient;
use config::Config;
use ports::{CompletionClient, RemoteStore};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{Favorite, Identity, Profile, ProfileUpdate, RecipeDraft, Session};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for SousChef operations
///
/// Builds the store and completion clients once at start-up and hands them to
/// the services. A service whose client is not configured is unavailable and
/// its accessor returns a configuration error.
pub struct SousChefContext {
    pub config: Config,
    pub app_dir: PathBuf,
    supabase: Option<Arc<SupabaseClient>>,
    store: Option<Arc<dyn RemoteStore>>,
    favorites_service: Option<FavoritesService>,
    profile_service: Option<ProfileService>,
    recipe_service: Option<RecipeService>,
}

impl SousChefContext {
    /// Create a context from the settings and session stored in `app_dir`
    pub fn new(app_dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(app_dir)?;

        let supabase = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Some(Arc::new(
                SupabaseClient::new(url, key)?
                    .persist_sessions_in(app_dir)
                    .with_session(session::load_session(app_dir)),
            )),
            _ => None,
        };

        let completion: Option<Arc<dyn CompletionClient>> = match &config.openai_api_key {
            Some(key) => {
                let client = match &config.openai_base_url {
                    Some(base_url) => OpenAiClient::new_with_base_url(key, base_url)?,
                    None => OpenAiClient::new(key)?,
                };
                Some(Arc::new(client))
            }
            None => None,
        };

        let store = supabase.clone().map(|s| s as Arc<dyn RemoteStore>);
        let mut ctx = Self::build(config, app_dir.to_path_buf(), store, completion);
        ctx.supabase = supabase;
        Ok(ctx)
    }

    /// Create a context around already-constructed clients
    pub fn from_clients(
        config: Config,
        app_dir: &Path,
        store: Arc<dyn RemoteStore>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self::build(config, app_dir.to_path_buf(), Some(store), Some(completion))
    }

    fn build(
        config: Config,
        app_dir: PathBuf,
        store: Option<Arc<dyn RemoteStore>>,
        completion: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        let favorites_service = store.clone().map(FavoritesService::new);
        let profile_service = store
            .clone()
            .map(|s| ProfileService::new(s, config.profile_table.clone()));
        let recipe_service = completion.map(|c| RecipeService::new(c, config.model.clone()));

        Self {
            config,
            app_dir,
            supabase: None,
            store,
            favorites_service,
            profile_service,
            recipe_service,
        }
    }

    pub fn favorites(&self) -> Result<&FavoritesService> {
        self.favorites_service.as_ref().ok_or_else(store_not_configured)
    }

    pub fn profiles(&self) -> Result<&ProfileService> {
        self.profile_service.as_ref().ok_or_else(store_not_configured)
    }

    pub fn recipes(&self) -> Result<&RecipeService> {
        self.recipe_service.as_ref().ok_or_else(|| {
            Error::config("Recipe generation is not configured. Set OPENAI_API_KEY.")
        })
    }

    /// The signed-in identity, `None` when signed out
    pub async fn current_identity(&self) -> Result<Option<Identity>> {
        let store = self.store.as_ref().ok_or_else(store_not_configured)?;
        services::identity::resolve_identity(store.as_ref()).await
    }

    /// Sign in with email + password and remember the session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let supabase = self.supabase.as_ref().ok_or_else(store_not_configured)?;
        let session = supabase.sign_in_with_password(email, password).await?;
        session::save_session(&self.app_dir, &session)?;
        Ok(session)
    }

    /// Create an account; remembers the session when one is issued right away
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let supabase = self.supabase.as_ref().ok_or_else(store_not_configured)?;
        let session = supabase.sign_up(email, password).await?;
        if let Some(session) = &session {
            session::save_session(&self.app_dir, session)?;
        }
        Ok(session)
    }

    /// End the session and forget it locally
    pub async fn sign_out(&self) -> Result<()> {
        self.profiles()?.sign_out().await?;
        session::clear_session(&self.app_dir)
    }
}

fn store_not_configured() -> Error {
    Error::config("Supabase is not configured. Set SUPABASE_URL and SUPABASE_ANON_KEY.")
}
