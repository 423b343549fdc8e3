//! Configuration management
//!
//! Settings live in `settings.json` in the app directory:
//! ```json
//! {
//!   "store": { "url": "https://xyz.supabase.co", "anonKey": "...", "profileTable": "profiles" },
//!   "completion": { "baseUrl": "https://api.openai.com/v1", "model": "gpt-4" }
//! }
//! ```
//! Environment variables override the file. The OpenAI API key is only ever
//! read from the environment and is never written back.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::adapters::openai::{OPENAI_API_KEY_ENV, OPENAI_BASE_URL_ENV};
use crate::adapters::supabase::{SUPABASE_ANON_KEY_ENV, SUPABASE_URL_ENV};
use crate::services::profile::DEFAULT_PROFILE_TABLE;
use crate::services::recipe::DEFAULT_MODEL;

/// Environment variable to override the completion model
pub const MODEL_ENV: &str = "SOUSCHEF_MODEL";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    store: StoreSettings,
    #[serde(default)]
    completion: CompletionSettings,
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anon_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_table: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

/// SousChef configuration (settings merged with environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub profile_table: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub model: String,
    _raw_settings: SettingsFile,
    _env: EnvOverrides,
}

/// Values that came from the environment rather than settings.json
#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    openai_base_url: Option<String>,
    model: Option<String>,
}

/// Value to write for a field the environment can override.
///
/// While the value is still the one the environment supplied, the file keeps
/// what it had before.
fn file_value(current: Option<&String>, from_env: Option<&String>, in_file: Option<String>) -> Option<String> {
    match (current, from_env) {
        (Some(value), Some(env)) if value == env => in_file,
        (current, _) => current.cloned(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            profile_table: DEFAULT_PROFILE_TABLE.to_string(),
            openai_api_key: None,
            openai_base_url: None,
            model: DEFAULT_MODEL.to_string(),
            _raw_settings: SettingsFile::default(),
            _env: EnvOverrides::default(),
        }
    }
}

impl Config {
    /// Load config from the app directory, applying environment overrides
    pub fn load(app_dir: &Path) -> Result<Self> {
        Self::load_with_env(app_dir, |name| std::env::var(name).ok())
    }

    /// Load config with a custom environment lookup
    pub fn load_with_env(app_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());
        let overrides = EnvOverrides {
            supabase_url: lookup(SUPABASE_URL_ENV),
            supabase_anon_key: lookup(SUPABASE_ANON_KEY_ENV),
            openai_base_url: lookup(OPENAI_BASE_URL_ENV),
            model: lookup(MODEL_ENV),
        };

        Ok(Self {
            supabase_url: overrides.supabase_url.clone().or_else(|| raw.store.url.clone()),
            supabase_anon_key: overrides
                .supabase_anon_key
                .clone()
                .or_else(|| raw.store.anon_key.clone()),
            profile_table: raw
                .store
                .profile_table
                .clone()
                .unwrap_or_else(|| DEFAULT_PROFILE_TABLE.to_string()),
            openai_api_key: lookup(OPENAI_API_KEY_ENV),
            openai_base_url: overrides
                .openai_base_url
                .clone()
                .or_else(|| raw.completion.base_url.clone()),
            model: overrides
                .model
                .clone()
                .or_else(|| raw.completion.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            _raw_settings: raw,
            _env: overrides,
        })
    }

    /// Save config to the app directory.
    ///
    /// Keys this version does not know about are preserved. Values that only
    /// came from the environment are not written, and neither is the API key.
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        let env = &self._env;
        settings.store.url = file_value(
            self.supabase_url.as_ref(),
            env.supabase_url.as_ref(),
            settings.store.url.take(),
        );
        settings.store.anon_key = file_value(
            self.supabase_anon_key.as_ref(),
            env.supabase_anon_key.as_ref(),
            settings.store.anon_key.take(),
        );
        settings.store.profile_table = Some(self.profile_table.clone());
        settings.completion.base_url = file_value(
            self.openai_base_url.as_ref(),
            env.openai_base_url.as_ref(),
            settings.completion.base_url.take(),
        );
        settings.completion.model = file_value(
            Some(&self.model),
            env.model.as_ref(),
            settings.completion.model.take(),
        );

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Whether both Supabase settings are present
    pub fn has_store(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }
}
