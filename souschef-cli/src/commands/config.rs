//! Config command - view and edit settings.json

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use souschef_core::config::Config;

use super::get_app_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings (file merged with environment)
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write settings to settings.json
    Set {
        /// Supabase project URL
        #[arg(long)]
        supabase_url: Option<String>,
        /// Supabase anon (public) key
        #[arg(long)]
        anon_key: Option<String>,
        /// Table holding user profiles
        #[arg(long)]
        profile_table: Option<String>,
        /// OpenAI-compatible base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Completion model
        #[arg(long)]
        model: Option<String>,
    },
}

impl ConfigCommands {
    pub fn json(&self) -> bool {
        matches!(self, ConfigCommands::Show { json: true })
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(6).collect();
    format!("{}…", visible)
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let app_dir = get_app_dir();
    std::fs::create_dir_all(&app_dir)?;
    let mut config = Config::load(&app_dir)?;

    match command {
        ConfigCommands::Show { json } => {
            let anon_key = config.supabase_anon_key.as_deref().map(mask);
            let api_key = config.openai_api_key.as_deref().map(mask);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "supabase_url": config.supabase_url,
                        "supabase_anon_key": anon_key,
                        "profile_table": config.profile_table,
                        "openai_base_url": config.openai_base_url,
                        "openai_api_key": api_key,
                        "model": config.model,
                        "app_dir": app_dir.to_string_lossy(),
                    }))?
                );
                return Ok(());
            }

            let unset = || "(not set)".dimmed().to_string();
            let mut table = output::create_table();
            table.add_row(vec!["Supabase URL".to_string(), config.supabase_url.clone().unwrap_or_else(unset)]);
            table.add_row(vec!["Anon key".to_string(), anon_key.unwrap_or_else(unset)]);
            table.add_row(vec!["Profile table".to_string(), config.profile_table.clone()]);
            table.add_row(vec![
                "Completion URL".to_string(),
                config.openai_base_url.clone().unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            ]);
            table.add_row(vec!["API key".to_string(), api_key.unwrap_or_else(unset)]);
            table.add_row(vec!["Model".to_string(), config.model.clone()]);
            println!("{}", table);
            println!("{}", format!("Settings: {}", app_dir.join("settings.json").display()).dimmed());

            if !config.has_store() {
                output::warning("Favorites and sign-in need SUPABASE_URL and SUPABASE_ANON_KEY.");
            }
        }
        ConfigCommands::Set {
            supabase_url,
            anon_key,
            profile_table,
            base_url,
            model,
        } => {
            if supabase_url.is_none()
                && anon_key.is_none()
                && profile_table.is_none()
                && base_url.is_none()
                && model.is_none()
            {
                anyhow::bail!("Nothing to set. See 'chef config set --help'.");
            }

            if let Some(url) = supabase_url {
                config.supabase_url = Some(url);
            }
            if let Some(key) = anon_key {
                config.supabase_anon_key = Some(key);
            }
            if let Some(table) = profile_table {
                config.profile_table = table;
            }
            if let Some(url) = base_url {
                config.openai_base_url = Some(url);
            }
            if let Some(model) = model {
                config.model = model;
            }

            config.save(&app_dir)?;
            output::success("Settings saved.");
            output::info("The OpenAI API key is read from OPENAI_API_KEY and never stored.");
        }
    }

    Ok(())
}
