//! Favorites commands - list, add and remove saved recipes

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use souschef_core::{Favorite, LogEvent, OperationResult};

use super::{get_context, get_logger, log_event, read_piped_stdin};
use crate::output;

#[derive(Subcommand)]
pub enum FavoritesCommands {
    /// List your saved recipes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a recipe (from TEXT, --file, or stdin)
    Add {
        /// Recipe text
        text: Option<String>,
        /// Read the recipe from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a saved recipe
    Remove {
        /// Favorite ID (see `chef favorites list`)
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl FavoritesCommands {
    pub fn name(&self) -> &'static str {
        match self {
            FavoritesCommands::List { .. } => "favorites list",
            FavoritesCommands::Add { .. } => "favorites add",
            FavoritesCommands::Remove { .. } => "favorites remove",
        }
    }

    pub fn json(&self) -> bool {
        match self {
            FavoritesCommands::List { json }
            | FavoritesCommands::Add { json, .. }
            | FavoritesCommands::Remove { json, .. } => *json,
        }
    }
}

pub async fn run(command: FavoritesCommands) -> Result<()> {
    match command {
        FavoritesCommands::List { json } => list(json).await,
        FavoritesCommands::Add { text, file, json } => add(text, file, json).await,
        FavoritesCommands::Remove { id, force, json } => remove(id, force, json).await,
    }
}

fn print_favorites(favorites: &[Favorite]) {
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Recipe", "Lines"]);
    for favorite in favorites {
        table.add_row(vec![
            favorite.id.to_string(),
            favorite.title().to_string(),
            favorite.recipe.lines().count().to_string(),
        ]);
    }
    println!("{}", table);
}

async fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let signed_in = ctx.current_identity().await?.is_some();
    let favorites = ctx.favorites()?.fetch_all().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&favorites))?);
        return Ok(());
    }

    if !signed_in {
        output::info("Not signed in. Run 'chef login' to see your favorites.");
        return Ok(());
    }
    if favorites.is_empty() {
        println!("No favorites yet. Try 'chef generate <ingredients> --save'.");
        return Ok(());
    }

    print_favorites(&favorites);
    println!("{}", format!("{} saved recipe(s)", favorites.len()).dimmed());
    Ok(())
}

async fn add(text: Option<String>, file: Option<PathBuf>, json: bool) -> Result<()> {
    let recipe = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read recipe from {:?}", path))?,
        (None, None) => read_piped_stdin()?
            .ok_or_else(|| anyhow::anyhow!("No recipe provided. Pass TEXT, --file, or pipe it on stdin."))?,
    };

    let ctx = get_context()?;
    ctx.favorites()?.add(&recipe).await?;
    log_event(get_logger(), LogEvent::new("favorite_added").with_command("favorites add"));

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(()))?);
    } else {
        output::success("Saved to favorites.");
    }
    Ok(())
}

/// Whether to ask before deleting. JSON output has no prompt, so it needs --force.
fn confirmation_required(force: bool, json: bool) -> Result<bool> {
    match (force, json) {
        (true, _) => Ok(false),
        (false, true) => anyhow::bail!("Removing a favorite needs confirmation. Pass --force with --json."),
        (false, false) => Ok(true),
    }
}

async fn remove(id: i64, force: bool, json: bool) -> Result<()> {
    let ask = confirmation_required(force, json)?;
    let ctx = get_context()?;
    let favorites = ctx.favorites()?;

    if ask {
        if !Confirm::new()
            .with_prompt(format!("Remove favorite {}?", id))
            .default(false)
            .interact()?
        {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let remaining = favorites.delete(id).await?;
    log_event(get_logger(), LogEvent::new("favorite_removed").with_command("favorites remove"));

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&remaining))?);
    } else {
        output::success(&format!("Favorite {} removed", id));
        println!("{}", format!("{} saved recipe(s) left", remaining.len()).dimmed());
    }
    Ok(())
}
