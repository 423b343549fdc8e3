//! SousChef CLI - recipes from whatever is in your fridge

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{auth, config, favorites, generate, logs, profile};
use souschef_core::LogEvent;

/// SousChef - recipes from whatever is in your fridge
#[derive(Parser)]
#[command(name = "chef", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a recipe from a list of ingredients
    Generate {
        /// Ingredients, free text (e.g. "eggs, spinach, feta")
        ingredients: Vec<String>,
        /// Save the generated recipe to your favorites
        #[arg(long)]
        save: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage saved recipes
    Favorites {
        #[command(subcommand)]
        command: favorites::FavoritesCommands,
    },

    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: profile::ProfileCommands,
    },

    /// View or edit settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Generate { .. } => "generate",
            Commands::Favorites { command } => command.name(),
            Commands::Login { .. } => "login",
            Commands::Signup { .. } => "signup",
            Commands::Logout => "logout",
            Commands::Whoami { .. } => "whoami",
            Commands::Profile { command } => command.name(),
            Commands::Config { .. } => "config",
            Commands::Logs { .. } => "logs",
        }
    }

    /// Whether the command was asked for JSON output
    fn json(&self) -> bool {
        match self {
            Commands::Generate { json, .. } | Commands::Whoami { json } => *json,
            Commands::Favorites { command } => command.json(),
            Commands::Profile { command } => command.json(),
            Commands::Config { command } => command.json(),
            Commands::Logs { command } => command.json(),
            Commands::Login { .. } | Commands::Signup { .. } | Commands::Logout => false,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();
    let json = cli.command.json();

    let logger = commands::get_logger();
    commands::log_event(logger, LogEvent::new("command_executed").with_command(command));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(logger, commands::failure_event("command_failed", command, &e));
            if json {
                let result = commands::failure_result(&e);
                println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
            } else {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate { ingredients, save, json } => {
            generate::run(&ingredients, save, json).await
        }
        Commands::Favorites { command } => favorites::run(command).await,
        Commands::Login { email, password } => auth::login(email, password).await,
        Commands::Signup { email, password } => auth::signup(email, password).await,
        Commands::Logout => auth::logout().await,
        Commands::Whoami { json } => auth::whoami(json).await,
        Commands::Profile { command } => profile::run(command).await,
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
