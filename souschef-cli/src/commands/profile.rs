//! Profile commands - show and edit the signed-in user's profile

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Input;
use souschef_core::{LogEvent, OperationResult, Profile, ProfileUpdate};

use super::{get_context, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show your profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields (prompts when no flag is given)
    Set {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ProfileCommands {
    pub fn name(&self) -> &'static str {
        match self {
            ProfileCommands::Show { .. } => "profile show",
            ProfileCommands::Set { .. } => "profile set",
        }
    }

    pub fn json(&self) -> bool {
        match self {
            ProfileCommands::Show { json } | ProfileCommands::Set { json, .. } => *json,
        }
    }
}

pub async fn run(command: ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::Show { json } => show(json).await,
        ProfileCommands::Set { username, email, phone, json } => {
            set(ProfileUpdate { username, email, phone }, json).await
        }
    }
}

fn print_profile(profile: &Profile) {
    let mut table = output::create_table();
    let unset = || "-".dimmed().to_string();
    table.add_row(vec!["Username".to_string(), profile.username.clone().unwrap_or_else(unset)]);
    table.add_row(vec!["Email".to_string(), profile.email.clone().unwrap_or_else(unset)]);
    table.add_row(vec!["Phone".to_string(), profile.phone.clone().unwrap_or_else(unset)]);
    println!("{}", table);
}

async fn show(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let profile = ctx.profiles()?.get().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&profile))?);
        return Ok(());
    }

    match profile {
        Some(profile) => print_profile(&profile),
        None => output::info("No profile yet. Run 'chef profile set' to create one."),
    }
    Ok(())
}

/// Ask for each field, prefilled with the stored value; blank keeps it
fn prompt_update(current: Option<&Profile>) -> Result<ProfileUpdate> {
    let ask = |label: &str, value: Option<&String>| -> Result<Option<String>> {
        let answer: String = Input::new()
            .with_prompt(label)
            .with_initial_text(value.cloned().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        let answer = answer.trim().to_string();
        Ok((!answer.is_empty() && Some(&answer) != value).then_some(answer))
    };

    Ok(ProfileUpdate {
        username: ask("Username", current.and_then(|p| p.username.as_ref()))?,
        email: ask("Email", current.and_then(|p| p.email.as_ref()))?,
        phone: ask("Phone", current.and_then(|p| p.phone.as_ref()))?,
    })
}

async fn set(update: ProfileUpdate, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let profiles = ctx.profiles()?;

    let nothing_given = update.username.is_none() && update.email.is_none() && update.phone.is_none();
    let update = if nothing_given && !json && atty::is(atty::Stream::Stdin) {
        let current = profiles.get().await?;
        prompt_update(current.as_ref())?
    } else {
        update
    };

    let profile = profiles.update(update).await?;
    log_event(get_logger(), LogEvent::new("profile_updated").with_command("profile set"));

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&profile))?);
    } else {
        output::success("Profile saved.");
        print_profile(&profile);
    }
    Ok(())
}
