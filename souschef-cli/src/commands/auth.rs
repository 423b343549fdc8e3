//! Auth commands - login, signup, logout, whoami

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use souschef_core::{LogEvent, OperationResult};

use super::{get_context, get_logger, log_event};
use crate::output;

fn email_or_prompt(email: Option<String>) -> Result<String> {
    match email {
        Some(e) => Ok(e),
        None => Ok(Input::<String>::new().with_prompt("Email").interact_text()?),
    }
}

pub async fn login(email: Option<String>, password: Option<String>) -> Result<()> {
    let ctx = get_context()?;
    let email = email_or_prompt(email)?;
    let password = match password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let session = ctx.sign_in(&email, &password).await?;
    log_event(get_logger(), LogEvent::new("signed_in").with_command("login"));

    let who = session
        .user
        .and_then(|u| u.email)
        .unwrap_or(email);
    output::success(&format!("Signed in as {}", who));
    Ok(())
}

pub async fn signup(email: Option<String>, password: Option<String>) -> Result<()> {
    let ctx = get_context()?;
    let email = email_or_prompt(email)?;
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Choose a password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let session = ctx.sign_up(&email, &password).await?;
    log_event(get_logger(), LogEvent::new("signed_up").with_command("signup"));

    match session {
        Some(_) => output::success(&format!("Account created. Signed in as {}", email)),
        None => {
            output::success("Account created.");
            println!("{}", "Check your inbox to confirm the address, then run 'chef login'.".dimmed());
        }
    }
    Ok(())
}

pub async fn logout() -> Result<()> {
    let ctx = get_context()?;
    ctx.sign_out().await?;
    log_event(get_logger(), LogEvent::new("signed_out").with_command("logout"));
    output::success("Signed out.");
    Ok(())
}

pub async fn whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let identity = ctx.current_identity().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&identity))?);
        return Ok(());
    }

    match identity {
        Some(identity) => {
            println!("{}", identity.email.as_deref().unwrap_or("(no email)").bold());
            println!("  User ID: {}", identity.id);
        }
        None => output::info("Not signed in. Run 'chef login'."),
    }
    Ok(())
}
