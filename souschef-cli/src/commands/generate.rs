//! Generate command - ask the completion service for a recipe

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use souschef_core::{LogEvent, OperationResult};

use super::{get_context, get_logger, log_event, read_piped_stdin};
use crate::output;

#[derive(serde::Serialize)]
struct GenerateOutput {
    recipe: Option<String>,
    saved: bool,
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub async fn run(ingredients: &[String], save: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let recipes = ctx.recipes()?;
    let logger = get_logger();

    // Empty ingredients are sent as-is; the model decides what to do with them
    let ingredients = if ingredients.is_empty() {
        read_piped_stdin()?.unwrap_or_default().trim().to_string()
    } else {
        ingredients.join(" ")
    };

    let pb = (!json).then(|| spinner(&format!("Cooking with {}...", recipes.model())));
    let generated = recipes.generate(&ingredients).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let draft = generated?;
    log_event(logger, LogEvent::new("recipe_generated").with_command("generate"));

    let saved = match (&draft, save) {
        (Some(_), true) => {
            recipes.save_draft(ctx.favorites()?).await?;
            log_event(logger, LogEvent::new("favorite_added").with_command("generate"));
            true
        }
        _ => false,
    };

    if json {
        let result = OperationResult::ok(GenerateOutput {
            recipe: draft.map(|d| d.text),
            saved,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match draft {
        Some(draft) => {
            println!();
            println!("{}", draft.text);
            println!();
            if saved {
                output::success("Saved to favorites.");
            } else if !save {
                println!("{}", "Run again with --save to keep this recipe.".dimmed());
            }
        }
        None => output::warning("The model returned an empty answer. Try again."),
    }

    Ok(())
}
