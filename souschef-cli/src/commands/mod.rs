//! CLI command implementations

pub mod auth;
pub mod config;
pub mod favorites;
pub mod generate;
pub mod logs;
pub mod profile;

use std::collections::HashMap;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use souschef_core::{EntryPoint, Error, LogEvent, LoggingService, OperationResult, SousChefContext};

static LOGGER: OnceLock<Option<LoggingService>> = OnceLock::new();

/// Get the logging service for CLI operations, opened once per process
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> &'static Option<LoggingService> {
    LOGGER.get_or_init(|| {
        let app_dir = get_app_dir();
        std::fs::create_dir_all(&app_dir).ok()?;
        LoggingService::new(&app_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
    })
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Build a failure event, keeping the error kind when the error came from the core
pub fn failure_event(event: &str, command: &str, error: &anyhow::Error) -> LogEvent {
    let event = LogEvent::new(event).with_command(command);
    match error.downcast_ref::<Error>() {
        Some(domain_error) => event.with_domain_error(domain_error),
        None => event.with_error(format!("{:#}", error)),
    }
}

/// JSON body printed when a `--json` command fails
pub fn failure_result(error: &anyhow::Error) -> OperationResult<()> {
    let kind = error.downcast_ref::<Error>().map(Error::kind).unwrap_or("error");
    let mut context = HashMap::new();
    context.insert("kind".to_string(), serde_json::json!(kind));
    OperationResult::fail_with_context(format!("{:#}", error), context)
}

/// Get the app directory from environment or default
pub fn get_app_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SOUSCHEF_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".souschef")
    }
}

/// Build the SousChef context from settings, environment and stored session
pub fn get_context() -> Result<SousChefContext> {
    let app_dir = get_app_dir();

    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create souschef directory: {:?}", app_dir))?;

    SousChefContext::new(&app_dir).context("Failed to initialize souschef context")
}

/// Read all of stdin when it is piped, `None` when attached to a terminal
pub fn read_piped_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(Some(buffer))
}
