//! Service layer - business logic orchestration
//!
//! Services take their clients as trait objects and hold the small amount of
//! in-memory state the presentation layer renders.

pub mod favorites;
pub mod identity;
pub mod logging;
pub mod profile;
pub mod recipe;

pub use favorites::{FavoritesService, FavoritesState};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use profile::ProfileService;
pub use recipe::RecipeService;
