//! Core domain entities
//!
//! Plain data structures shared by ports, services and adapters.

mod favorite;
mod identity;
mod profile;
pub mod recipe;
pub mod result;

pub use favorite::Favorite;
pub use identity::{Identity, Session};
pub use profile::{Profile, ProfileUpdate};
pub use recipe::{ChatMessage, CompletionRequest, CompletionResponse, RecipeDraft, Role};
