//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services depend
//! only on these traits, not on concrete implementations.

mod completion;
mod remote_store;

pub use completion::CompletionClient;
pub use remote_store::{Filter, RemoteStore, Row};
