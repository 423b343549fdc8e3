//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Supabase (GoTrue + PostgREST) for the RemoteStore port
//! - OpenAI chat completions for the CompletionClient port
//! - In-memory store for tests and demo runs

pub mod memory;
pub mod openai;
pub mod supabase;

#[cfg(test)]
pub mod mock_server;
