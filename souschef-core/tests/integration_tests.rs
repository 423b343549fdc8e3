//! Integration tests for souschef-core
//!
//! The context is wired with the in-memory store and a fake completion client,
//! so the full generate → save → list → delete flow runs without network IO.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use uuid::Uuid;

use souschef_core::adapters::memory::InMemoryStore;
use souschef_core::config::Config;
use souschef_core::domain::{CompletionRequest, CompletionResponse};
use souschef_core::ports::CompletionClient;
use souschef_core::{Error, Identity, OperationResult, Result, SousChefContext};

// ============================================================================
// Test Helpers
// ============================================================================

/// Completion client that echoes the user prompt back as a "recipe"
#[derive(Default)]
struct EchoCompletion {
    requests: Mutex<Vec<CompletionRequest>>,
}

#[async_trait]
impl CompletionClient for EchoCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let prompt = request.messages.last().map(|m| m.content.as_str()).unwrap_or("");
        let ingredients = prompt
            .trim_start_matches("I have the following ingredients: ")
            .split(". Please")
            .next()
            .unwrap_or("");
        Ok(CompletionResponse::with_content(Some(&format!(
            "\n  Recipe with {}\n",
            ingredients
        ))))
    }
}

struct Harness {
    _dir: TempDir,
    store: Arc<InMemoryStore>,
    completion: Arc<EchoCompletion>,
    ctx: SousChefContext,
}

fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let completion = Arc::new(EchoCompletion::default());
    let ctx = SousChefContext::from_clients(
        Config::default(),
        dir.path(),
        store.clone(),
        completion.clone(),
    );
    Harness {
        _dir: dir,
        store,
        completion,
        ctx,
    }
}

// ============================================================================
// End-to-end flows
// ============================================================================

#[tokio::test]
async fn test_generate_save_list_delete() {
    let h = harness();
    let user = Identity::new(Uuid::new_v4()).with_email("u1@example.com");
    h.store.sign_in_as(user.clone());

    let favorites = h.ctx.favorites().unwrap();
    let recipes = h.ctx.recipes().unwrap();
    assert!(favorites.fetch_all().await.unwrap().is_empty());

    let draft = recipes.generate("eggs, spinach").await.unwrap().unwrap();
    assert_eq!(draft.text, "Recipe with eggs, spinach");

    recipes.save_draft(favorites).await.unwrap();
    let saved = favorites.fetch_all().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].recipe, draft.text);
    assert_eq!(saved[0].owner, user.id);

    let remaining = favorites.delete(saved[0].id).await.unwrap();
    assert!(remaining.is_empty());
    assert!(favorites.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signed_out_browsing_and_guards() {
    let h = harness();
    let favorites = h.ctx.favorites().unwrap();

    let listed = favorites.fetch_all().await.unwrap();
    assert!(listed.is_empty());
    assert!(!favorites.state().loading);

    // Generation works signed out; saving does not
    let recipes = h.ctx.recipes().unwrap();
    recipes.generate("bread").await.unwrap();
    let err = recipes.save_draft(favorites).await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
    assert!(h.store.rows("favorites").is_empty());
}

#[tokio::test]
async fn test_empty_ingredients_reach_completion_client() {
    let h = harness();

    h.ctx.recipes().unwrap().generate("").await.unwrap();

    let requests = h.completion.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gpt-4");
    assert_eq!(requests[0].max_tokens, 700);
}

#[tokio::test]
async fn test_each_identity_only_sees_its_own_rows() {
    let h = harness();
    let favorites = h.ctx.favorites().unwrap();
    let users: Vec<Identity> = (0..3).map(|_| Identity::new(Uuid::new_v4())).collect();

    for (i, user) in users.iter().enumerate() {
        h.store.sign_in_as(user.clone());
        for n in 0..=i {
            favorites.add(&format!("recipe {} of user {}", n, i)).await.unwrap();
        }
    }

    for (i, user) in users.iter().enumerate() {
        h.store.sign_in_as(user.clone());
        let listed = favorites.fetch_all().await.unwrap();
        assert_eq!(listed.len(), i + 1);
        assert!(listed.iter().all(|f| f.owner == user.id));
    }
}

#[tokio::test]
async fn test_sign_out_clears_identity() {
    let h = harness();
    h.store.sign_in_as(Identity::new(Uuid::new_v4()));
    assert!(h.ctx.current_identity().await.unwrap().is_some());

    h.ctx.sign_out().await.unwrap();

    assert!(h.ctx.current_identity().await.unwrap().is_none());
    assert!(h.ctx.favorites().unwrap().fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sign_in_requires_supabase() {
    let h = harness();
    let err = h.ctx.sign_in("a@b.c", "pw").await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_failed_add_reports_error_kind() {
    let h = harness();

    let result: OperationResult<()> = h.ctx.favorites().unwrap().add("soup").await.into();

    assert!(!result.success);
    assert_eq!(result.context.unwrap()["kind"], "not_authenticated");
    assert!(h.store.calls().iter().all(|c| !c.starts_with("insert")));
}
