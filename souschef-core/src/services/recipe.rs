//! Recipe service - one completion request per set of ingredients
//!
//! Only one generation runs at a time per service; a second call while one is
//! pending is rejected with `GenerationInProgress`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::domain::{ChatMessage, CompletionRequest, RecipeDraft};
use crate::ports::CompletionClient;
use crate::services::FavoritesService;

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const MAX_TOKENS: u32 = 700;
pub const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "You are a culinary assistant. Your goal is to provide the user \
with a recipe that best utilizes their provided ingredients. Make the recipe easy to follow, \
include clear ingredient quantities, step-by-step instructions, and provide preparation and \
cooking times. Tailor your suggestions to be creative, practical, and enjoyable.";

/// Build the chat request for a free-text list of ingredients
pub fn build_request(model: &str, ingredients: &str) -> CompletionRequest {
    let user_prompt = format!(
        "I have the following ingredients: {}. Please suggest a recipe I can prepare using \
these ingredients. The recipe should be written in the same language as the ingredients \
provided (e.g., if I write in Turkish, respond in Turkish).\n\
Include the following: Recipe Name, A detailed list of ingredients with quantities, \
Step-by-step cooking instructions, Total preparation and cooking time, Any possible \
substitutions for missing ingredients. Format the response neatly with clear sections for \
readability.",
        ingredients
    );

    CompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Clears the in-flight flag when the generation ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Recipe generator
pub struct RecipeService {
    completion: Arc<dyn CompletionClient>,
    model: String,
    in_flight: AtomicBool,
    draft: Mutex<Option<RecipeDraft>>,
}

impl RecipeService {
    pub fn new(completion: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            completion,
            model: model.into(),
            in_flight: AtomicBool::new(false),
            draft: Mutex::new(None),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a generation is pending
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The last generated recipe, if any
    pub fn draft(&self) -> Option<RecipeDraft> {
        self.lock_draft().clone()
    }

    fn lock_draft(&self) -> MutexGuard<'_, Option<RecipeDraft>> {
        self.draft.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::GenerationInProgress)?;
        Ok(InFlight(&self.in_flight))
    }

    /// Ask the completion service for a recipe.
    ///
    /// The ingredients go into the prompt as typed, even when empty. A response
    /// without usable text resolves to `Ok(None)`. The previous draft is
    /// dropped as soon as a new generation starts.
    pub async fn generate(&self, ingredients: &str) -> Result<Option<RecipeDraft>> {
        let _in_flight = self.begin()?;
        *self.lock_draft() = None;

        let request = build_request(&self.model, ingredients);
        let response = self.completion.complete(&request).await?;

        let draft = response.first_text().map(RecipeDraft::new);
        *self.lock_draft() = draft.clone();
        Ok(draft)
    }

    /// Promote the current draft to a favorite
    pub async fn save_draft(&self, favorites: &FavoritesService) -> Result<()> {
        let draft = self
            .draft()
            .ok_or_else(|| Error::validation("There is no recipe to save"))?;
        favorites.add(&draft.text).await
    }
}
