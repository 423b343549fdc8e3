//! Favorite domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recipe saved by one user. Rows are created and deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    /// Assigned by the remote store
    pub id: i64,
    pub recipe: String,
    #[serde(rename = "user_id")]
    pub owner: Uuid,
}

impl Favorite {
    /// First non-empty line of the recipe, used as a title in listings
    pub fn title(&self) -> &str {
        self.recipe
            .lines()
            .map(|l| l.trim().trim_start_matches('#').trim())
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_from_store_row() {
        let owner = Uuid::new_v4();
        let favorite: Favorite = serde_json::from_value(serde_json::json!({
            "id": 7,
            "recipe": "Pasta recipe...",
            "user_id": owner.to_string(),
        }))
        .unwrap();

        assert_eq!(favorite.id, 7);
        assert_eq!(favorite.recipe, "Pasta recipe...");
        assert_eq!(favorite.owner, owner);
    }

    #[test]
    fn test_title_skips_blank_lines_and_heading_marks() {
        let favorite = Favorite {
            id: 1,
            recipe: "\n\n## Tomato Omelette\nServes 2".to_string(),
            owner: Uuid::new_v4(),
        };
        assert_eq!(favorite.title(), "Tomato Omelette");
    }
}
