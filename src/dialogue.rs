//! # Dialogue State Module
//!
//! The closed set of context tags, the menu-selection vocabulary, and the
//! pure transition planners the Telegram handlers execute. Planners take a
//! session snapshot and an inbound event and return the action to perform;
//! all Telegram and store I/O stays in the `bot` handlers.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Marker recording which prompt template the next free-text message
/// resolves to. One variant per selectable context; invalid string states
/// cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextTag {
    Pictures,
    RecipeStandard,
    RecipeVegetarian,
    RecipeHealthy,
    ExploreFamousFoods,
    ExploreTraditionalFood,
    ExploreSpicyFood,
    ExploreDessertRecipe,
    ExploreStreetFood,
    ExploreFoodPairing,
}

impl ContextTag {
    /// All tags, in menu order.
    pub const ALL: [ContextTag; 10] = [
        ContextTag::Pictures,
        ContextTag::RecipeStandard,
        ContextTag::RecipeVegetarian,
        ContextTag::RecipeHealthy,
        ContextTag::ExploreFamousFoods,
        ContextTag::ExploreTraditionalFood,
        ContextTag::ExploreSpicyFood,
        ContextTag::ExploreDessertRecipe,
        ContextTag::ExploreStreetFood,
        ContextTag::ExploreFoodPairing,
    ];

    /// Stable identifier, shared between callback data and the session store.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextTag::Pictures => "pictures",
            ContextTag::RecipeStandard => "recipe_standard",
            ContextTag::RecipeVegetarian => "recipe_vegetarian",
            ContextTag::RecipeHealthy => "recipe_healthy",
            ContextTag::ExploreFamousFoods => "explore_famousfoods",
            ContextTag::ExploreTraditionalFood => "explore_traditionalfood",
            ContextTag::ExploreSpicyFood => "explore_spicyfood",
            ContextTag::ExploreDessertRecipe => "explore_dessertrecipe",
            ContextTag::ExploreStreetFood => "explore_streetfood",
            ContextTag::ExploreFoodPairing => "explore_foodpairing",
        }
    }

    /// Parse a stored or callback identifier. Unknown strings map to `None`.
    pub fn parse(value: &str) -> Option<Self> {
        ContextTag::ALL.iter().copied().find(|tag| tag.as_str() == value)
    }

    /// Whether this tag resolves to an image generation rather than text.
    pub fn is_image(&self) -> bool {
        matches!(self, ContextTag::Pictures)
    }
}

/// The closed set of inline-keyboard selection identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuSelection {
    /// Clear the pending context and show the category menu
    Restart,
    /// Show the recipe-type submenu
    RecipeMenu,
    /// Show the explore submenu
    ExploreMenu,
    /// Set the pending context and prompt for a free-text subject
    AwaitSubject(ContextTag),
    /// Immediate fixed-prompt text generation, no subject needed
    QuickMeal,
    /// Immediate fixed-prompt text generation, no subject needed
    RandomDish,
}

impl MenuSelection {
    /// Parse callback data into a selection. Unknown identifiers map to
    /// `None` and are ignored by the handler.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "restart" => Some(MenuSelection::Restart),
            "category_recipes" => Some(MenuSelection::RecipeMenu),
            "category_explore" => Some(MenuSelection::ExploreMenu),
            "category_pictures" => Some(MenuSelection::AwaitSubject(ContextTag::Pictures)),
            "recipe_quick" => Some(MenuSelection::QuickMeal),
            "explore_randomdish" => Some(MenuSelection::RandomDish),
            other => ContextTag::parse(other).map(MenuSelection::AwaitSubject),
        }
    }
}

/// Action planned for an inbound free-text message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextAction {
    /// No key stored: capture the text verbatim as the API key
    CaptureKey(String),
    /// No key stored and the text is blank: do not capture, repeat the hint
    RejectBlankKey,
    /// Key stored but no pending context: ask the user to pick an action
    SelectActionFirst,
    /// Key and pending context present: generate with this tag and subject
    Generate { tag: ContextTag, subject: String },
}

/// Plan the transition for a free-text message against the current session.
/// Does not mutate the session; the handler applies state changes only after
/// the planned action succeeds.
pub fn plan_text(session: &Session, text: &str) -> TextAction {
    if session.api_key.is_none() {
        if text.trim().is_empty() {
            return TextAction::RejectBlankKey;
        }
        return TextAction::CaptureKey(text.to_string());
    }
    match session.pending_context {
        None => TextAction::SelectActionFirst,
        Some(tag) => TextAction::Generate {
            tag,
            subject: text.to_string(),
        },
    }
}

/// Outcome of the `/start` command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartAction {
    /// No key stored: show onboarding, await the credential
    Onboarding,
    /// Key stored: announce restart and show the category menu
    CategoryMenu,
}

pub fn plan_start(session: &Session) -> StartAction {
    if session.api_key.is_none() {
        StartAction::Onboarding
    } else {
        StartAction::CategoryMenu
    }
}

/// Outcome of the `/remove` command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveAction {
    /// Key was present and both fields are now cleared
    Removed,
    /// No key stored; nothing changed
    NothingToRemove,
}

/// Clear the credential and pending context if a credential is present.
/// Idempotent: a second call reports `NothingToRemove`.
pub fn plan_remove(session: &mut Session) -> RemoveAction {
    if session.api_key.is_some() {
        session.api_key = None;
        session.pending_context = None;
        RemoveAction::Removed
    } else {
        RemoveAction::NothingToRemove
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_identifiers_round_trip() {
        for tag in ContextTag::ALL {
            assert_eq!(ContextTag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(ContextTag::parse("recipes"), None);
        assert_eq!(ContextTag::parse(""), None);
    }

    #[test]
    fn test_only_pictures_is_image() {
        for tag in ContextTag::ALL {
            assert_eq!(tag.is_image(), tag == ContextTag::Pictures);
        }
    }

    #[test]
    fn test_selection_parsing() {
        assert_eq!(MenuSelection::parse("restart"), Some(MenuSelection::Restart));
        assert_eq!(
            MenuSelection::parse("category_recipes"),
            Some(MenuSelection::RecipeMenu)
        );
        assert_eq!(
            MenuSelection::parse("category_explore"),
            Some(MenuSelection::ExploreMenu)
        );
        assert_eq!(
            MenuSelection::parse("category_pictures"),
            Some(MenuSelection::AwaitSubject(ContextTag::Pictures))
        );
        assert_eq!(MenuSelection::parse("recipe_quick"), Some(MenuSelection::QuickMeal));
        assert_eq!(
            MenuSelection::parse("explore_randomdish"),
            Some(MenuSelection::RandomDish)
        );
        assert_eq!(
            MenuSelection::parse("recipe_vegetarian"),
            Some(MenuSelection::AwaitSubject(ContextTag::RecipeVegetarian))
        );
        assert_eq!(MenuSelection::parse("edit_3"), None);
    }

    #[test]
    fn test_first_text_becomes_key() {
        let session = Session::default();
        assert_eq!(
            plan_text(&session, "hyp-secret-key"),
            TextAction::CaptureKey("hyp-secret-key".to_string())
        );
    }

    #[test]
    fn test_blank_text_is_not_captured_as_key() {
        let session = Session::default();
        assert_eq!(plan_text(&session, ""), TextAction::RejectBlankKey);
        assert_eq!(plan_text(&session, "   \n"), TextAction::RejectBlankKey);
    }

    #[test]
    fn test_text_without_pending_context() {
        let session = Session {
            api_key: Some("key".to_string()),
            pending_context: None,
        };
        assert_eq!(plan_text(&session, "Sushi"), TextAction::SelectActionFirst);
    }

    #[test]
    fn test_text_with_pending_context_generates() {
        for tag in ContextTag::ALL {
            let session = Session {
                api_key: Some("key".to_string()),
                pending_context: Some(tag),
            };
            assert_eq!(
                plan_text(&session, "Sushi"),
                TextAction::Generate {
                    tag,
                    subject: "Sushi".to_string()
                }
            );
        }
    }

    #[test]
    fn test_start_depends_on_key_presence() {
        assert_eq!(plan_start(&Session::default()), StartAction::Onboarding);
        let session = Session {
            api_key: Some("key".to_string()),
            pending_context: None,
        };
        assert_eq!(plan_start(&session), StartAction::CategoryMenu);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut session = Session {
            api_key: Some("key".to_string()),
            pending_context: Some(ContextTag::Pictures),
        };
        assert_eq!(plan_remove(&mut session), RemoveAction::Removed);
        assert_eq!(session.api_key, None);
        assert_eq!(session.pending_context, None);
        assert_eq!(plan_remove(&mut session), RemoveAction::NothingToRemove);
    }
}
