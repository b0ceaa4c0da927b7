//! UI Builder module for creating keyboards and formatting replies

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::config::MAX_REPLY_CHARS;
use crate::dialogue::ContextTag;

pub const CATEGORY_MENU_TEXT: &str = "*📂 Choose a category:*";
pub const RECIPE_MENU_TEXT: &str = "*🍳 Choose a recipe type:*";
pub const EXPLORE_MENU_TEXT: &str = "*🌍 Explore more options:*";

/// Top-level category menu
pub fn category_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("🍳 Recipes", "category_recipes")],
        vec![InlineKeyboardButton::callback("🖼️ Pictures", "category_pictures")],
        vec![InlineKeyboardButton::callback("🌍 Explore More", "category_explore")],
    ])
}

/// Recipe-type submenu
pub fn recipe_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📜 Standard Recipe", "recipe_standard")],
        vec![InlineKeyboardButton::callback("🌱 Vegetarian Recipe", "recipe_vegetarian")],
        vec![InlineKeyboardButton::callback("⏩ Quick Meal", "recipe_quick")],
        vec![InlineKeyboardButton::callback("🥗 Healthy Recipe", "recipe_healthy")],
        vec![InlineKeyboardButton::callback("🔄 Restart", "restart")],
    ])
}

/// Explore submenu
pub fn explore_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🇺🇳 Famous Foods by Country",
            "explore_famousfoods",
        )],
        vec![InlineKeyboardButton::callback(
            "🍲 Traditional Food by Country",
            "explore_traditionalfood",
        )],
        vec![InlineKeyboardButton::callback("🎲 Random Dish", "explore_randomdish")],
        vec![InlineKeyboardButton::callback(
            "🌶️ Spicy Foods by Country",
            "explore_spicyfood",
        )],
        vec![InlineKeyboardButton::callback(
            "🍰 Dessert Recipe by Country",
            "explore_dessertrecipe",
        )],
        vec![InlineKeyboardButton::callback(
            "🚚 Street Food by Country",
            "explore_streetfood",
        )],
        vec![InlineKeyboardButton::callback("🍷 Food Pairing", "explore_foodpairing")],
        vec![InlineKeyboardButton::callback("🔄 Restart", "restart")],
    ])
}

/// Single restart control, attached to every result reply
pub fn restart_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback("🔄 Restart", "restart")]])
}

/// Free-text subject prompt shown after a context tag is selected.
pub fn subject_prompt(tag: ContextTag) -> &'static str {
    match tag {
        ContextTag::Pictures => "*🖼️ Enter what you'd like to see (e.g., coffee, mountain):*",
        ContextTag::RecipeStandard => {
            "*📜 Enter the dish name for a standard recipe.*\nExample: Chicken Curry"
        }
        ContextTag::RecipeVegetarian => {
            "*🌱 Enter the dish name for a vegetarian recipe.*\nExample: Lasagna"
        }
        ContextTag::RecipeHealthy => {
            "*🥗 Enter the dish name for a healthy recipe.*\nExample: Pizza"
        }
        ContextTag::ExploreFamousFoods => {
            "*🇺🇳 Enter the country to list famous foods.*\nExample: Italy"
        }
        ContextTag::ExploreTraditionalFood => {
            "*🍲 Enter the country to get a traditional dish.*\nExample: Japan"
        }
        ContextTag::ExploreSpicyFood => {
            "*🌶️ Enter the country to list spicy foods.*\nExample: Thailand"
        }
        ContextTag::ExploreDessertRecipe => {
            "*🍰 Enter the country for a dessert recipe.*\nExample: France"
        }
        ContextTag::ExploreStreetFood => {
            "*🚚 Enter the country to list street foods.*\nExample: India"
        }
        ContextTag::ExploreFoodPairing => {
            "*🍷 Enter the dish for a food pairing suggestion.*\nExample: Sushi"
        }
    }
}

/// Emoji-prefixed title for a generation reply, per context tag.
pub fn reply_title(tag: ContextTag, subject: &str) -> String {
    match tag {
        ContextTag::Pictures => format!("*🖼️ Image of {subject}*"),
        ContextTag::RecipeStandard => format!("*🍳 Recipe for {subject}:*"),
        ContextTag::RecipeVegetarian => format!("*🌱 Vegetarian Recipe for {subject}:*"),
        ContextTag::RecipeHealthy => format!("*🥗 Healthy Recipe for {subject}:*"),
        ContextTag::ExploreFamousFoods => format!("*🇺🇳 Famous Dishes from {subject}:*"),
        ContextTag::ExploreTraditionalFood => format!("*🍲 Traditional Dish from {subject}:*"),
        ContextTag::ExploreSpicyFood => format!("*🌶️ Spicy Dishes from {subject}:*"),
        ContextTag::ExploreDessertRecipe => format!("*🍰 Dessert Recipe from {subject}:*"),
        ContextTag::ExploreStreetFood => format!("*🚚 Popular Street Foods from {subject}:*"),
        ContextTag::ExploreFoodPairing => format!("*🍷 Food Pairing for {subject}:*"),
    }
}

/// Truncate a reply body to the output-size cap, counted in characters,
/// appending an ellipsis marker when anything was cut.
pub fn truncate_reply(text: &str) -> String {
    let mut chars = text.chars();
    let truncated: String = chars.by_ref().take(MAX_REPLY_CHARS).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}

/// Full titled reply for a text generation result.
pub fn format_text_reply(title: &str, content: &str) -> String {
    format!("{}\n{}", title, truncate_reply(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_ids(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                other => panic!("unexpected button kind: {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_category_keyboard_ids() {
        assert_eq!(
            callback_ids(&category_keyboard()),
            vec!["category_recipes", "category_pictures", "category_explore"]
        );
    }

    #[test]
    fn test_recipe_keyboard_ids() {
        assert_eq!(
            callback_ids(&recipe_keyboard()),
            vec![
                "recipe_standard",
                "recipe_vegetarian",
                "recipe_quick",
                "recipe_healthy",
                "restart"
            ]
        );
    }

    #[test]
    fn test_explore_keyboard_ids() {
        assert_eq!(
            callback_ids(&explore_keyboard()),
            vec![
                "explore_famousfoods",
                "explore_traditionalfood",
                "explore_randomdish",
                "explore_spicyfood",
                "explore_dessertrecipe",
                "explore_streetfood",
                "explore_foodpairing",
                "restart"
            ]
        );
    }

    #[test]
    fn test_restart_keyboard_is_single_control() {
        assert_eq!(callback_ids(&restart_keyboard()), vec!["restart"]);
    }

    #[test]
    fn test_truncation_at_4000_chars() {
        let long = "x".repeat(5000);
        let truncated = truncate_reply(&long);
        assert_eq!(truncated.chars().count(), 4003);
        assert!(truncated.ends_with("..."));
        assert_eq!(&truncated[..4000], &long[..4000]);
    }

    #[test]
    fn test_short_replies_pass_through() {
        let short = "y".repeat(3000);
        assert_eq!(truncate_reply(&short), short);

        let exact = "z".repeat(4000);
        assert_eq!(truncate_reply(&exact), exact);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let long = "é".repeat(4100);
        let truncated = truncate_reply(&long);
        assert_eq!(truncated.chars().count(), 4003);
    }

    #[test]
    fn test_reply_titles_carry_subject() {
        for tag in ContextTag::ALL {
            let title = reply_title(tag, "Sushi");
            assert!(title.contains("Sushi"));
            assert!(title.starts_with('*') && title.ends_with('*'));
        }
        assert_eq!(
            reply_title(ContextTag::RecipeStandard, "Chicken Curry"),
            "*🍳 Recipe for Chicken Curry:*"
        );
    }

    #[test]
    fn test_subject_prompts_cover_all_tags() {
        for tag in ContextTag::ALL {
            assert!(!subject_prompt(tag).is_empty());
        }
    }
}
