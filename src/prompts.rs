//! # Prompt Catalog Module
//!
//! Pure mapping from (context tag, subject) to the prompt sent to the
//! generation backend, plus the fixed parameterless prompts for the
//! immediate menu actions. Total over its domain; no state, no failures.

use crate::dialogue::ContextTag;

/// System instruction sent with every chat-completion request
pub const SYSTEM_PROMPT: &str = "You are a gourmet. Be descriptive and helpful.";

/// Fixed prompt for the "quick meal" immediate action
pub const QUICK_MEAL_PROMPT: &str = "Suggest a quick and easy meal recipe that can be prepared \
     in under 30 minutes, including ingredients and step-by-step instructions.";

/// Fixed prompt for the "random dish" immediate action
pub const RANDOM_DISH_PROMPT: &str = "Suggest a random dish from around the world, including \
     its name, country of origin, and a short description.";

/// Resolve a context tag and user-supplied subject to a prompt string.
pub fn prompt_for(tag: ContextTag, subject: &str) -> String {
    match tag {
        ContextTag::Pictures => picture_prompt(subject),
        ContextTag::RecipeStandard => format!(
            "Tell me about {subject} and provide a detailed recipe, including ingredients \
             and step-by-step instructions."
        ),
        ContextTag::RecipeVegetarian => format!(
            "Provide a vegetarian recipe for {subject}, including ingredients and \
             step-by-step instructions."
        ),
        ContextTag::RecipeHealthy => format!(
            "Provide a healthier version of {subject}, including ingredients and \
             step-by-step instructions."
        ),
        ContextTag::ExploreFamousFoods => format!("List famous dishes from {subject}."),
        ContextTag::ExploreTraditionalFood => {
            format!("Provide a traditional dish from {subject} with a brief description.")
        }
        ContextTag::ExploreSpicyFood => format!("List spicy dishes from {subject}."),
        ContextTag::ExploreDessertRecipe => format!(
            "Provide a dessert recipe from {subject}, including ingredients and \
             step-by-step instructions."
        ),
        ContextTag::ExploreStreetFood => format!("List popular street foods from {subject}."),
        ContextTag::ExploreFoodPairing => {
            format!("Suggest a drink or side dish that pairs well with {subject}.")
        }
    }
}

/// Image prompt for a subject, with the food-plating variant when the
/// subject mentions food.
pub fn picture_prompt(subject: &str) -> String {
    if subject.to_lowercase().contains("food") {
        plated_picture_prompt(subject)
    } else {
        format!("A high-quality, photorealistic image of {subject}")
    }
}

/// Food-plating image prompt, used unconditionally by `/picture <dish>`.
pub fn plated_picture_prompt(subject: &str) -> String {
    format!(
        "A high-quality, photorealistic image of {subject}, beautifully plated on a \
         white ceramic plate, with vibrant colors, soft natural lighting, and a clean \
         wooden table background."
    )
}
