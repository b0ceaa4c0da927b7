use worldfood::bot::ui_builder::{
    category_keyboard, explore_keyboard, format_text_reply, recipe_keyboard, reply_title,
    restart_keyboard, subject_prompt, truncate_reply,
};
use worldfood::dialogue::{ContextTag, MenuSelection};

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_ids(keyboard: &teloxide::types::InlineKeyboardMarkup) -> Vec<String> {
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

    /// Every callback identifier emitted by a keyboard parses into a known
    /// menu selection
    #[test]
    fn test_all_keyboard_ids_are_recognized() {
        for keyboard in [
            category_keyboard(),
            recipe_keyboard(),
            explore_keyboard(),
            restart_keyboard(),
        ] {
            for id in callback_ids(&keyboard) {
                assert!(
                    MenuSelection::parse(&id).is_some(),
                    "keyboard emits unrecognized callback id {id}"
                );
            }
        }
    }

    /// A 5000-character result is delivered as the first 4000 characters
    /// plus an ellipsis; a 3000-character result is delivered unmodified
    #[test]
    fn test_output_size_contract() {
        let long = "a".repeat(5000);
        let delivered = truncate_reply(&long);
        assert_eq!(delivered.len(), 4003);
        assert_eq!(&delivered[..4000], &long[..4000]);
        assert!(delivered.ends_with("..."));

        let short = "b".repeat(3000);
        assert_eq!(truncate_reply(&short), short);
    }

    /// Titled replies keep the title intact and truncate only the body
    #[test]
    fn test_formatted_reply_truncates_body_only() {
        let title = reply_title(ContextTag::RecipeStandard, "Chicken Curry");
        let reply = format_text_reply(&title, &"c".repeat(5000));
        assert!(reply.starts_with("*🍳 Recipe for Chicken Curry:*\n"));
        assert!(reply.ends_with("..."));
    }

    /// Each tag has a distinct subject prompt and reply title
    #[test]
    fn test_per_tag_texts_are_distinct() {
        let mut prompts: Vec<&str> = ContextTag::ALL.iter().map(|t| subject_prompt(*t)).collect();
        prompts.sort();
        prompts.dedup();
        assert_eq!(prompts.len(), ContextTag::ALL.len());

        let mut titles: Vec<String> = ContextTag::ALL
            .iter()
            .map(|t| reply_title(*t, "Sushi"))
            .collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), ContextTag::ALL.len());
    }
}
