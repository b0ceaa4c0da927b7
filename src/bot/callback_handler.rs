//! Callback Handler module for processing inline keyboard callback queries

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use tracing::{debug, info};

use crate::dialogue::MenuSelection;
use crate::generation::GenerationClient;
use crate::prompts::{QUICK_MEAL_PROMPT, RANDOM_DISH_PROMPT};
use crate::session::SessionStore;

use super::message_handler::{report_generation_error, show_category_menu, API_KEY_REQUIRED};
use super::ui_builder::{
    explore_keyboard, format_text_reply, recipe_keyboard, restart_keyboard, subject_prompt,
    EXPLORE_MENU_TEXT, RECIPE_MENU_TEXT,
};

/// Handle callback queries from the category, recipe and explore menus.
pub async fn callback_handler(
    bot: Bot,
    q: teloxide::types::CallbackQuery,
    store: Arc<dyn SessionStore>,
    client: Arc<GenerationClient>,
) -> Result<()> {
    let user_id = q.from.id.0 as i64;
    let data = q.data.as_deref().unwrap_or("");
    debug!(user_id, data, "Received callback query");

    if let Some(msg) = &q.message {
        let chat_id = msg.chat().id;

        match MenuSelection::parse(data) {
            Some(MenuSelection::Restart) => {
                let mut session = store.get(user_id).await?;
                session.pending_context = None;
                store.put(user_id, &session).await?;
                bot.send_message(chat_id, "*🔁 Restarting session...*")
                    .parse_mode(ParseMode::Markdown)
                    .await?;
                show_category_menu(&bot, chat_id).await?;
            }
            Some(MenuSelection::RecipeMenu) => {
                bot.send_message(chat_id, RECIPE_MENU_TEXT)
                    .parse_mode(ParseMode::Markdown)
                    .reply_markup(recipe_keyboard())
                    .await?;
            }
            Some(MenuSelection::ExploreMenu) => {
                bot.send_message(chat_id, EXPLORE_MENU_TEXT)
                    .parse_mode(ParseMode::Markdown)
                    .reply_markup(explore_keyboard())
                    .await?;
            }
            Some(MenuSelection::AwaitSubject(tag)) => {
                let mut session = store.get(user_id).await?;
                session.pending_context = Some(tag);
                store.put(user_id, &session).await?;
                info!(user_id, tag = tag.as_str(), "Awaiting subject for context");
                bot.send_message(chat_id, subject_prompt(tag))
                    .parse_mode(ParseMode::Markdown)
                    .reply_markup(restart_keyboard())
                    .await?;
            }
            Some(MenuSelection::QuickMeal) => {
                run_fixed_prompt(
                    &bot,
                    chat_id,
                    user_id,
                    &store,
                    &client,
                    QUICK_MEAL_PROMPT,
                    "*⏩ Quick Meal Suggestion:*",
                )
                .await?;
            }
            Some(MenuSelection::RandomDish) => {
                run_fixed_prompt(
                    &bot,
                    chat_id,
                    user_id,
                    &store,
                    &client,
                    RANDOM_DISH_PROMPT,
                    "*🎲 Random Dish Suggestion:*",
                )
                .await?;
            }
            None => {
                debug!(user_id, data, "Ignoring unknown callback identifier");
            }
        }
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// Immediate fixed-prompt text generation for `recipe_quick` and
/// `explore_randomdish`. Reads no subject and never mutates the pending
/// context, on success or failure.
async fn run_fixed_prompt(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    store: &Arc<dyn SessionStore>,
    client: &Arc<GenerationClient>,
    prompt: &str,
    title: &str,
) -> Result<()> {
    let session = store.get(user_id).await?;
    let Some(api_key) = session.api_key else {
        bot.send_message(chat_id, API_KEY_REQUIRED)
            .parse_mode(ParseMode::Markdown)
            .await?;
        return Ok(());
    };

    bot.send_chat_action(chat_id, ChatAction::Typing).await?;
    match client.generate_text(&api_key, prompt, user_id).await {
        Ok(content) => {
            bot.send_message(chat_id, format_text_reply(title, &content))
                .parse_mode(ParseMode::Markdown)
                .reply_markup(restart_keyboard())
                .await?;
        }
        Err(e) => report_generation_error(bot, chat_id, user_id, &e).await?,
    }
    Ok(())
}
