//! Message Handler module for processing incoming Telegram messages
//!
//! Commands and free text are interpreted against the stored session via the
//! pure planners in `crate::dialogue`; this module performs the Telegram and
//! store I/O around them. Session state is only written after the planned
//! action has succeeded, so a failed generation leaves the pending context in
//! place and the user can simply resend their input.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, ParseMode};
use tracing::{debug, error, info, warn};

use crate::dialogue::{
    plan_remove, plan_start, plan_text, ContextTag, RemoveAction, StartAction, TextAction,
};
use crate::errors::GenerationError;
use crate::generation::{GenerationClient, GenerationResult};
use crate::prompts::{plated_picture_prompt, prompt_for};
use crate::session::SessionStore;

use super::ui_builder::{
    category_keyboard, format_text_reply, recipe_keyboard, reply_title, restart_keyboard,
    CATEGORY_MENU_TEXT, RECIPE_MENU_TEXT,
};

pub const API_KEY_REQUIRED: &str = "🔐 *Please send your API key first!*";
pub const API_KEY_SAVED: &str = "✅ *API key saved!*";
pub const API_KEY_REMOVED: &str = "🗑️ *API key removed successfully!*";
pub const NO_API_KEY: &str = "ℹ️ *No API key set.*";
pub const SELECT_ACTION_FIRST: &str = "⚠️ *Select an action first!*";
pub const PICTURE_USAGE: &str = "*🖼️ Please provide a dish for the picture.*\nExample: /picture Sushi";

const WELCOME_MESSAGE: &str = "*🌟 Welcome to WorldFood Bot! 🌟*\n\n\
    Get ready to explore a world of culinary delights! Send your Hyperbolic API Key to unlock features like:\n\
    - 🍳 Detailed recipes (standard, vegetarian, healthy, and quick)\n\
    - 🖼️ Stunning food images\n\
    - 🌍 Global cuisine insights (famous dishes, traditional recipes, and more)\n\n\
    To get started:\n\
    1. Visit [Hyperbolic Website](https://app.hyperbolic.xyz/) and log in\n\
    2. Go to the *Settings* section\n\
    3. Copy your API Key\n\
    4. Paste it here\n\n\
    🛡️ *Security Notice:*\n\
    - Your API key is stored securely\n\
    - Remove it anytime with /remove\n\
    - Key is only kept for session access";

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    store: Arc<dyn SessionStore>,
    client: Arc<GenerationClient>,
) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(chat_id = %msg.chat.id, "Ignoring non-text message");
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Message without a sender, ignoring");
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    match route(text) {
        Route::Start => handle_start(&bot, chat_id, user_id, &store).await,
        Route::Remove => handle_remove(&bot, chat_id, user_id, &store).await,
        Route::Recipe(arg) => {
            handle_recipe_command(&bot, chat_id, user_id, &store, &client, arg).await
        }
        Route::Picture(arg) => {
            handle_picture_command(&bot, chat_id, user_id, &store, &client, arg).await
        }
        Route::FreeText(text) => {
            handle_free_text(&bot, chat_id, user_id, &store, &client, text).await
        }
    }
}

/// Routed form of an inbound text message.
#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Start,
    Remove,
    Recipe(&'a str),
    Picture(&'a str),
    FreeText(&'a str),
}

/// Classify a text message as a command or free text. Commands match with
/// or without an argument, so an argumented `/start` or `/remove` (e.g. a
/// deep-link payload) is never mistaken for free text and cannot be
/// captured as a credential.
fn route(text: &str) -> Route<'_> {
    if command_argument(text, "/start").is_some() {
        Route::Start
    } else if command_argument(text, "/remove").is_some() {
        Route::Remove
    } else if let Some(arg) = command_argument(text, "/recipe") {
        Route::Recipe(arg)
    } else if let Some(arg) = command_argument(text, "/picture") {
        Route::Picture(arg)
    } else {
        Route::FreeText(text)
    }
}

/// Split `/recipe Sushi` into its argument, `""` for a bare command,
/// `None` when `text` is not this command.
fn command_argument<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    if text == command {
        return Some("");
    }
    text.strip_prefix(command)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::trim)
}

async fn handle_start(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    store: &Arc<dyn SessionStore>,
) -> Result<()> {
    let session = store.get(user_id).await?;
    match plan_start(&session) {
        StartAction::Onboarding => {
            info!(user_id, "New session, awaiting credential");
            bot.send_message(chat_id, WELCOME_MESSAGE)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        StartAction::CategoryMenu => {
            bot.send_message(chat_id, "🔁 Restarting session...").await?;
            show_category_menu(bot, chat_id).await?;
        }
    }
    Ok(())
}

async fn handle_remove(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    store: &Arc<dyn SessionStore>,
) -> Result<()> {
    let mut session = store.get(user_id).await?;
    match plan_remove(&mut session) {
        RemoveAction::Removed => {
            store.put(user_id, &session).await?;
            info!(user_id, "API key removed");
            bot.send_message(chat_id, API_KEY_REMOVED)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        RemoveAction::NothingToRemove => {
            bot.send_message(chat_id, NO_API_KEY)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
    }
    Ok(())
}

/// `/recipe <dish>` generates immediately; a bare `/recipe` shows the
/// recipe-type submenu. Neither form touches the pending context.
async fn handle_recipe_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    store: &Arc<dyn SessionStore>,
    client: &Arc<GenerationClient>,
    dish: &str,
) -> Result<()> {
    let session = store.get(user_id).await?;
    let Some(api_key) = session.api_key else {
        bot.send_message(chat_id, API_KEY_REQUIRED)
            .parse_mode(ParseMode::Markdown)
            .await?;
        return Ok(());
    };

    if dish.is_empty() {
        bot.send_message(chat_id, RECIPE_MENU_TEXT)
            .parse_mode(ParseMode::Markdown)
            .reply_markup(recipe_keyboard())
            .await?;
        return Ok(());
    }

    let prompt = prompt_for(ContextTag::RecipeStandard, dish);
    bot.send_chat_action(chat_id, ChatAction::Typing).await?;
    match client.generate_text(&api_key, &prompt, user_id).await {
        Ok(content) => {
            let reply = format_text_reply(&reply_title(ContextTag::RecipeStandard, dish), &content);
            bot.send_message(chat_id, reply)
                .parse_mode(ParseMode::Markdown)
                .reply_markup(restart_keyboard())
                .await?;
        }
        Err(e) => report_generation_error(bot, chat_id, user_id, &e).await?,
    }
    Ok(())
}

/// `/picture <dish>` generates an image immediately with the plated prompt;
/// a bare `/picture` shows the usage hint.
async fn handle_picture_command(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    store: &Arc<dyn SessionStore>,
    client: &Arc<GenerationClient>,
    dish: &str,
) -> Result<()> {
    let session = store.get(user_id).await?;
    let Some(api_key) = session.api_key else {
        bot.send_message(chat_id, API_KEY_REQUIRED)
            .parse_mode(ParseMode::Markdown)
            .await?;
        return Ok(());
    };

    if dish.is_empty() {
        bot.send_message(chat_id, PICTURE_USAGE)
            .parse_mode(ParseMode::Markdown)
            .await?;
        return Ok(());
    }

    let prompt = plated_picture_prompt(dish);
    bot.send_chat_action(chat_id, ChatAction::UploadPhoto).await?;
    match client.generate_image(&api_key, &prompt, user_id, dish).await {
        Ok(file_path) => {
            deliver_image(bot, chat_id, ContextTag::Pictures, dish, &file_path).await?;
        }
        Err(e) => report_generation_error(bot, chat_id, user_id, &e).await?,
    }
    Ok(())
}

async fn handle_free_text(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    store: &Arc<dyn SessionStore>,
    client: &Arc<GenerationClient>,
    text: &str,
) -> Result<()> {
    let mut session = store.get(user_id).await?;

    match plan_text(&session, text) {
        TextAction::RejectBlankKey => {
            bot.send_message(chat_id, API_KEY_REQUIRED)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        TextAction::CaptureKey(key) => {
            session.api_key = Some(key);
            store.put(user_id, &session).await?;
            info!(user_id, "API key captured");
            bot.send_message(chat_id, API_KEY_SAVED)
                .parse_mode(ParseMode::Markdown)
                .await?;
            show_category_menu(bot, chat_id).await?;
        }
        TextAction::SelectActionFirst => {
            bot.send_message(chat_id, SELECT_ACTION_FIRST)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        TextAction::Generate { tag, subject } => {
            // plan_text only returns Generate when a key is present
            let api_key = session.api_key.clone().unwrap_or_default();
            let action = if tag.is_image() {
                ChatAction::UploadPhoto
            } else {
                ChatAction::Typing
            };
            bot.send_chat_action(chat_id, action).await?;

            match generate(client, &api_key, tag, &subject, user_id).await {
                Ok(result) => {
                    deliver_result(bot, chat_id, tag, &subject, result).await?;
                    // Cleared only on success so a failed request can be retried
                    session.pending_context = None;
                    store.put(user_id, &session).await?;
                }
                Err(e) => report_generation_error(bot, chat_id, user_id, &e).await?,
            }
        }
    }
    Ok(())
}

/// Run the generation selected by a context tag against the backend.
async fn generate(
    client: &Arc<GenerationClient>,
    api_key: &str,
    tag: ContextTag,
    subject: &str,
    user_id: i64,
) -> Result<GenerationResult, GenerationError> {
    let prompt = prompt_for(tag, subject);
    if tag.is_image() {
        let file_path = client
            .generate_image(api_key, &prompt, user_id, subject)
            .await?;
        Ok(GenerationResult::Image { file_path })
    } else {
        let content = client.generate_text(api_key, &prompt, user_id).await?;
        Ok(GenerationResult::Text { content })
    }
}

/// Send a generation result to the chat, with the per-tag title and the
/// restart control.
async fn deliver_result(
    bot: &Bot,
    chat_id: ChatId,
    tag: ContextTag,
    subject: &str,
    result: GenerationResult,
) -> Result<()> {
    match result {
        GenerationResult::Text { content } => {
            let reply = format_text_reply(&reply_title(tag, subject), &content);
            bot.send_message(chat_id, reply)
                .parse_mode(ParseMode::Markdown)
                .reply_markup(restart_keyboard())
                .await?;
        }
        GenerationResult::Image { file_path } => {
            deliver_image(bot, chat_id, tag, subject, &file_path).await?;
        }
    }
    Ok(())
}

async fn deliver_image(
    bot: &Bot,
    chat_id: ChatId,
    tag: ContextTag,
    subject: &str,
    file_path: &Path,
) -> Result<()> {
    bot.send_photo(chat_id, InputFile::file(file_path))
        .caption(reply_title(tag, subject))
        .parse_mode(ParseMode::Markdown)
        .reply_markup(restart_keyboard())
        .await?;

    // The file has been uploaded; local copies are not retained
    if let Err(cleanup_err) = std::fs::remove_file(file_path) {
        warn!(path = %file_path.display(), error = %cleanup_err, "Failed to clean up image file");
    } else {
        debug!(path = %file_path.display(), "Image file cleaned up after delivery");
    }
    Ok(())
}

/// Report a generation failure to the user without altering session state.
pub(super) async fn report_generation_error(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    error: &GenerationError,
) -> Result<()> {
    error!(user_id, error = %error, "Generation request failed");
    bot.send_message(chat_id, format!("❌ {}", error.user_message()))
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

pub(super) async fn show_category_menu(bot: &Bot, chat_id: ChatId) -> Result<()> {
    bot.send_message(chat_id, CATEGORY_MENU_TEXT)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(category_keyboard())
        .await?;
    Ok(())
}
