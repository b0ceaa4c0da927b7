//! # Bot Configuration Module
//!
//! Static model parameter records and the environment-derived bot
//! configuration. Model configuration is fixed at startup and injected into
//! the generation client; there is no runtime model switch.

use std::env;
use std::path::PathBuf;

use crate::errors::ConfigError;

/// Base URL of the Hyperbolic API, overridable via `HYPERBOLIC_API_URL`
pub const DEFAULT_API_BASE_URL: &str = "https://api.hyperbolic.xyz";
/// Directory for generated image files, overridable via `IMAGE_DIR`
pub const DEFAULT_IMAGE_DIR: &str = "images";
/// Hard cap on outbound text replies, in characters
pub const MAX_REPLY_CHARS: usize = 4000;

/// Parameters for the chat-completion model
#[derive(Debug, Clone)]
pub struct TextModelConfig {
    pub display_name: String,
    pub api_model_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for TextModelConfig {
    fn default() -> Self {
        Self {
            display_name: "🦙 Meta Llama 3.1 8B".to_string(),
            api_model_name: "meta-llama/Meta-Llama-3.1-8B-Instruct".to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

/// Parameters for the image-generation model
#[derive(Debug, Clone)]
pub struct ImageModelConfig {
    pub display_name: String,
    pub api_model_name: String,
    pub steps: u32,
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    pub enable_refiner: bool,
}

impl Default for ImageModelConfig {
    fn default() -> Self {
        Self {
            display_name: "🎨 FLUX.1-dev".to_string(),
            api_model_name: "FLUX.1-dev".to_string(),
            steps: 50,
            cfg_scale: 7.0,
            width: 1024,
            height: 1024,
            enable_refiner: false,
        }
    }
}

/// Process-level configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    pub api_base_url: String,
    pub image_dir: PathBuf,
    pub text_model: TextModelConfig,
    pub image_model: ImageModelConfig,
}

impl BotConfig {
    /// Load configuration from the environment. `TELEGRAM_BOT_TOKEN` and
    /// `DATABASE_URL` are required; their absence is fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingVar("TELEGRAM_BOT_TOKEN"))?;
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let api_base_url =
            env::var("HYPERBOLIC_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let image_dir = env::var("IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_IMAGE_DIR));

        Ok(Self {
            bot_token,
            database_url,
            api_base_url,
            image_dir,
            text_model: TextModelConfig::default(),
            image_model: ImageModelConfig::default(),
        })
    }
}
