//! # Generation Client Module
//!
//! Wraps the two Hyperbolic endpoints: chat completion and image generation.
//! Remote failures are normalized into [`GenerationError`]: HTTP 401 maps to
//! `Auth`, everything else to `Processing`. Image payloads arrive as base64
//! and are written as PNG files under the configured directory.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{BotConfig, ImageModelConfig, TextModelConfig};
use crate::errors::GenerationError;
use crate::prompts::SYSTEM_PROMPT;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    model_name: &'a str,
    prompt: &'a str,
    steps: u32,
    cfg_scale: f32,
    enable_refiner: bool,
    height: u32,
    width: u32,
    backend: &'a str,
}

#[derive(Deserialize, Default)]
struct ImageGenerationResponse {
    #[serde(default)]
    images: Vec<ImagePayload>,
}

#[derive(Deserialize)]
struct ImagePayload {
    #[serde(default)]
    image: Option<String>,
}

/// Result of one generation call, consumed once to build the outbound reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Text { content: String },
    Image { file_path: PathBuf },
}

/// Client for the Hyperbolic generation API. The model configuration is
/// fixed at construction; the API key is supplied per call from the session.
pub struct GenerationClient {
    http: Client,
    base_url: String,
    text_model: TextModelConfig,
    image_model: ImageModelConfig,
    image_dir: PathBuf,
}

impl GenerationClient {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.api_base_url.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            image_dir: config.image_dir.clone(),
        }
    }

    /// Issue a chat-completion request and return the first choice's content,
    /// escaped for Telegram markdown.
    pub async fn generate_text(
        &self,
        api_key: &str,
        prompt: &str,
        user_id: i64,
    ) -> Result<String, GenerationError> {
        info!(
            user_id,
            prompt_preview = prompt.chars().take(50).collect::<String>().as_str(),
            "Sending text generation request"
        );

        let body = ChatCompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            model: &self.text_model.api_model_name,
            max_tokens: self.text_model.max_tokens,
            temperature: self.text_model.temperature,
            top_p: self.text_model.top_p,
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Processing(e.to_string()))?;

        check_status(response.status())?;

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Processing(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::Processing("response contained no choices".to_string()))?;

        debug!(user_id, chars = content.len(), "Received text completion");
        Ok(escape_markdown(&content))
    }

    /// Issue an image-generation request, decode the base64 payload and write
    /// it under the image directory. Returns the path of the written file;
    /// the caller owns the file and deletes it after delivery.
    pub async fn generate_image(
        &self,
        api_key: &str,
        prompt: &str,
        user_id: i64,
        label: &str,
    ) -> Result<PathBuf, GenerationError> {
        info!(
            user_id,
            prompt_preview = prompt.chars().take(50).collect::<String>().as_str(),
            "Sending image generation request"
        );

        let body = ImageGenerationRequest {
            model_name: &self.image_model.api_model_name,
            prompt,
            steps: self.image_model.steps,
            cfg_scale: self.image_model.cfg_scale,
            enable_refiner: self.image_model.enable_refiner,
            height: self.image_model.height,
            width: self.image_model.width,
            backend: "auto",
        };

        let response = self
            .http
            .post(format!("{}/v1/image/generation", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Processing(e.to_string()))?;

        check_status(response.status())?;

        let parsed: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Processing(e.to_string()))?;

        let image_data = parsed
            .images
            .into_iter()
            .next()
            .and_then(|payload| payload.image)
            .ok_or_else(|| GenerationError::Processing("no image data received".to_string()))?;

        let bytes = BASE64_STANDARD
            .decode(image_data.as_bytes())
            .map_err(|e| GenerationError::Processing(e.to_string()))?;

        let path = self.image_path(label, user_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GenerationError::Processing(e.to_string()))?;
        }
        std::fs::write(&path, &bytes).map_err(|e| GenerationError::Processing(e.to_string()))?;

        debug!(user_id, path = %path.display(), bytes = bytes.len(), "Image written");
        Ok(path)
    }

    /// Path for a generated image under the configured directory.
    fn image_path(&self, label: &str, user_id: i64) -> PathBuf {
        self.image_dir.join(image_file_name(label, user_id))
    }

    /// Directory generated images are written to.
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }
}

/// Map a non-success HTTP status to the error taxonomy.
fn check_status(status: StatusCode) -> Result<(), GenerationError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(GenerationError::Auth);
    }
    if !status.is_success() {
        return Err(GenerationError::Processing(format!(
            "backend returned {status}"
        )));
    }
    Ok(())
}

/// File name for a generated image: whitespace in the label is replaced by
/// underscores and the user id is appended.
pub fn image_file_name(label: &str, user_id: i64) -> String {
    let sanitized = label.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{sanitized}_{user_id}.png")
}

/// Escape Telegram markdown special characters in model output so formatted
/// replies render the content literally.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BotConfig;

    fn test_client(image_dir: &Path) -> GenerationClient {
        let config = BotConfig {
            bot_token: "token".to_string(),
            database_url: "postgres://localhost/worldfood".to_string(),
            api_base_url: "http://localhost:9999".to_string(),
            image_dir: image_dir.to_path_buf(),
            text_model: TextModelConfig::default(),
            image_model: ImageModelConfig::default(),
        };
        GenerationClient::new(&config)
    }

    #[test]
    fn test_image_path_replaces_whitespace_with_underscores() {
        let client = test_client(Path::new("images"));
        let path = client.image_path("Spicy Noodles", 42);
        assert_eq!(path, PathBuf::from("images/Spicy_Noodles_42.png"));
    }

    #[test]
    fn test_image_path_collapses_whitespace_runs() {
        let client = test_client(Path::new("images"));
        let path = client.image_path("Pad \t Thai", 7);
        assert_eq!(path, PathBuf::from("images/Pad_Thai_7.png"));
    }

    #[test]
    fn test_image_path_uses_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path());
        let path = client.image_path("Sushi", 7);
        assert_eq!(path, dir.path().join("Sushi_7.png"));
        assert_eq!(client.image_dir(), dir.path());
    }

    #[test]
    fn test_unauthorized_maps_to_auth_error() {
        assert_eq!(
            check_status(StatusCode::UNAUTHORIZED),
            Err(GenerationError::Auth)
        );
    }

    #[test]
    fn test_other_failures_map_to_processing_error() {
        assert!(matches!(
            check_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(GenerationError::Processing(_))
        ));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS),
            Err(GenerationError::Processing(_))
        ));
        assert_eq!(check_status(StatusCode::OK), Ok(()));
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(
            escape_markdown("a *bold* _move_ [link] `code`"),
            "a \\*bold\\* \\_move\\_ \\[link] \\`code\\`"
        );
        assert_eq!(escape_markdown("plain text"), "plain text");
    }

    #[test]
    fn test_chat_request_wire_format() {
        let body = ChatCompletionRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            model: "meta-llama/Meta-Llama-3.1-8B-Instruct",
            max_tokens: 2048,
            temperature: 0.7,
            top_p: 0.9,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "meta-llama/Meta-Llama-3.1-8B-Instruct");
        assert_eq!(value["max_tokens"], 2048);
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(value["top_p"].is_number());
    }

    #[test]
    fn test_image_request_wire_format() {
        let body = ImageGenerationRequest {
            model_name: "FLUX.1-dev",
            prompt: "a plate",
            steps: 50,
            cfg_scale: 7.0,
            enable_refiner: false,
            height: 1024,
            width: 1024,
            backend: "auto",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model_name"], "FLUX.1-dev");
        assert_eq!(value["steps"], 50);
        assert_eq!(value["enable_refiner"], false);
        assert_eq!(value["backend"], "auto");
    }

    #[test]
    fn test_chat_response_parsing() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"A recipe"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content, "A recipe");
    }

    #[test]
    fn test_image_response_without_payload() {
        let empty: ImageGenerationResponse = serde_json::from_str(r#"{"images":[]}"#).unwrap();
        assert!(empty.images.is_empty());

        let missing_field: ImageGenerationResponse =
            serde_json::from_str(r#"{"images":[{}]}"#).unwrap();
        assert!(missing_field.images[0].image.is_none());
    }
}
