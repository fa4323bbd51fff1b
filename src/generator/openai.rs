//! OpenAI Chat Completions クライアント
//!
//! OpenAI互換の /chat/completions エンドポイントを呼び出す。
//! ローカルファイルの画像は base64 の data URL として送る。

use super::client::{CompletionClient, CompletionRequest};
use crate::config::Config;
use crate::error::{AltTextError, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Chat Completions リクエスト
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// Chat Completions レスポンス
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// 拡張子からMIMEタイプを推定
fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
}

/// 画像参照をAPIに渡すURLへ変換
///
/// http(s)/data URL はそのまま、存在するローカルファイルは data URL に変換
pub fn image_reference_to_url(reference: &str) -> Result<String> {
    let lower = reference.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:") {
        return Ok(reference.to_string());
    }

    let path = Path::new(reference);
    if path.is_file() {
        let bytes = std::fs::read(path)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        return Ok(format!("data:{};base64,{}", mime_type_for(path), encoded));
    }

    Ok(reference.to_string())
}

fn build_chat_request(request: &CompletionRequest) -> Result<ChatRequest> {
    let content = match &request.image {
        Some(image) => MessageContent::Parts(vec![
            ContentPart::Text {
                text: request.prompt.clone(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image_reference_to_url(image)?,
                },
            },
        ]),
        None => MessageContent::Text(request.prompt.clone()),
    };

    Ok(ChatRequest {
        model: request.model.clone(),
        messages: vec![ChatMessage {
            role: "user",
            content,
        }],
        temperature: request.temperature,
    })
}

/// OpenAI互換APIクライアント
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AltTextError::ApiCall(format!("HTTPクライアント作成エラー: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Self::new(
            api_key,
            &config.api_base_url,
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_chat_request(request)?;
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            "POST {} model={} image={} prompt={} chars",
            url,
            request.model,
            request.image.is_some(),
            request.prompt.len()
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AltTextError::ApiCall(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(AltTextError::ApiCall(format!("HTTP {}: {}", status, message)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AltTextError::ApiParse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AltTextError::ApiParse("空のレスポンス".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request_serializes_plain_content() {
        let request = CompletionRequest::text("gpt-4o", "hello".into()).with_temperature(0.3);
        let body = serde_json::to_value(build_chat_request(&request).unwrap()).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_vision_request_serializes_parts() {
        let request = CompletionRequest::text("gpt-4o-mini", "describe".into())
            .with_image("https://example.com/a.jpg");
        let body = serde_json::to_value(build_chat_request(&request).unwrap()).unwrap();

        let parts = &body["messages"][0]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "https://example.com/a.jpg");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_local_file_becomes_data_url() {
        let dir = std::env::temp_dir().join("wp-alt-text-test-data-url");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("logo.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let url = image_reference_to_url(&path.display().to_string()).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_remote_and_unknown_references_pass_through() {
        assert_eq!(
            image_reference_to_url("HTTPS://example.com/a.jpg").unwrap(),
            "HTTPS://example.com/a.jpg"
        );
        assert_eq!(image_reference_to_url("/uploads/missing.jpg").unwrap(), "/uploads/missing.jpg");
    }

    #[test]
    fn test_parse_error_body() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": {"message": "Invalid API key", "type": "auth"}}"#).unwrap();
        assert_eq!(body.error.message, "Invalid API key");
    }
}
