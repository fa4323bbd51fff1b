//! alt生成の3方式
//!
//! - 2ステップ: Vision（説明文）→ テキストLLM（alt）
//! - 1ステップ（Vision）: 画像 + コンテキスト → alt
//! - 1ステップ（テキスト）: URL + コンテキスト → alt

use super::client::{CompletionClient, CompletionRequest};
use crate::config::Config;
use crate::error::GenerationError;
use alt_text_common::{
    build_text_prompt, build_two_step_prompt, build_vision_prompt, normalize_alt_response,
    Approach, GenerationOutcome, GenerationRequest, DESCRIPTION_PROMPT,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// 1ステップ（Vision）で記録する説明文
pub const VISION_DESCRIPTION_PLACEHOLDER: &str = "Generated with vision in one step";

/// 1ステップ（テキスト）で記録する説明文
pub const TEXT_DESCRIPTION_PLACEHOLDER: &str = "Generated from filename/context only";

/// alt生成の共通インターフェース（ディスパッチャはこれだけに依存する）
#[async_trait]
pub trait AltTextGenerator: Send + Sync {
    fn approach(&self) -> Approach;

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError>;
}

/// モデル・待機などの生成設定
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub description_model: String,
    pub alt_text_model: String,
    pub temperature: f32,
    /// 2ステップ方式のStep1後の待機
    pub step_delay: Duration,
    pub max_context_chars: usize,
}

impl GeneratorSettings {
    pub fn from_config(config: &Config, step_delay: Duration) -> Self {
        Self {
            description_model: config.description_model.clone(),
            alt_text_model: config.alt_text_model.clone(),
            temperature: config.temperature,
            step_delay,
            max_context_chars: config.max_context_chars,
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default(), Duration::ZERO)
    }
}

/// コンテキストを最大文字数で切り詰め（UTF-8安全）
pub fn truncate_context(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 方式ごとの生成器
pub struct StrategyGenerator<C> {
    approach: Approach,
    client: C,
    settings: GeneratorSettings,
}

impl<C: CompletionClient> StrategyGenerator<C> {
    pub fn new(approach: Approach, client: C, settings: GeneratorSettings) -> Self {
        Self {
            approach,
            client,
            settings,
        }
    }

    fn alt_request(&self, prompt: String) -> CompletionRequest {
        CompletionRequest::text(&self.settings.alt_text_model, prompt)
            .with_temperature(self.settings.temperature)
    }

    async fn two_step(
        &self,
        request: &GenerationRequest,
        context: &str,
    ) -> Result<GenerationOutcome, GenerationError> {
        info!("[Step 1/2] 画像を解析中...");
        let step1 = CompletionRequest::text(&self.settings.description_model, DESCRIPTION_PROMPT.to_string())
            .with_image(&request.image_url);

        let description = self
            .client
            .complete(&step1)
            .await
            .map_err(|e| GenerationError::StepOneFailure(e.to_string()))?
            .trim()
            .to_string();
        if description.is_empty() {
            return Err(GenerationError::StepOneFailure("空の画像説明".into()));
        }
        info!("説明: {}...", description.chars().take(100).collect::<String>());

        // レート制限対策の固定待機
        if !self.settings.step_delay.is_zero() {
            tokio::time::sleep(self.settings.step_delay).await;
        }

        info!("[Step 2/2] altを生成中...");
        let step2 = self.alt_request(build_two_step_prompt(request, context, &description));
        let step_two_failure = |message: String| GenerationError::StepTwoFailure {
            message,
            description: description.clone(),
        };

        let response = self
            .client
            .complete(&step2)
            .await
            .map_err(|e| step_two_failure(e.to_string()))?;
        let normalized = normalize_alt_response(&response).map_err(|e| step_two_failure(e.to_string()))?;

        Ok(GenerationOutcome {
            description: description.clone(),
            alt_text: normalized.alt_text,
            status: normalized.status,
        })
    }

    async fn one_step(
        &self,
        request: &GenerationRequest,
        context: &str,
        with_image: bool,
    ) -> Result<GenerationOutcome, GenerationError> {
        let (completion, placeholder) = if with_image {
            info!("Vision APIで解析中...");
            (
                self.alt_request(build_vision_prompt(request, context)).with_image(&request.image_url),
                VISION_DESCRIPTION_PLACEHOLDER,
            )
        } else {
            info!("コンテキストから生成中（テキストのみ）...");
            (
                self.alt_request(build_text_prompt(request, context)),
                TEXT_DESCRIPTION_PLACEHOLDER,
            )
        };

        let response = self
            .client
            .complete(&completion)
            .await
            .map_err(|e| GenerationError::GenerationFailure(e.to_string()))?;
        let normalized = normalize_alt_response(&response)
            .map_err(|e| GenerationError::GenerationFailure(e.to_string()))?;

        Ok(GenerationOutcome {
            description: placeholder.to_string(),
            alt_text: normalized.alt_text,
            status: normalized.status,
        })
    }
}

#[async_trait]
impl<C: CompletionClient> AltTextGenerator for StrategyGenerator<C> {
    fn approach(&self) -> Approach {
        self.approach
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let context = truncate_context(&request.context, self.settings.max_context_chars);

        match self.approach {
            Approach::TwoStep => self.two_step(request, context).await,
            Approach::OneStepVision => self.one_step(request, context, true).await,
            Approach::OneStepText => self.one_step(request, context, false).await,
        }
    }
}
