//! alt生成モジュール
//!
//! 補完APIクライアントと3つの生成方式

pub mod client;
pub mod openai;
pub mod strategy;

pub use client::{CompletionClient, CompletionRequest};
pub use openai::OpenAiClient;
pub use strategy::{
    AltTextGenerator, GeneratorSettings, StrategyGenerator, TEXT_DESCRIPTION_PLACEHOLDER,
    VISION_DESCRIPTION_PLACEHOLDER,
};
