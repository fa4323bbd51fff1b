//! 画像レコードと生成結果の型定義
//!
//! 抽出ステージと生成ステージで共有される型:
//! - ImageRecord: 抽出の出力（1画像1行）
//! - AnalysisStatus: ai_analysis_status 列の値
//! - Approach: alt生成の3方式
//! - GenerationRequest / GenerationOutcome: 生成1件分の入出力

use serde::{Deserialize, Serialize};
use std::fmt;

/// 画像レコード（抽出結果の1行）
#[derive(Debug, Clone, Default)]
pub struct ImageRecord {
    pub post_id: String,
    pub post_title: String,
    pub post_type: String,
    pub post_status: String,
    /// 画像を含むページの絶対URL
    pub post_url: String,
    /// 画像の絶対URL（生成ステージでは書き換えない）
    pub image_url: String,
    pub current_alt: String,
    pub has_alt: bool,
    pub full_img_tag: String,
    /// タグ除去済みの本文全体
    pub context: String,
}

/// 解析ステータス
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Success,
    Decorative,
    Error,
    /// 未処理（空セル）
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl AnalysisStatus {
    /// セル値からパース（未知の値は未処理扱い）
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "success" => AnalysisStatus::Success,
            "decorative" => AnalysisStatus::Decorative,
            "error" => AnalysisStatus::Error,
            _ => AnalysisStatus::Unset,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Success => "success",
            AnalysisStatus::Decorative => "decorative",
            AnalysisStatus::Error => "error",
            AnalysisStatus::Unset => "",
        }
    }

    /// 処理済み（再実行でスキップする）か
    pub fn is_processed(&self) -> bool {
        matches!(self, AnalysisStatus::Success | AnalysisStatus::Decorative)
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// alt生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Approach {
    /// Vision API（説明文）→ テキストLLM（alt）
    TwoStep,
    /// Vision API + コンテキスト → alt
    OneStepVision,
    /// URL + コンテキストのみ → alt
    OneStepText,
}

impl Approach {
    pub const ALL: [Approach; 3] = [
        Approach::TwoStep,
        Approach::OneStepVision,
        Approach::OneStepText,
    ];

    /// 選択番号（1/2/3）
    pub fn number(&self) -> u8 {
        match self {
            Approach::TwoStep => 1,
            Approach::OneStepVision => 2,
            Approach::OneStepText => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.number() == n)
    }

    /// ai_approach_used 列に書くラベル
    pub fn label(&self) -> &'static str {
        match self {
            Approach::TwoStep => "Two-step (Vision + Text)",
            Approach::OneStepVision => "One-step (Vision)",
            Approach::OneStepText => "One-step (Text)",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Approach::TwoStep => "最も正確だが最も高価で遅い",
            Approach::OneStepVision => "2ステップより速く、品質も良好",
            Approach::OneStepText => "最速・最安。ファイル名と文脈から推定",
        }
    }

    /// 1画像あたりのAPIリクエスト数
    pub fn requests_per_image(&self) -> usize {
        match self {
            Approach::TwoStep => 2,
            _ => 1,
        }
    }

    /// 画像ペイロードを送るか
    pub fn uses_vision(&self) -> bool {
        !matches!(self, Approach::OneStepText)
    }

    /// 行ごとの待機を入れるか（2ステップは内部で待機する）
    pub fn paces_between_rows(&self) -> bool {
        !matches!(self, Approach::TwoStep)
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 生成1件分の入力
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub image_url: String,
    /// テンプレートファイル名やページURL
    pub identity: String,
    pub context: String,
    pub current_alt: String,
}

/// 生成1件分の出力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub description: String,
    pub alt_text: String,
    /// Success か Decorative のみ
    pub status: AnalysisStatus,
}
