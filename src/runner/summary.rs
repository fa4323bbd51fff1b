//! 実行サマリーとコスト見積もり

use super::dataset::{Dataset, StatusCounts};
use alt_text_common::{AnalysisStatus, Approach, CellValue};
use std::time::Duration;

/// 1リクエストあたりの概算コスト（USD）
pub const COST_PER_REQUEST: f64 = 0.01;
/// テキストのみ方式の概算コスト（USD）
pub const COST_PER_TEXT_REQUEST: f64 = 0.005;

/// 実行前の見積もり
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub images: usize,
    pub requests: usize,
    pub cost_usd: f64,
}

/// 画像数と方式からリクエスト数・コストを見積もる
pub fn estimate_cost(approach: Approach, images: usize) -> CostEstimate {
    let requests = images * approach.requests_per_image();
    let unit = if approach.uses_vision() {
        COST_PER_REQUEST
    } else {
        COST_PER_TEXT_REQUEST
    };
    CostEstimate {
        images,
        requests,
        cost_usd: requests as f64 * unit,
    }
}

/// 成功例（表示用）
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub identity: String,
    pub image_url: String,
    pub alt_text: String,
}

/// 先頭から最大 limit 件の success 行
pub fn example_successes(dataset: &Dataset, limit: usize) -> Vec<Example> {
    (0..dataset.len())
        .filter(|&row| dataset.status(row) == AnalysisStatus::Success)
        .take(limit)
        .map(|row| Example {
            identity: dataset.identity(row),
            image_url: dataset.image_url(row),
            alt_text: dataset.alt_text(row),
        })
        .collect()
}

/// 実行結果の集計（出力ファイルの Statistics シート）
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub approach: Approach,
    pub elapsed: Duration,
    pub total_rows: usize,
    pub counts: StatusCounts,
    pub quality_warnings: usize,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn from_dataset(
        dataset: &Dataset,
        approach: Approach,
        elapsed: Duration,
        quality_warnings: usize,
        cancelled: bool,
    ) -> Self {
        Self {
            approach,
            elapsed,
            total_rows: dataset.len(),
            counts: dataset.counts(),
            quality_warnings,
            cancelled,
        }
    }

    /// 利用可能なalt（success + decorative）
    pub fn usable(&self) -> usize {
        self.counts.usable()
    }

    pub fn metrics(&self) -> Vec<(&'static str, CellValue)> {
        let number = |n: usize| CellValue::Number(n as f64);
        vec![
            ("Approach used", CellValue::from(self.approach.label())),
            (
                "Processing time (seconds)",
                CellValue::Number((self.elapsed.as_secs_f64() * 100.0).round() / 100.0),
            ),
            ("Total number of images", number(self.total_rows)),
            ("Generated alt texts (success)", number(self.counts.success)),
            ("Marked as decorative", number(self.counts.decorative)),
            ("Generation errors", number(self.counts.error)),
            ("Total AI alt texts", number(self.usable())),
            ("Quality warnings", number(self.quality_warnings)),
        ]
    }
}
