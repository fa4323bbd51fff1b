//! alt生成の実行モジュール
//!
//! RunConfig を検証して対象行を選び（prepare）、生成器で順に処理して
//! 結果ワークブックを書き出す（execute）。
//! 前提条件のエラーはすべて prepare で検出し、APIリクエストは発生しない。

mod batch;
mod dataset;
mod summary;

pub use batch::{progress_bar, run_batch, BatchOptions, BatchReport, CancelToken};
pub use dataset::{columns, Dataset, StatusCounts, ERROR_PREFIX};
pub use summary::{
    estimate_cost, example_successes, CostEstimate, Example, RunSummary, COST_PER_REQUEST,
    COST_PER_TEXT_REQUEST,
};

use crate::config::Config;
use crate::error::{AltTextError, Result};
use crate::generator::{AltTextGenerator, CompletionClient, GeneratorSettings, StrategyGenerator};
use crate::workbook::{read_table, write_generation_workbook};
use alt_text_common::Approach;
use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// サンプル実行の既定件数
pub const DEFAULT_SAMPLE_SIZE: usize = 3;

/// 表示する成功例の件数
pub const EXAMPLE_COUNT: usize = 3;

/// 処理対象の選び方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsetPolicy {
    /// 全行（処理済みも上書き）
    All,
    /// 未処理の行のみ
    Unprocessed,
    /// 先頭N行
    Sample(usize),
    /// 1始まり・両端を含む行範囲
    Range { start: usize, end: usize },
}

impl SubsetPolicy {
    pub fn overwrites(&self) -> bool {
        matches!(self, SubsetPolicy::All)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            SubsetPolicy::Range { start, end } if start == 0 || end < start => Err(
                AltTextError::InvalidRange(format!("{}-{}", start, end)),
            ),
            SubsetPolicy::Sample(0) => Err(AltTextError::EmptySelection),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SubsetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetPolicy::All => write!(f, "全行（上書き）"),
            SubsetPolicy::Unprocessed => write!(f, "未処理のみ"),
            SubsetPolicy::Sample(n) => write!(f, "先頭{}行", n),
            SubsetPolicy::Range { start, end } => write!(f, "{}〜{}行目", start, end),
        }
    }
}

/// 対象行を選ぶ（テーブル順）
pub fn select_rows(dataset: &Dataset, policy: &SubsetPolicy) -> Result<Vec<usize>> {
    policy.validate()?;

    let rows: Vec<usize> = match *policy {
        SubsetPolicy::All => (0..dataset.len()).collect(),
        SubsetPolicy::Unprocessed => dataset.unprocessed_rows(),
        SubsetPolicy::Sample(n) => (0..n.min(dataset.len())).collect(),
        SubsetPolicy::Range { start, end } => {
            if start > dataset.len() {
                return Err(AltTextError::InvalidRange(format!(
                    "{}-{}（データは{}行）",
                    start,
                    end,
                    dataset.len()
                )));
            }
            (start - 1..end.min(dataset.len())).collect()
        }
    };

    if rows.is_empty() {
        return Err(AltTextError::EmptySelection);
    }
    Ok(rows)
}

/// 既定の出力ファイル名（入力ファイルと同じディレクトリ）
pub fn default_output_path(input: &Path, approach: Approach, now: DateTime<Local>) -> PathBuf {
    let name = format!(
        "wordpress_alt_text_approach_{}_{}.xlsx",
        approach.number(),
        now.format("%Y%m%d_%H%M%S")
    );
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

/// 1回の実行設定
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    /// None なら先頭シート
    pub sheet: Option<String>,
    pub approach: Approach,
    pub subset: SubsetPolicy,
    pub delay: Duration,
    pub overwrite: bool,
    pub output: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, approach: Approach) -> Self {
        Self {
            input: input.into(),
            sheet: None,
            approach,
            subset: SubsetPolicy::Unprocessed,
            delay: Duration::from_secs(1),
            overwrite: false,
            output: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.input.is_file() {
            return Err(AltTextError::FileNotFound(self.input.display().to_string()));
        }
        self.subset.validate()
    }

    /// 処理済み行も再生成するか
    pub fn overwrites(&self) -> bool {
        self.overwrite || self.subset.overwrites()
    }

    pub fn output_path(&self, now: DateTime<Local>) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input, self.approach, now))
    }

    /// 方式に応じた生成器を組み立てる（2ステップは delay をStep間に使う）
    pub fn generator<C: CompletionClient>(&self, client: C, config: &Config) -> StrategyGenerator<C> {
        let step_delay = match self.approach {
            Approach::TwoStep => self.delay,
            _ => Duration::ZERO,
        };
        StrategyGenerator::new(
            self.approach,
            client,
            GeneratorSettings::from_config(config, step_delay),
        )
    }
}

/// 検証済みの実行対象
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub dataset: Dataset,
    pub rows: Vec<usize>,
}

impl PreparedRun {
    pub fn estimate(&self, approach: Approach) -> CostEstimate {
        estimate_cost(approach, self.rows.len())
    }
}

/// 前提条件を確認し対象行を決める
pub fn prepare(config: &RunConfig) -> Result<PreparedRun> {
    config.validate()?;

    let table = read_table(&config.input, config.sheet.as_deref())?;
    let dataset = Dataset::new(table)?;
    let rows = select_rows(&dataset, &config.subset)?;

    info!(
        "シート '{}': {}行中{}行を処理対象に選択（{}）",
        dataset.table().name,
        dataset.len(),
        rows.len(),
        config.subset
    );
    Ok(PreparedRun { dataset, rows })
}

/// 実行結果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: PathBuf,
    pub summary: RunSummary,
    pub report: BatchReport,
    pub examples: Vec<Example>,
}

/// バッチを実行し結果ワークブックを書き出す
///
/// 行単位の失敗があっても、中断されても出力ファイルは書き出す。
pub async fn execute<G>(
    config: &RunConfig,
    prepared: PreparedRun,
    generator: &G,
    cancel: &CancelToken,
    progress: &ProgressBar,
) -> Result<RunOutcome>
where
    G: AltTextGenerator + ?Sized,
{
    let started = Instant::now();
    let PreparedRun { mut dataset, rows } = prepared;
    let options = BatchOptions {
        delay: config.delay,
        overwrite: config.overwrites(),
    };

    let report = run_batch(&mut dataset, &rows, generator, &options, cancel, progress).await;

    let summary = RunSummary::from_dataset(
        &dataset,
        generator.approach(),
        started.elapsed(),
        report.quality_warnings,
        report.cancelled,
    );
    let examples = example_successes(&dataset, EXAMPLE_COUNT);

    let output_path = config.output_path(Local::now());
    write_generation_workbook(dataset.table(), &summary, &output_path)?;
    info!("保存しました: {}", output_path.display());

    Ok(RunOutcome {
        output_path,
        summary,
        report,
        examples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alt_text_common::{CellValue, Table};
    use chrono::TimeZone;

    fn dataset(statuses: &[&str]) -> Dataset {
        let mut table = Table::new(
            "Sheet1",
            vec!["php_file".into(), "image_url".into(), "ai_analysis_status".into()],
        );
        for (i, status) in statuses.iter().enumerate() {
            table.push_row(vec![
                CellValue::from("index.php"),
                CellValue::from(format!("{}.png", i)),
                CellValue::from(*status),
            ]);
        }
        Dataset::new(table).unwrap()
    }

    #[test]
    fn test_select_rows_policies() {
        let data = dataset(&["success", "", "error", "decorative", ""]);

        assert_eq!(select_rows(&data, &SubsetPolicy::All).unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(select_rows(&data, &SubsetPolicy::Unprocessed).unwrap(), vec![1, 2, 4]);
        assert_eq!(select_rows(&data, &SubsetPolicy::Sample(3)).unwrap(), vec![0, 1, 2]);
        assert_eq!(select_rows(&data, &SubsetPolicy::Sample(10)).unwrap().len(), 5);
        assert_eq!(
            select_rows(&data, &SubsetPolicy::Range { start: 2, end: 3 }).unwrap(),
            vec![1, 2]
        );
        assert_eq!(
            select_rows(&data, &SubsetPolicy::Range { start: 4, end: 99 }).unwrap(),
            vec![3, 4]
        );
    }

    #[test]
    fn test_select_rows_invalid_range() {
        let data = dataset(&["", ""]);
        for (start, end) in [(0, 1), (2, 1), (3, 4)] {
            let err = select_rows(&data, &SubsetPolicy::Range { start, end }).unwrap_err();
            assert!(matches!(err, AltTextError::InvalidRange(_)), "{}-{}", start, end);
        }
    }

    #[test]
    fn test_select_rows_empty_selection() {
        let data = dataset(&["success", "decorative"]);
        assert!(matches!(
            select_rows(&data, &SubsetPolicy::Unprocessed),
            Err(AltTextError::EmptySelection)
        ));
        assert!(matches!(
            select_rows(&dataset(&[]), &SubsetPolicy::All),
            Err(AltTextError::EmptySelection)
        ));
    }

    #[test]
    fn test_default_output_path() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let path = default_output_path(Path::new("/data/images.xlsx"), Approach::OneStepVision, now);
        assert_eq!(
            path,
            PathBuf::from("/data/wordpress_alt_text_approach_2_20240305_140709.xlsx")
        );

        let bare = default_output_path(Path::new("images.xlsx"), Approach::TwoStep, now);
        assert_eq!(bare, PathBuf::from("wordpress_alt_text_approach_1_20240305_140709.xlsx"));
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::new("missing.xlsx", Approach::OneStepText);
        assert!(!config.overwrites());
        assert!(matches!(config.validate(), Err(AltTextError::FileNotFound(_))));

        let all = RunConfig {
            subset: SubsetPolicy::All,
            ..config
        };
        assert!(all.overwrites());
    }

    #[test]
    fn test_generator_uses_configured_approach() {
        let config = RunConfig {
            delay: Duration::from_millis(1500),
            ..RunConfig::new("in.xlsx", Approach::TwoStep)
        };
        struct NoClient;
        #[async_trait::async_trait]
        impl CompletionClient for NoClient {
            async fn complete(
                &self,
                _request: &crate::generator::CompletionRequest,
            ) -> Result<String> {
                Err(AltTextError::ApiCall("unused".into()))
            }
        }
        let generator = config.generator(NoClient, &Config::default());
        assert_eq!(generator.approach(), Approach::TwoStep);
    }
}
