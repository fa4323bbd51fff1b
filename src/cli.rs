use crate::error::{AltTextError, Result};
use crate::runner::{RunConfig, SubsetPolicy, DEFAULT_SAMPLE_SIZE};
use alt_text_common::Approach;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "wp-alt-text")]
#[command(about = "WordPress画像のaltテキスト抽出・AI生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// WordPressのエクスポートJSONから画像一覧を抽出
    Extract {
        /// エクスポートJSONファイル（phpMyAdmin形式または投稿の配列）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力Excelファイル（デフォルト: wordpress_images_alt_text.xlsx）
        #[arg(short, long, default_value = "wordpress_images_alt_text.xlsx")]
        output: PathBuf,

        /// サイトURL（投稿URL・相対画像パスの解決に使用）
        #[arg(short, long)]
        base_url: Option<String>,

        /// 除外する投稿タイプ（複数指定可、指定時は既定の除外リストを置き換え）
        #[arg(long = "exclude-type")]
        exclude_types: Vec<String>,
    },

    /// 画像一覧Excelにaltテキストを生成（方式未指定なら対話モード）
    Generate(GenerateArgs),

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct GenerateArgs {
    /// 画像一覧Excelファイル
    pub input: Option<PathBuf>,

    /// シート名（デフォルト: 先頭シート）
    #[arg(long)]
    pub sheet: Option<String>,

    /// 生成方式 (1:two-step / 2:vision / 3:text)
    #[arg(short, long)]
    pub approach: Option<ApproachArg>,

    /// 処理対象 (all/unprocessed/sample/range)
    #[arg(long, default_value = "unprocessed")]
    pub subset: SubsetArg,

    /// 行範囲（1始まり、例: 10-20）。--subset range で使用
    #[arg(long)]
    pub range: Option<String>,

    /// サンプル件数。--subset sample で使用
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample: usize,

    /// リクエスト間の待機秒数（デフォルト: 設定値）
    #[arg(short, long)]
    pub delay: Option<f64>,

    /// 処理済みの行も再生成
    #[arg(long)]
    pub overwrite: bool,

    /// 確認を省略
    #[arg(short, long)]
    pub yes: bool,

    /// 出力Excelファイル（デフォルト: 入力と同じフォルダに自動命名）
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// 対話なし実行での確認の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// --yes 指定済み
    Skip,
    /// 端末で yes/no を尋ねる
    Prompt,
    /// 尋ねられないので実行しない
    Refuse,
}

impl GenerateArgs {
    /// 方式が指定されていれば対話なしで実行する
    pub fn is_headless(&self) -> bool {
        self.approach.is_some()
    }

    /// リクエスト前の確認方法（`interactive` は標準入力が端末かどうか）
    pub fn confirmation(&self, interactive: bool) -> Confirmation {
        if self.yes {
            Confirmation::Skip
        } else if interactive {
            Confirmation::Prompt
        } else {
            Confirmation::Refuse
        }
    }

    /// フラグから RunConfig を組み立てる
    pub fn to_run_config(&self, default_delay: f64) -> Result<RunConfig> {
        let input = self
            .input
            .clone()
            .ok_or_else(|| AltTextError::CliExecution("入力ファイルを指定してください".into()))?;
        let approach = self
            .approach
            .map(Approach::from)
            .ok_or_else(|| AltTextError::CliExecution("--approach を指定してください".into()))?;

        let subset = match self.subset {
            SubsetArg::All => SubsetPolicy::All,
            SubsetArg::Unprocessed => SubsetPolicy::Unprocessed,
            SubsetArg::Sample => SubsetPolicy::Sample(self.sample),
            SubsetArg::Range => {
                let text = self
                    .range
                    .as_deref()
                    .ok_or_else(|| AltTextError::InvalidRange("--range を指定してください".into()))?;
                let (start, end) =
                    parse_range(text).ok_or_else(|| AltTextError::InvalidRange(text.to_string()))?;
                SubsetPolicy::Range { start, end }
            }
        };

        Ok(RunConfig {
            input: with_xlsx_extension(input),
            sheet: self.sheet.clone(),
            approach,
            subset,
            delay: parse_delay(self.delay.unwrap_or(default_delay))?,
            overwrite: self.overwrite,
            output: self.output.clone(),
        })
    }
}

/// 拡張子がなければ .xlsx を付ける
pub fn with_xlsx_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("xlsx")
    }
}

/// 待機秒数を検証して Duration に変換
pub fn parse_delay(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| AltTextError::CliExecution(format!("待機秒数が不正です: {}", seconds)))
}

/// "10-20" 形式の行範囲（1始まり）
pub fn parse_range(s: &str) -> Option<(usize, usize)> {
    let (start, end) = s.split_once('-')?;
    let start: usize = start.trim().parse().ok()?;
    let end: usize = end.trim().parse().ok()?;
    (start >= 1 && end >= start).then_some((start, end))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApproachArg {
    TwoStep,
    Vision,
    Text,
}

impl From<ApproachArg> for Approach {
    fn from(arg: ApproachArg) -> Self {
        match arg {
            ApproachArg::TwoStep => Approach::TwoStep,
            ApproachArg::Vision => Approach::OneStepVision,
            ApproachArg::Text => Approach::OneStepText,
        }
    }
}

impl std::str::FromStr for ApproachArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "two-step" | "two_step" | "twostep" => Ok(ApproachArg::TwoStep),
            "2" | "vision" | "one-step-vision" => Ok(ApproachArg::Vision),
            "3" | "text" | "one-step-text" => Ok(ApproachArg::Text),
            _ => Err(format!("Unknown approach: {}. Use 1/two-step, 2/vision, or 3/text", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubsetArg {
    All,
    #[default]
    Unprocessed,
    Sample,
    Range,
}

impl std::str::FromStr for SubsetArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SubsetArg::All),
            "unprocessed" | "new" => Ok(SubsetArg::Unprocessed),
            "sample" | "first" => Ok(SubsetArg::Sample),
            "range" => Ok(SubsetArg::Range),
            _ => Err(format!(
                "Unknown subset: {}. Use all, unprocessed, sample, or range",
                s
            )),
        }
    }
}
