//! 対話モード
//!
//! 入力ファイル・シート・方式・処理対象・待機秒数を順に尋ね、
//! 見積もりを表示して確認を取ってから RunConfig を返す。

use crate::cli::{parse_delay, with_xlsx_extension, GenerateArgs};
use crate::config::Config;
use crate::error::{AltTextError, Result};
use crate::runner::{
    estimate_cost, select_rows, Dataset, RunConfig, SubsetPolicy, DEFAULT_SAMPLE_SIZE,
};
use crate::workbook::{read_table, sheet_names};
use alt_text_common::Approach;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

fn prompt_error(e: dialoguer::Error) -> AltTextError {
    AltTextError::CliExecution(e.to_string())
}

/// 範囲指定を検証し、不正なら先頭サンプルに切り替える
pub fn range_or_sample(start: usize, end: usize, total: usize) -> SubsetPolicy {
    if start >= 1 && end >= start && start <= total {
        SubsetPolicy::Range { start, end }
    } else {
        SubsetPolicy::Sample(DEFAULT_SAMPLE_SIZE)
    }
}

/// 対話的に実行設定を組み立てる。確認で中止したら None
pub fn build_run_config(args: &GenerateArgs, config: &Config) -> Result<Option<RunConfig>> {
    println!("🖼  wp-alt-text - altテキスト生成\n");

    let input = match &args.input {
        Some(path) => path.clone(),
        None => {
            let text: String = Input::new()
                .with_prompt("画像一覧Excelファイルのパス")
                .interact_text()
                .map_err(prompt_error)?;
            PathBuf::from(text.trim())
        }
    };
    let input = with_xlsx_extension(input);
    if !input.is_file() {
        return Err(AltTextError::FileNotFound(input.display().to_string()));
    }

    let sheet = select_sheet(&input, args.sheet.clone())?;
    let dataset = Dataset::new(read_table(&input, Some(&sheet))?)?;
    print_dataset_stats(&dataset);

    let approach = select_approach()?;
    let subset = select_subset(&dataset)?;

    let delay_secs: f64 = match args.delay {
        Some(d) => d,
        None => Input::new()
            .with_prompt("リクエスト間の待機秒数")
            .default(config.default_delay_seconds)
            .interact_text()
            .map_err(prompt_error)?,
    };

    let run = RunConfig {
        input,
        sheet: Some(sheet),
        approach,
        subset,
        delay: parse_delay(delay_secs)?,
        overwrite: args.overwrite,
        output: args.output.clone(),
    };

    let rows = select_rows(&dataset, &run.subset)?;
    let estimate = estimate_cost(approach, rows.len());
    println!("\n📋 実行内容");
    println!("  方式: {}", approach.label());
    println!("  対象: {}（{}件）", run.subset, rows.len());
    println!("  APIリクエスト数: 約{}回", estimate.requests);
    println!("  概算コスト: 約${:.2}", estimate.cost_usd);

    if args.yes {
        return Ok(Some(run));
    }

    Ok(confirm_run()?.then_some(run))
}

/// 実行前の yes/no 確認（既定は no）
pub fn confirm_run() -> Result<bool> {
    Confirm::new()
        .with_prompt("実行しますか？")
        .default(false)
        .interact()
        .map_err(prompt_error)
}

fn select_sheet(input: &std::path::Path, requested: Option<String>) -> Result<String> {
    let names = sheet_names(input)?;

    if let Some(name) = requested {
        return if names.contains(&name) {
            Ok(name)
        } else {
            Err(AltTextError::SheetNotFound(name))
        };
    }

    match names.len() {
        0 => Err(AltTextError::WorkbookRead("シートがありません".into())),
        1 => {
            println!("シート: {}", names[0]);
            Ok(names[0].clone())
        }
        _ => {
            let index = Select::new()
                .with_prompt("シートを選択")
                .items(&names)
                .default(0)
                .interact()
                .map_err(prompt_error)?;
            Ok(names[index].clone())
        }
    }
}

fn print_dataset_stats(dataset: &Dataset) {
    let counts = dataset.counts();
    println!("\n📊 データ概要");
    println!("  画像数: {}", dataset.len());
    println!("  処理済み: {}（success {} / decorative {}）", counts.usable(), counts.success, counts.decorative);
    println!("  エラー: {}", counts.error);
    println!("  未処理: {}\n", dataset.len() - counts.usable());
}

fn select_approach() -> Result<Approach> {
    let items: Vec<String> = Approach::ALL
        .iter()
        .map(|a| format!("{}. {} - {}", a.number(), a.label(), a.summary()))
        .collect();

    let index = Select::new()
        .with_prompt("生成方式を選択")
        .items(&items)
        .default(1)
        .interact()
        .map_err(prompt_error)?;
    Ok(Approach::ALL[index])
}

fn select_subset(dataset: &Dataset) -> Result<SubsetPolicy> {
    let items = [
        "全行を処理（既存のaltを上書き）".to_string(),
        "未処理の行のみ".to_string(),
        format!("先頭{}行でテスト", DEFAULT_SAMPLE_SIZE),
        "行範囲を指定".to_string(),
    ];

    let index = Select::new()
        .with_prompt("処理対象を選択")
        .items(&items)
        .default(1)
        .interact()
        .map_err(prompt_error)?;

    let policy = match index {
        0 => SubsetPolicy::All,
        1 => SubsetPolicy::Unprocessed,
        2 => SubsetPolicy::Sample(DEFAULT_SAMPLE_SIZE),
        _ => {
            let start: usize = Input::new()
                .with_prompt(format!("開始行（1〜{}）", dataset.len()))
                .interact_text()
                .map_err(prompt_error)?;
            let end: usize = Input::new()
                .with_prompt("終了行")
                .interact_text()
                .map_err(prompt_error)?;

            let policy = range_or_sample(start, end, dataset.len());
            if let SubsetPolicy::Sample(n) = policy {
                println!("⚠ 範囲が不正なため先頭{}行で実行します", n);
            }
            policy
        }
    };
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_or_sample() {
        assert_eq!(range_or_sample(2, 5, 10), SubsetPolicy::Range { start: 2, end: 5 });
        assert_eq!(range_or_sample(0, 5, 10), SubsetPolicy::Sample(3));
        assert_eq!(range_or_sample(6, 5, 10), SubsetPolicy::Sample(3));
        assert_eq!(range_or_sample(11, 12, 10), SubsetPolicy::Sample(3));
        // 終了行はデータ末尾を超えてもよい
        assert_eq!(range_or_sample(9, 50, 10), SubsetPolicy::Range { start: 9, end: 50 });
    }
}
