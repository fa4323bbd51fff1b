//! Excel出力
//!
//! 抽出結果と生成結果のワークブックを組み立てて保存する

use crate::error::{AltTextError, Result};
use crate::extractor::ExtractResult;
use crate::runner::{columns, RunSummary};
use alt_text_common::{generate_workbook_buffer, AnalysisStatus, CellValue, ImageRecord, Table};
use std::path::Path;

/// 抽出結果の列
pub const RECORD_COLUMNS: &[&str] = &[
    "post_id",
    "post_title",
    "post_type",
    "post_status",
    "post_url",
    "image_url",
    "current_alt",
    "has_alt",
    "full_img_tag",
    "context",
];

/// 画像レコードをテーブルに変換
pub fn records_to_table(name: &str, images: &[ImageRecord]) -> Table {
    let headers = RECORD_COLUMNS.iter().map(|s| s.to_string()).collect();
    let mut table = Table::new(name, headers);

    for img in images {
        table.push_row(vec![
            CellValue::from(img.post_id.as_str()),
            CellValue::from(img.post_title.as_str()),
            CellValue::from(img.post_type.as_str()),
            CellValue::from(img.post_status.as_str()),
            CellValue::from(img.post_url.as_str()),
            CellValue::from(img.image_url.as_str()),
            CellValue::from(img.current_alt.as_str()),
            CellValue::Bool(img.has_alt),
            CellValue::from(img.full_img_tag.as_str()),
            CellValue::from(img.context.as_str()),
        ]);
    }

    table
}

/// Metric / Value の2列テーブル
pub fn statistics_table(metrics: Vec<(&str, CellValue)>) -> Table {
    let mut table = Table::new("Statistics", vec!["Metric".into(), "Value".into()]);
    for (metric, value) in metrics {
        table.push_row(vec![CellValue::from(metric), value]);
    }
    table
}

fn save_buffer(path: &Path, buffer: Vec<u8>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, buffer)?;
    Ok(())
}

/// 抽出結果を保存（All_Images / Needs_Alt_Text / Statistics）
pub fn write_extraction_workbook(result: &ExtractResult, path: &Path) -> Result<()> {
    let all = records_to_table("All_Images", &result.images);

    let has_alt_col = all.column_index("has_alt").unwrap_or(0);
    let needs_alt = all.filter_rows("Needs_Alt_Text", |row| {
        !matches!(row.get(has_alt_col), Some(CellValue::Bool(true)))
    });

    let total = all.len();
    let without = needs_alt.len();
    let percent = if total > 0 {
        format!("{:.1}%", without as f64 / total as f64 * 100.0)
    } else {
        "0%".to_string()
    };

    let stats = statistics_table(vec![
        ("Total images", CellValue::Number(total as f64)),
        ("Without alt", CellValue::Number(without as f64)),
        ("With alt", CellValue::Number((total - without) as f64)),
        ("% without alt", CellValue::Text(percent)),
    ]);

    let buffer = generate_workbook_buffer(&[&all, &needs_alt, &stats])
        .map_err(|e| AltTextError::WorkbookWrite(e.to_string()))?;
    save_buffer(path, buffer)
}

/// 生成結果を保存
///
/// 処理したシート（元のシート名）、ステータス別シート（空なら省略）、Statistics
pub fn write_generation_workbook(table: &Table, summary: &RunSummary, path: &Path) -> Result<()> {
    let status_col = table.column_index(columns::STATUS);

    let by_status = |name: &str, status: AnalysisStatus| {
        table.filter_rows(name, |row| {
            status_col
                .and_then(|c| row.get(c))
                .map(|cell| AnalysisStatus::parse(&cell.as_text()) == status)
                .unwrap_or(false)
        })
    };

    let success = by_status("Success", AnalysisStatus::Success);
    let decorative = by_status("Decorative", AnalysisStatus::Decorative);
    let errors = by_status("Errors", AnalysisStatus::Error);
    let stats = statistics_table(summary.metrics());

    let mut sheets: Vec<&Table> = vec![table];
    sheets.extend([&success, &decorative, &errors].into_iter().filter(|t| !t.is_empty()));
    sheets.push(&stats);

    let buffer = generate_workbook_buffer(&sheets)
        .map_err(|e| AltTextError::WorkbookWrite(e.to_string()))?;
    save_buffer(path, buffer)
}
