//! Excel生成（共通ライブラリ）
//!
//! Table をシートとして書き出し、ワークブックをバッファに生成する

use crate::error::{Error, Result};
use crate::table::{CellValue, Table};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};

/// Excelセルに書ける最大文字数
pub const MAX_CELL_CHARS: usize = 32_767;

/// シート名の最大文字数
const MAX_SHEET_NAME_CHARS: usize = 31;

/// 列幅の上限（文字数換算）
const MAX_COLUMN_WIDTH: f64 = 60.0;

/// シート名に使えない文字を置換し31文字に切り詰める
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            _ => c,
        })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// Excelが予約しているシート名
const RESERVED_SHEET_NAMES: &[&str] = &["history"];

/// 既出の名前と大文字小文字を無視して重複しないシート名を返す
///
/// 重複時は `_2`, `_3` ... を付け、31文字に収まるよう元の名前を詰める
pub fn unique_sheet_name(name: &str, used: &[String]) -> String {
    let base = sanitize_sheet_name(name);
    let taken = |candidate: &str| {
        let lower = candidate.to_lowercase();
        RESERVED_SHEET_NAMES.contains(&lower.as_str())
            || used.iter().any(|u| u.to_lowercase() == lower)
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while taken(&candidate) {
        let suffix = format!("_{}", n);
        let keep = MAX_SHEET_NAME_CHARS - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    candidate
}

/// セル上限を超える文字列を切り詰め（UTF-8境界を維持）
pub fn truncate_cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 列幅を見積もる（ヘッダーと先頭100行の最大文字数）
fn estimate_column_width(table: &Table, col: usize) -> f64 {
    let header_len = table.headers.get(col).map(|h| h.chars().count()).unwrap_or(0);
    let body_len = table
        .rows
        .iter()
        .take(100)
        .map(|r| r.get(col).map(|c| c.as_text().chars().count()).unwrap_or(0))
        .max()
        .unwrap_or(0);
    (header_len.max(body_len) as f64 + 2.0).min(MAX_COLUMN_WIDTH)
}

fn write_table(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    for (col, header) in table.headers.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, header, &header_format)
            .map_err(|e| Error::Excel(format!("ヘッダー書き込みエラー: {}", e)))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = row_idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            let written = match cell {
                CellValue::Empty => continue,
                CellValue::Text(s) => worksheet.write_string(row_num, col, truncate_cell_text(s)),
                CellValue::Number(n) => worksheet.write_number(row_num, col, *n),
                CellValue::Bool(b) => worksheet.write_boolean(row_num, col, *b),
            };
            written.map_err(|e| {
                Error::Excel(format!("セル書き込みエラー ({}行{}列): {}", row_num + 1, col + 1, e))
            })?;
        }
    }

    for col in 0..table.headers.len() {
        worksheet
            .set_column_width(col as u16, estimate_column_width(table, col))
            .map_err(|e| Error::Excel(format!("列幅設定エラー: {}", e)))?;
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| Error::Excel(format!("ウィンドウ枠固定エラー: {}", e)))?;

    Ok(())
}

/// 複数のテーブルをシートとしてワークブックに書き出し、バッファで返す
///
/// # Arguments
/// * `tables` - 書き出す順のテーブル（シート名は Table::name）
pub fn generate_workbook_buffer(tables: &[&Table]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut used: Vec<String> = Vec::with_capacity(tables.len());

    for table in tables {
        let name = unique_sheet_name(&table.name, &used);
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&name)
            .map_err(|e| Error::Excel(format!("シート名設定エラー: {}", e)))?;
        write_table(worksheet, table)?;
        used.push(name);
    }

    workbook
        .save_to_buffer()
        .map_err(|e| Error::Excel(format!("Excel保存エラー: {}", e)))
}
