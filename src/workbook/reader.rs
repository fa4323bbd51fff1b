//! Excel読み込み（calamine）

use crate::error::{AltTextError, Result};
use alt_text_common::{CellValue, Table};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// ワークブックのシート名一覧
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(AltTextError::FileNotFound(path.display().to_string()));
    }

    let workbook = open_workbook_auto(path)
        .map_err(|e| AltTextError::WorkbookRead(format!("{}: {}", path.display(), e)))?;
    Ok(workbook.sheet_names().to_vec())
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // 日付はExcelのシリアル値のまま保持する
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::Error(_) => CellValue::Empty,
        other => CellValue::from(other.to_string()),
    }
}

/// シートを読み込み（1行目をヘッダーとする）
///
/// * `sheet` - 省略時は先頭シート
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    if !path.exists() {
        return Err(AltTextError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AltTextError::WorkbookRead(format!("{}: {}", path.display(), e)))?;

    let names = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| AltTextError::SheetNotFound(name.to_string()))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| AltTextError::WorkbookRead("シートがありません".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AltTextError::WorkbookRead(format!("{}: {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(|c| to_cell(c).as_text().trim().to_string()).collect())
        .unwrap_or_default();

    let mut table = Table::new(sheet_name, headers);
    for row in rows {
        // 空行も行番号を保つため残す
        table.push_row(row.iter().map(to_cell).collect());
    }

    tracing::debug!("{}行を読み込み（シート: {}）", table.len(), table.name);
    Ok(table)
}
