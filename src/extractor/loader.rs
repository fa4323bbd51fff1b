//! wp_postsエクスポート読み込み
//!
//! 対応形式:
//! - phpMyAdmin JSONエクスポート: [header, database, {"type": "table", "data": [...]}]
//! - 投稿オブジェクトの単純な配列

use crate::error::{AltTextError, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// 投稿1件（wp_postsの1行）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentItem {
    pub id: String,
    pub post_type: String,
    pub status: String,
    pub title: String,
    /// スラッグ（post_name）
    pub name: String,
    /// 本文HTML
    pub content: String,
}

/// 文字列・数値どちらでも文字列として取得
fn field_str(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

impl ContentItem {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            id: field_str(obj, "ID"),
            post_type: field_str(obj, "post_type"),
            status: field_str(obj, "post_status"),
            title: field_str(obj, "post_title"),
            name: field_str(obj, "post_name"),
            content: field_str(obj, "post_content"),
        }
    }
}

/// パース済みJSONから投稿一覧を取り出す
///
/// 想定外の構造は空リスト（エラーにしない）
pub fn items_from_json(data: &Value) -> Vec<ContentItem> {
    let Some(entries) = data.as_array() else {
        return Vec::new();
    };

    // phpMyAdmin形式: 最初のtableエントリのdata
    let table_rows = entries.iter().find_map(|entry| {
        let obj = entry.as_object()?;
        if obj.get("type").and_then(Value::as_str) == Some("table") {
            obj.get("data").and_then(Value::as_array)
        } else {
            None
        }
    });

    table_rows
        .unwrap_or(entries)
        .iter()
        .filter_map(Value::as_object)
        .map(ContentItem::from_object)
        .collect()
}

/// エクスポートファイルを読み込み
pub fn load_wp_posts(path: &Path) -> Result<Vec<ContentItem>> {
    if !path.exists() {
        return Err(AltTextError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&content)
        .map_err(|e| AltTextError::InvalidExport(format!("{}: {}", path.display(), e)))?;

    let items = items_from_json(&data);
    if items.is_empty() {
        tracing::warn!("投稿レコードが見つかりません: {}", path.display());
    }
    Ok(items)
}
