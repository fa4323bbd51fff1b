//! wp-alt-text
//!
//! WordPressエクスポートから画像一覧を抽出し、OpenAI互換APIで
//! altテキストを生成してExcelに書き戻す。

pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod runner;
pub mod session;
pub mod workbook;
