//! 処理対象データセット
//!
//! 入力テーブルの列対応を解決し、注釈列（ai_*）の読み書きを行う。
//! 1行の注釈4列は apply_* で一度に書き換える。

use crate::error::{AltTextError, Result, RowProcessingFailure};
use alt_text_common::{AnalysisStatus, Approach, GenerationOutcome, GenerationRequest, Table};

/// 列名
pub mod columns {
    /// 画像URL列（先に見つかったものを使用）
    pub const IMAGE_URL: &[&str] = &["src_absolute_url", "image_url", "img_src"];
    /// ファイル/ページ識別列
    pub const IDENTITY: &[&str] = &["php_file", "post_url", "file", "post_id"];
    pub const CONTEXT: &[&str] = &["line_context", "context"];
    pub const CURRENT_ALT: &str = "current_alt";

    pub const DESCRIPTION: &str = "ai_image_description";
    pub const ALT_TEXT: &str = "ai_alt_text";
    pub const STATUS: &str = "ai_analysis_status";
    pub const APPROACH: &str = "ai_approach_used";
}

/// 失敗行のalt列に書く接頭辞
pub const ERROR_PREFIX: &str = "ERROR: ";

/// ステータス別件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub success: usize,
    pub decorative: usize,
    pub error: usize,
}

impl StatusCounts {
    /// 利用可能なalt（success + decorative）
    pub fn usable(&self) -> usize {
        self.success + self.decorative
    }
}

#[derive(Debug, Clone)]
struct ColumnMap {
    image_url: usize,
    identity: usize,
    context: Option<usize>,
    current_alt: Option<usize>,
    description: usize,
    alt_text: usize,
    status: usize,
    approach: usize,
}

/// 列対応を解決済みのテーブル
#[derive(Debug, Clone)]
pub struct Dataset {
    table: Table,
    cols: ColumnMap,
}

impl Dataset {
    /// 必須列を確認し、注釈列がなければ追加する
    pub fn new(mut table: Table) -> Result<Self> {
        let image_url = table.find_column(columns::IMAGE_URL);
        let identity = table.find_column(columns::IDENTITY);

        let (image_url, identity) = match (image_url, identity) {
            (Some(i), Some(f)) => (i, f),
            (image_url, identity) => {
                let mut missing = Vec::new();
                if image_url.is_none() {
                    missing.push(columns::IMAGE_URL.join(" / "));
                }
                if identity.is_none() {
                    missing.push(columns::IDENTITY.join(" / "));
                }
                return Err(AltTextError::MissingColumns(missing));
            }
        };

        let context = table.find_column(columns::CONTEXT);
        let current_alt = table.column_index(columns::CURRENT_ALT);
        let description = table.ensure_column(columns::DESCRIPTION);
        let alt_text = table.ensure_column(columns::ALT_TEXT);
        let status = table.ensure_column(columns::STATUS);
        let approach = table.ensure_column(columns::APPROACH);

        Ok(Self {
            table,
            cols: ColumnMap {
                image_url,
                identity,
                context,
                current_alt,
                description,
                alt_text,
                status,
                approach,
            },
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn status(&self, row: usize) -> AnalysisStatus {
        AnalysisStatus::parse(&self.table.text(row, self.cols.status))
    }

    pub fn is_processed(&self, row: usize) -> bool {
        self.status(row).is_processed()
    }

    pub fn alt_text(&self, row: usize) -> String {
        self.table.text(row, self.cols.alt_text).into_owned()
    }

    pub fn description(&self, row: usize) -> String {
        self.table.text(row, self.cols.description).into_owned()
    }

    pub fn image_url(&self, row: usize) -> String {
        self.table.text(row, self.cols.image_url).trim().to_string()
    }

    pub fn identity(&self, row: usize) -> String {
        self.table.text(row, self.cols.identity).trim().to_string()
    }

    fn optional_text(&self, row: usize, col: Option<usize>) -> String {
        col.map(|c| self.table.text(row, c).into_owned())
            .unwrap_or_default()
    }

    /// 行から生成リクエストを組み立てる
    pub fn request(&self, row: usize) -> std::result::Result<GenerationRequest, RowProcessingFailure> {
        let image_url = self.image_url(row);
        if image_url.is_empty() {
            return Err(RowProcessingFailure::MissingImageUrl(row + 1));
        }

        Ok(GenerationRequest {
            image_url,
            identity: self.identity(row),
            context: self.optional_text(row, self.cols.context),
            current_alt: self.optional_text(row, self.cols.current_alt),
        })
    }

    /// 成功結果を書き込む
    pub fn apply_outcome(&mut self, row: usize, approach: Approach, outcome: GenerationOutcome) {
        self.table.set(row, self.cols.description, outcome.description);
        self.table.set(row, self.cols.alt_text, outcome.alt_text);
        self.table.set(row, self.cols.status, outcome.status.as_str());
        self.table.set(row, self.cols.approach, approach.label());
    }

    /// 失敗を書き込む（alt列は "ERROR: <message>"）
    pub fn apply_failure(&mut self, row: usize, approach: Approach, failure: &RowProcessingFailure) {
        self.table.set(row, self.cols.description, failure.description());
        self.table.set(row, self.cols.alt_text, format!("{}{}", ERROR_PREFIX, failure));
        self.table.set(row, self.cols.status, AnalysisStatus::Error.as_str());
        self.table.set(row, self.cols.approach, approach.label());
    }

    /// テーブル全体のステータス別件数
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for row in 0..self.len() {
            match self.status(row) {
                AnalysisStatus::Success => counts.success += 1,
                AnalysisStatus::Decorative => counts.decorative += 1,
                AnalysisStatus::Error => counts.error += 1,
                AnalysisStatus::Unset => {}
            }
        }
        counts
    }

    /// 未処理の行番号
    pub fn unprocessed_rows(&self) -> Vec<usize> {
        (0..self.len()).filter(|&row| !self.is_processed(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alt_text_common::CellValue;

    fn table(headers: &[&str], rows: Vec<Vec<&str>>) -> Table {
        let mut table = Table::new("Sheet1", headers.iter().map(|s| s.to_string()).collect());
        for row in rows {
            table.push_row(row.into_iter().map(CellValue::from).collect());
        }
        table
    }

    #[test]
    fn test_missing_required_columns() {
        let err = Dataset::new(table(&["context"], vec![])).unwrap_err();
        match err {
            AltTextError::MissingColumns(missing) => {
                assert_eq!(missing.len(), 2);
                assert!(missing[0].contains("src_absolute_url"));
                assert!(missing[1].contains("php_file"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_column_aliases_and_annotation_columns() {
        let dataset = Dataset::new(table(
            &["post_url", "image_url", "context"],
            vec![vec!["https://example.com/about/", "a.jpg", "About us"]],
        ))
        .unwrap();

        let headers = &dataset.table().headers;
        assert_eq!(headers.len(), 7);
        assert!(headers.contains(&"ai_analysis_status".to_string()));

        let request = dataset.request(0).unwrap();
        assert_eq!(request.image_url, "a.jpg");
        assert_eq!(request.identity, "https://example.com/about/");
        assert_eq!(request.context, "About us");
        assert_eq!(request.current_alt, "");
    }

    #[test]
    fn test_prefers_src_absolute_url() {
        let dataset = Dataset::new(table(
            &["php_file", "image_url", "src_absolute_url"],
            vec![vec!["header.php", "rel.png", "https://example.com/abs.png"]],
        ))
        .unwrap();
        assert_eq!(dataset.image_url(0), "https://example.com/abs.png");
    }

    #[test]
    fn test_empty_image_url_is_row_failure() {
        let dataset = Dataset::new(table(&["php_file", "image_url"], vec![vec!["a.php", " "]])).unwrap();
        assert!(matches!(dataset.request(0), Err(RowProcessingFailure::MissingImageUrl(1))));
    }

    #[test]
    fn test_processed_by_typed_status() {
        let dataset = Dataset::new(table(
            &["php_file", "image_url", "ai_alt_text", "ai_analysis_status"],
            vec![
                vec!["a.php", "1.png", "Acme logo", "success"],
                vec!["a.php", "2.png", "", "decorative"],
                vec!["a.php", "3.png", "ERROR: timeout", "error"],
                vec!["a.php", "4.png", "", ""],
            ],
        ))
        .unwrap();

        assert!(dataset.is_processed(0));
        assert!(dataset.is_processed(1));
        assert!(!dataset.is_processed(2));
        assert!(!dataset.is_processed(3));
        assert_eq!(dataset.unprocessed_rows(), vec![2, 3]);
        assert_eq!(
            dataset.counts(),
            StatusCounts { success: 1, decorative: 1, error: 1 }
        );
    }

    #[test]
    fn test_apply_outcome_and_failure() {
        let mut dataset =
            Dataset::new(table(&["php_file", "image_url"], vec![vec!["a.php", "1.png"], vec!["b.php", "2.png"]]))
                .unwrap();

        dataset.apply_outcome(
            0,
            Approach::OneStepText,
            GenerationOutcome {
                description: "desc".into(),
                alt_text: "".into(),
                status: AnalysisStatus::Decorative,
            },
        );
        assert_eq!(dataset.status(0), AnalysisStatus::Decorative);
        assert_eq!(dataset.alt_text(0), "");

        let failure = RowProcessingFailure::Generation(crate::error::GenerationError::StepTwoFailure {
            message: "HTTP 500".into(),
            description: "A logo".into(),
        });
        dataset.apply_failure(1, Approach::TwoStep, &failure);
        assert_eq!(dataset.status(1), AnalysisStatus::Error);
        assert_eq!(dataset.alt_text(1), "ERROR: Step 2 error: HTTP 500");
        assert_eq!(dataset.description(1), "A logo");
        assert_eq!(dataset.image_url(1), "2.png");
    }
}
