//! Alt Text Common Library
//!
//! 抽出ステージと生成ステージで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod table;
pub mod prompts;
pub mod parser;
pub mod export;

pub use types::{AnalysisStatus, Approach, GenerationOutcome, GenerationRequest, ImageRecord};
pub use error::{Error, Result};
pub use table::{CellValue, Table};
pub use prompts::{
    build_text_prompt, build_two_step_prompt, build_vision_prompt,
    BANNED_WORDS, DECORATIVE_SENTINEL, DESCRIPTION_PROMPT, MAX_ALT_LENGTH,
};
pub use parser::{
    check_alt_quality, is_decorative_sentinel, normalize_alt_response, strip_quotes,
    NormalizedAlt, QualityIssue,
};
#[cfg(feature = "excel")]
pub use export::excel_core::generate_workbook_buffer;
