//! APIレスポンスパーサー
//!
//! alt生成APIの応答を正規化し、装飾画像トークンを判定する

use crate::error::{Error, Result};
use crate::prompts::{BANNED_WORDS, DECORATIVE_SENTINEL, MAX_ALT_LENGTH};
use crate::types::AnalysisStatus;

/// 前後から取り除く引用符類
const QUOTE_CHARS: &[char] = &['"', '\'', '`', '“', '”', '‘', '’'];

/// 正規化済みalt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAlt {
    pub alt_text: String,
    pub status: AnalysisStatus,
}

/// 前後の空白と引用符を除去
///
/// # Examples
/// ```
/// use alt_text_common::strip_quotes;
///
/// assert_eq!(strip_quotes("  \"Company logo\" "), "Company logo");
/// ```
pub fn strip_quotes(response: &str) -> &str {
    response.trim().trim_matches(QUOTE_CHARS).trim()
}

/// 装飾画像トークンか判定
///
/// 空白・引用符・強調記号・末尾のピリオドを除いたうえで、
/// 大文字小文字を区別せず完全一致した場合のみ装飾扱い。
/// 部分一致（"DECORATIVE border" 等）は装飾扱いしない。
pub fn is_decorative_sentinel(response: &str) -> bool {
    let token = strip_quotes(response)
        .trim_matches(|c: char| c == '*' || c == '_')
        .trim_end_matches('.')
        .trim();
    token.eq_ignore_ascii_case(DECORATIVE_SENTINEL)
}

/// alt生成の応答を正規化
///
/// * 装飾トークン → alt空文字 + Decorative
/// * それ以外 → 引用符除去したalt + Success
/// * 空応答 → Parseエラー
pub fn normalize_alt_response(response: &str) -> Result<NormalizedAlt> {
    if is_decorative_sentinel(response) {
        return Ok(NormalizedAlt {
            alt_text: String::new(),
            status: AnalysisStatus::Decorative,
        });
    }

    let alt_text = strip_quotes(response);
    if alt_text.is_empty() {
        return Err(Error::Parse("空のレスポンス".into()));
    }

    Ok(NormalizedAlt {
        alt_text: alt_text.to_string(),
        status: AnalysisStatus::Success,
    })
}

/// altの品質上の問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityIssue {
    /// 文字数超過（実際の文字数）
    TooLong(usize),
    /// 禁止語を含む
    BannedWord(&'static str),
}

impl std::fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityIssue::TooLong(len) => write!(f, "{}文字（上限{}）", len, MAX_ALT_LENGTH),
            QualityIssue::BannedWord(word) => write!(f, "禁止語 \"{}\" を含む", word),
        }
    }
}

/// altの要件チェック（文字数・禁止語）
pub fn check_alt_quality(alt_text: &str) -> Vec<QualityIssue> {
    let mut issues = Vec::new();

    let len = alt_text.chars().count();
    if len > MAX_ALT_LENGTH {
        issues.push(QualityIssue::TooLong(len));
    }

    let lower = alt_text.to_lowercase();
    for word in BANNED_WORDS {
        if lower.contains(word) {
            issues.push(QualityIssue::BannedWord(word));
        }
    }

    issues
}
