//! 画像タグ抽出モジュール
//!
//! 公開済み投稿の本文から <img> タグを正規表現で抽出し、
//! 1画像1レコードの ImageRecord を生成する。

mod loader;

pub use loader::{items_from_json, load_wp_posts, ContentItem};

use alt_text_common::ImageRecord;
use regex::Regex;
use std::collections::BTreeMap;
use url::Url;

/// 公開ステータス
pub const PUBLISHED_STATUS: &str = "publish";

/// デフォルトの除外投稿タイプ
pub const DEFAULT_EXCLUDED_TYPES: &[&str] = &[
    "revision",
    "attachment",
    "acf-field",
    "acf-field-group",
    "oembed_cache",
];

lazy_static::lazy_static! {
    static ref IMG_TAG_RE: Regex = Regex::new(r"(?i)<img[^>]*>").unwrap();
    static ref SRC_RE: Regex = Regex::new(r#"(?i)src=["']([^"']+)["']"#).unwrap();
    static ref ALT_RE: Regex = Regex::new(r#"(?i)alt=["']([^"']*)["']"#).unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// 抽出オプション
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// サイトURL（例: https://example.com）
    pub base_url: String,
    pub excluded_types: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            excluded_types: DEFAULT_EXCLUDED_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// デバッグ用カウンタ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub total_posts: usize,
    pub filtered_by_status: usize,
    pub filtered_by_type: usize,
    pub empty_content: usize,
    pub processed: usize,
    pub with_images: usize,
}

/// 抽出結果
#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    pub images: Vec<ImageRecord>,
    pub stats: ExtractStats,
}

impl ExtractResult {
    /// alt未設定の件数
    pub fn without_alt(&self) -> usize {
        self.images.iter().filter(|img| !img.has_alt).count()
    }
}

/// 投稿のパーマリンクを組み立てる
pub fn construct_post_url(item: &ContentItem, base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');

    if item.name.is_empty() {
        return format!("{}/?p={}", base, item.id);
    }

    match item.post_type.as_str() {
        "page" | "post" => format!("{}/{}/", base, item.name),
        other => format!("{}/{}/{}/", base, other, item.name),
    }
}

/// 相対srcをサイトURL基準で絶対URLにする（基準なし・解決不可ならそのまま）
pub fn resolve_image_url(src: &str, base_url: &str) -> String {
    if base_url.is_empty() || Url::parse(src).is_ok() {
        return src.to_string();
    }

    let base = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&base)
        .and_then(|b| b.join(src))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

/// 本文からタグを除去し空白を1つにまとめる
pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    SPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// 全投稿から画像を抽出
pub fn find_all_images(items: &[ContentItem], options: &ExtractOptions) -> ExtractResult {
    let mut result = ExtractResult::default();

    for item in items {
        result.stats.total_posts += 1;

        if item.status != PUBLISHED_STATUS {
            result.stats.filtered_by_status += 1;
            continue;
        }

        if options.excluded_types.iter().any(|t| *t == item.post_type) {
            result.stats.filtered_by_type += 1;
            continue;
        }

        if item.content.is_empty() {
            result.stats.empty_content += 1;
            continue;
        }

        result.stats.processed += 1;

        let tags: Vec<&str> = IMG_TAG_RE.find_iter(&item.content).map(|m| m.as_str()).collect();
        if tags.is_empty() {
            continue;
        }

        result.stats.with_images += 1;
        tracing::info!(
            "Post {} ({}): {}枚 - '{}'",
            item.id,
            item.post_type,
            tags.len(),
            item.title.chars().take(50).collect::<String>()
        );

        // コンテキストは本文全体（同じ投稿内で共通）
        let context = strip_tags(&item.content);
        let post_url = construct_post_url(item, &options.base_url);

        for tag in tags {
            let Some(src) = SRC_RE.captures(tag).and_then(|c| c.get(1)) else {
                continue;
            };
            let current_alt = ALT_RE
                .captures(tag)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            result.images.push(ImageRecord {
                post_id: item.id.clone(),
                post_title: item.title.clone(),
                post_type: item.post_type.clone(),
                post_status: item.status.clone(),
                post_url: post_url.clone(),
                image_url: resolve_image_url(src.as_str(), &options.base_url),
                has_alt: !current_alt.trim().is_empty(),
                current_alt,
                full_img_tag: tag.to_string(),
                context: context.clone(),
            });
        }
    }

    result
}

/// 投稿タイプ・ステータスの件数（確認用）
pub fn count_by_type_and_status(
    items: &[ContentItem],
) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
    let mut types = BTreeMap::new();
    let mut statuses = BTreeMap::new();

    for item in items {
        let post_type = if item.post_type.is_empty() { "unknown" } else { &item.post_type };
        let status = if item.status.is_empty() { "unknown" } else { &item.status };
        *types.entry(post_type.to_string()).or_insert(0) += 1;
        *statuses.entry(status.to_string()).or_insert(0) += 1;
    }

    (types, statuses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, status: &str, post_type: &str, content: &str) -> ContentItem {
        ContentItem {
            id: id.into(),
            post_type: post_type.into(),
            status: status.into(),
            title: format!("Post {}", id),
            name: format!("post-{}", id),
            content: content.into(),
        }
    }

    #[test]
    fn test_only_published_items() {
        let items = vec![
            item("1", "publish", "post", r#"<img src="a.jpg">"#),
            item("2", "draft", "post", r#"<img src="b.jpg">"#),
        ];
        let result = find_all_images(&items, &ExtractOptions::default());

        assert_eq!(result.images.len(), 1);
        assert_eq!(result.images[0].image_url, "a.jpg");
        assert_eq!(result.images[0].current_alt, "");
        assert!(!result.images[0].has_alt);
        assert_eq!(result.stats.filtered_by_status, 1);
    }

    #[test]
    fn test_excluded_types_and_empty_content() {
        let items = vec![
            item("1", "publish", "revision", r#"<img src="a.jpg">"#),
            item("2", "publish", "page", ""),
            item("3", "publish", "page", "<p>no images</p>"),
        ];
        let result = find_all_images(&items, &ExtractOptions::default());

        assert!(result.images.is_empty());
        assert_eq!(result.stats.filtered_by_type, 1);
        assert_eq!(result.stats.empty_content, 1);
        assert_eq!(result.stats.processed, 1);
        assert_eq!(result.stats.with_images, 0);
    }

    #[test]
    fn test_src_and_alt_extraction() {
        let content = r#"<p>Meet <b>Dr. Smith</b></p>
<IMG class="x" SRC='/uploads/smith.jpg' ALT="Dr. Smith">
<img alt="" src="logo.png" />
<img data-lazy="1">"#;
        let items = vec![item("5", "publish", "page", content)];
        let result = find_all_images(&items, &ExtractOptions::default());

        assert_eq!(result.images.len(), 2);
        assert_eq!(result.images[0].image_url, "/uploads/smith.jpg");
        assert_eq!(result.images[0].current_alt, "Dr. Smith");
        assert!(result.images[0].has_alt);
        assert_eq!(result.images[1].image_url, "logo.png");
        assert!(!result.images[1].has_alt);
        assert_eq!(result.images[0].context, "Meet Dr. Smith");
        assert_eq!(result.stats.with_images, 1);
    }

    #[test]
    fn test_emission_order() {
        let items = vec![
            item("1", "publish", "post", r#"<img src="1.jpg"><img src="2.jpg">"#),
            item("2", "publish", "post", r#"<img src="3.jpg">"#),
        ];
        let result = find_all_images(&items, &ExtractOptions::default());
        let urls: Vec<&str> = result.images.iter().map(|i| i.image_url.as_str()).collect();
        assert_eq!(urls, vec!["1.jpg", "2.jpg", "3.jpg"]);
    }

    #[test]
    fn test_construct_post_url() {
        let base = "https://example.com/";
        assert_eq!(
            construct_post_url(&item("3", "publish", "page", ""), base),
            "https://example.com/post-3/"
        );
        assert_eq!(
            construct_post_url(&item("4", "publish", "product", ""), base),
            "https://example.com/product/post-4/"
        );

        let mut no_slug = item("9", "publish", "post", "");
        no_slug.name.clear();
        assert_eq!(construct_post_url(&no_slug, base), "https://example.com/?p=9");
    }

    #[test]
    fn test_resolve_image_url() {
        let base = "https://example.com";
        assert_eq!(
            resolve_image_url("/wp-content/a.jpg", base),
            "https://example.com/wp-content/a.jpg"
        );
        assert_eq!(
            resolve_image_url("https://cdn.example.net/b.jpg", base),
            "https://cdn.example.net/b.jpg"
        );
        assert_eq!(resolve_image_url("/c.jpg", ""), "/c.jpg");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello\n\n <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn test_count_by_type_and_status() {
        let items = vec![
            item("1", "publish", "post", ""),
            item("2", "draft", "post", ""),
            item("3", "publish", "", ""),
        ];
        let (types, statuses) = count_by_type_and_status(&items);
        assert_eq!(types.get("post"), Some(&2));
        assert_eq!(types.get("unknown"), Some(&1));
        assert_eq!(statuses.get("publish"), Some(&2));
    }
}
