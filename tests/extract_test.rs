//! 抽出（エクスポートJSON → 画像一覧Excel）の統合テスト

use serde_json::json;
use tempfile::tempdir;
use wp_alt_text::extractor::{find_all_images, load_wp_posts, ExtractOptions};
use wp_alt_text::runner::Dataset;
use wp_alt_text::workbook::{read_table, sheet_names, write_extraction_workbook};

fn phpmyadmin_export() -> serde_json::Value {
    json!([
        {"type": "header", "version": "5.2.1", "comment": "Export to JSON plugin for PHPMyAdmin"},
        {"type": "database", "name": "wordpress"},
        {
            "type": "table",
            "name": "wp_posts",
            "database": "wordpress",
            "data": [
                {
                    "ID": "10",
                    "post_type": "page",
                    "post_status": "publish",
                    "post_title": "About",
                    "post_name": "about",
                    "post_content": "<p>Our team</p><img src=\"a.jpg\">"
                },
                {
                    "ID": 11,
                    "post_type": "post",
                    "post_status": "draft",
                    "post_title": "Draft",
                    "post_name": "draft",
                    "post_content": "<img src=\"b.jpg\">"
                },
                {
                    "ID": "12",
                    "post_type": "revision",
                    "post_status": "publish",
                    "post_title": "Rev",
                    "post_name": "10-revision-v1",
                    "post_content": "<img src=\"c.jpg\">"
                }
            ]
        }
    ])
}

#[test]
fn test_only_visible_images_are_extracted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("wp_posts.json");
    std::fs::write(&input, phpmyadmin_export().to_string()).unwrap();

    let items = load_wp_posts(&input).expect("読み込み失敗");
    assert_eq!(items.len(), 3);

    let result = find_all_images(&items, &ExtractOptions::default());
    assert_eq!(result.images.len(), 1);

    let image = &result.images[0];
    assert_eq!(image.image_url, "a.jpg");
    assert_eq!(image.current_alt, "");
    assert!(!image.has_alt);
    assert_eq!(image.post_id, "10");
    assert_eq!(image.context, "Our team");

    assert_eq!(result.stats.total_posts, 3);
    assert_eq!(result.stats.filtered_by_status, 1);
    assert_eq!(result.stats.filtered_by_type, 1);
}

#[test]
fn test_plain_array_with_base_url() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("posts.json");
    let posts = json!([
        {
            "ID": 3,
            "post_type": "post",
            "post_status": "publish",
            "post_title": "Hello",
            "post_name": "hello-world",
            "post_content": "<img src=\"/wp-content/uploads/logo.png\" alt=\"Acme logo\">"
        }
    ]);
    std::fs::write(&input, posts.to_string()).unwrap();

    let items = load_wp_posts(&input).unwrap();
    let options = ExtractOptions {
        base_url: "https://example.com".into(),
        ..Default::default()
    };
    let result = find_all_images(&items, &options);

    assert_eq!(result.images.len(), 1);
    assert_eq!(
        result.images[0].image_url,
        "https://example.com/wp-content/uploads/logo.png"
    );
    assert_eq!(result.images[0].post_url, "https://example.com/hello-world/");
    assert!(result.images[0].has_alt);
}

#[test]
fn test_unexpected_shape_yields_no_items() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("weird.json");
    std::fs::write(&input, r#"{"posts": "none"}"#).unwrap();

    let items = load_wp_posts(&input).expect("構造不一致はエラーにしない");
    assert!(items.is_empty());
}

#[test]
fn test_invalid_json_is_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("broken.json");
    std::fs::write(&input, "[{").unwrap();

    assert!(load_wp_posts(&input).is_err());
    assert!(load_wp_posts(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_extraction_workbook_feeds_generation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("wp_posts.json");
    let posts = json!([
        {"ID": 1, "post_type": "page", "post_status": "publish", "post_title": "Home",
         "post_name": "home", "post_content": "<img src=\"hero.jpg\" alt=\"Hero\"><img src=\"team.jpg\">"}
    ]);
    std::fs::write(&input, posts.to_string()).unwrap();

    let items = load_wp_posts(&input).unwrap();
    let result = find_all_images(&items, &ExtractOptions::default());
    let output = dir.path().join("images.xlsx");
    write_extraction_workbook(&result, &output).expect("Excel生成に失敗");

    assert_eq!(
        sheet_names(&output).unwrap(),
        vec!["All_Images", "Needs_Alt_Text", "Statistics"]
    );

    let all = read_table(&output, None).unwrap();
    assert_eq!(all.name, "All_Images");
    assert_eq!(all.len(), 2);

    let needs = read_table(&output, Some("Needs_Alt_Text")).unwrap();
    assert_eq!(needs.len(), 1);
    let url_col = needs.column_index("image_url").unwrap();
    assert_eq!(needs.text(0, url_col), "team.jpg");

    // 抽出結果はそのまま生成の入力になる
    let dataset = Dataset::new(all).expect("必須列が揃っている");
    assert_eq!(dataset.request(1).unwrap().image_url, "team.jpg");
}
