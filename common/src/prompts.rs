//! プロンプト生成モジュール
//!
//! 3方式で共有されるプロンプト生成ロジック:
//! - DESCRIPTION_PROMPT: 2ステップ方式のStep1（画像説明）用
//! - build_two_step_prompt: 2ステップ方式のStep2（alt生成）用
//! - build_vision_prompt: 1ステップ（Vision）用
//! - build_text_prompt: 1ステップ（テキストのみ）用

use crate::types::GenerationRequest;

/// 装飾画像を示す応答トークン
pub const DECORATIVE_SENTINEL: &str = "DECORATIVE";

/// altテキストの最大文字数
pub const MAX_ALT_LENGTH: usize = 125;

/// altに含めてはいけない語
pub const BANNED_WORDS: &[&str] = &["image", "picture", "photo"];

/// Step1: 画像説明プロンプト
pub const DESCRIPTION_PROMPT: &str = "What's in this image? Describe what you see in detail. \
Focus on the main elements, colors, text, people, objects, and overall composition.";

/// 全方式共通の要件
fn requirements_block(basis: &str) -> String {
    format!(
        r#"REQUIREMENTS:
- Maximum {MAX_ALT_LENGTH} characters
- Be descriptive and helpful for accessibility
- Don't use words like "image", "picture", "photo"
- For logos: include company/organization name
- For icons: describe the function/meaning
- For people: include name and title if identifiable from context
- For decorative elements: consider if alt should be empty
- Be specific and contextual{basis}"#
    )
}

fn response_block() -> String {
    format!(
        "RESPONSE: Provide only the alt text, nothing else. \
If the image is purely decorative, respond with \"{DECORATIVE_SENTINEL}\"."
    )
}

fn header_block(request: &GenerationRequest) -> String {
    format!(
        r#"You are creating an alt text for an image found on a WordPress website.

IMAGE URL: {url}
SOURCE (template file or page): {identity}
CURRENT ALT TEXT: "{current_alt}" (empty if none)"#,
        url = request.image_url,
        identity = request.identity,
        current_alt = request.current_alt,
    )
}

fn context_block(context: &str) -> String {
    format!("CONTEXT around the image:\n```\n{}\n```", context)
}

/// Step2プロンプト生成（説明文 + コンテキスト → alt）
///
/// # Arguments
/// * `request` - 画像URL・識別子・現在のalt・コンテキスト
/// * `context` - 切り詰め済みコンテキスト
/// * `description` - Step1で得た画像説明
pub fn build_two_step_prompt(request: &GenerationRequest, context: &str, description: &str) -> String {
    format!(
        r#"{header}

DETAILED IMAGE DESCRIPTION:
{description}

{context}

INSTRUCTIONS:
- Use the detailed image description and context to create the perfect alt text
- Consider if it's a logo, icon, decorative element, or content image
- **If the image shows a person, try to identify them from the page context (text, names mentioned)**
- **For people: include their name and title/role if mentioned in the context**

{requirements}

EXAMPLE: If you see a person and context mentions "Dr. Jane Smith, Professor of Medicine"
→ Alt text: "Dr. Jane Smith, Professor of Medicine, in professional portrait"

{response}"#,
        header = header_block(request),
        context = context_block(context),
        requirements = requirements_block(""),
        response = response_block(),
    )
}

/// 1ステッププロンプト生成（Vision: 画像 + コンテキスト → alt）
pub fn build_vision_prompt(request: &GenerationRequest, context: &str) -> String {
    format!(
        r#"{header}

{context}

INSTRUCTIONS:
- Look at the image and understand what it shows
- Consider if it's a logo, icon, decorative element, or content image
- The context shows where on the site this image appears
- **If the image shows a person, try to identify them from the page context (text, names mentioned)**
- **For people: include their name and title/role if mentioned in the context**

{requirements}

EXAMPLE: If you see a person and context mentions "Dr. Jane Smith, Professor of Medicine"
→ Alt text: "Dr. Jane Smith, Professor of Medicine, in professional portrait"

{response}"#,
        header = header_block(request),
        context = context_block(context),
        requirements = requirements_block(""),
        response = response_block(),
    )
}

/// 1ステッププロンプト生成（テキストのみ: URL + コンテキスト → alt）
pub fn build_text_prompt(request: &GenerationRequest, context: &str) -> String {
    format!(
        r#"{header}

{context}

INSTRUCTIONS:
- Based on the image URL and context, create an appropriate alt text
- Consider if it's a logo, icon, decorative element, or content image
- Look at the filename and path for clues about the image content
- The context shows where on the site this image appears
- **If the context suggests the image shows a person, try to identify them from the text**
- **For people: include their name and title/role if mentioned in the context**

{requirements}

EXAMPLE: If filename is "dr-smith-portrait.jpg" and context mentions "Dr. Jane Smith, Professor"
→ Alt text: "Dr. Jane Smith, Professor of Medicine, in professional portrait"

{response}"#,
        header = header_block(request),
        context = context_block(context),
        requirements = requirements_block(" based on filename and context"),
        response = response_block(),
    )
}
