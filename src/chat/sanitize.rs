//! Model-output sanitization down to the Telegram-compatible HTML subset.

use std::sync::LazyLock;

use regex::Regex;

/// Tags Telegram renders; everything else is stripped.
const ALLOWED_TAGS: &[&str] = &["b", "u", "a", "pre", "code", "i", "em", "blockquote", "s"];

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("Invalid regex"));

/// Clean model output: repair the Cyrillic `<б>` tag, turn structural tags
/// into plain text (`<br>` → newline, `<li>` → bullet), and strip every tag
/// outside the allowed subset while keeping its inner text.
pub fn clean_html(text: &str) -> String {
    let text = text
        .replace("<б>", "<b>")
        .replace("</б>", "</b>")
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n")
        .replace("<ul>", "")
        .replace("</ul>", "")
        .replace("<li>", "• ")
        .replace("</li>", "\n")
        .replace("<ol>", "")
        .replace("</ol>", "")
        .replace("<p>", "")
        .replace("</p>", "\n");

    TAG_RE
        .replace_all(&text, |caps: &regex::Captures| {
            if ALLOWED_TAGS.contains(&caps[1].to_lowercase().as_str()) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}
