//! Inline formatter for free-text resume fields.
//!
//! Supported markers: `**bold**`, `*italic*`, `__underline__`. Markup
//! metacharacters are escaped before any marker is interpreted, so the only tags
//! in the output are the ones produced here. Unpaired markers stay literal and
//! no marker spans a line break.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold marker pattern"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic marker pattern"));
static UNDERLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__(.+?)__").expect("valid underline marker pattern"));

pub const LINE_BREAK: &str = "<br/>";

/// Escapes `&`, `<` and `>`. `&` goes first so existing entities are not left intact.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes `text` and converts the markers to markup. Line breaks are kept as-is.
pub fn format_inline(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let escaped = escape_markup(text);
    // Bold before italic: both use `*`.
    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>$1</em>");
    UNDERLINE.replace_all(&italic, "<u>$1</u>").into_owned()
}

/// [`format_inline`] plus explicit line breaks, for multi-line fields.
pub fn format_with_newlines(text: &str) -> String {
    format_inline(text).replace('\n', LINE_BREAK)
}
