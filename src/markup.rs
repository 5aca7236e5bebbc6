use once_cell::sync::Lazy;
use regex::Regex;

pub const WORD_MARKER: &str = "clicktrans-word";
pub const SENTENCE_MARKER: &str = "clicktrans-sentence";

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<mark class="([^"]*)">|</mark>|<[^>]*>"#).expect("tag pattern compiles")
});

/// A run of text between tags: one text node of the segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub marker: Option<String>,
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn unescape_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Escapes all three parts and wraps the middle one in a marker.
pub fn wrap_marked(before: &str, matched: &str, after: &str, marker: &str) -> String {
    format!(
        "{}<mark class=\"{}\">{}</mark>{}",
        escape_text(before),
        marker,
        escape_text(matched),
        escape_text(after)
    )
}

pub fn fragments(markup: &str) -> Vec<Fragment> {
    let mut out = Vec::new();
    let mut marker: Option<String> = None;
    let mut cursor = 0;

    let mut push = |raw: &str, marker: &Option<String>| {
        if !raw.is_empty() {
            out.push(Fragment { text: unescape_text(raw), marker: marker.clone() });
        }
    };

    for caps in TAG_RE.captures_iter(markup) {
        let Some(whole) = caps.get(0) else { continue };
        push(&markup[cursor..whole.start()], &marker);
        cursor = whole.end();
        if let Some(class) = caps.get(1) {
            marker = Some(class.as_str().to_string());
        } else if whole.as_str() == "</mark>" {
            marker = None;
        }
    }
    push(&markup[cursor..], &marker);
    out
}

/// The text a viewer sees: tags dropped, entities decoded.
pub fn text_content(markup: &str) -> String {
    fragments(markup).into_iter().map(|f| f.text).collect()
}
