//! Restricted markdown to HTML that is safe to inject into a page.
//!
//! Supported syntax: bold, italic, links, unordered and ordered lists,
//! paragraphs and line breaks, strikethrough and inline code. Anything else
//! is shown literally.
//!
//! Rendering is a fixed pipeline of string stages. Escaping runs first, so
//! every `<`, `>` and `&` in the output that did not come from the formatter
//! itself is an entity.
//!
//! ```
//! use comingsoon_core::parse_markdown;
//!
//! assert_eq!(parse_markdown("**Soon** <b>"), "<p><strong>Soon</strong> &lt;b&gt;</p>");
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

static BOLD_STARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("Invalid regex"));
static BOLD_UNDERSCORES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").expect("Invalid regex"));
static ITALIC_STAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("Invalid regex"));
static ITALIC_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(.+?)_").expect("Invalid regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").expect("Invalid regex"));
static LINK_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.+?)\]\(.+?\)").expect("Invalid regex"));
static STRIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~(.+?)~~").expect("Invalid regex"));
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.+?)`").expect("Invalid regex"));
static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:[-*]|\d+\.)[ \t]+").expect("Invalid regex"));

const LINK_CLASS: &str = "underline hover:opacity-80";
const CODE_CLASS: &str = "bg-gray-200 dark:bg-gray-700 px-1 py-0.5 rounded text-sm";
const PARAGRAPH_SPACING: &str = "mt-4";
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Render restricted markdown to HTML.
///
/// Empty input yields an empty string. Unbalanced markers are left as they
/// are. Rendering is single pass: feeding the output back in is not
/// meaningful.
#[must_use]
pub fn parse_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let html = escape_html(text);
    let html = apply_inline(&html);
    let html = apply_lists(&html);
    let html = apply_breaks(&html);
    let html = ensure_wrapped(html);
    apply_late_inline(&html)
}

/// Remove formatting markers, keeping link text, without escaping or
/// wrapping anything.
#[must_use]
pub fn strip_markdown(text: &str) -> String {
    let text = BOLD_STARS_RE.replace_all(text, "${1}");
    let text = BOLD_UNDERSCORES_RE.replace_all(&text, "${1}");
    let text = ITALIC_STAR_RE.replace_all(&text, "${1}");
    let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "${1}");
    let text = LINK_TEXT_RE.replace_all(&text, "${1}");
    let text = STRIKE_RE.replace_all(&text, "${1}");
    CODE_RE.replace_all(&text, "${1}").into_owned()
}

/// Normalize line endings and escape `&`, `<` and `>`.
fn escape_html(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Bold, italic and links, line by line. A leading list marker is kept out
/// of reach so `* item` is not read as the start of an emphasis.
fn apply_inline(html: &str) -> String {
    html.split('\n')
        .map(|line| {
            let (marker, body) = split_list_marker(line);
            let body = BOLD_STARS_RE.replace_all(body, "<strong>${1}</strong>");
            let body = BOLD_UNDERSCORES_RE.replace_all(&body, "<strong>${1}</strong>");
            let body = ITALIC_STAR_RE.replace_all(&body, "<em>${1}</em>");
            let body = ITALIC_UNDERSCORE_RE.replace_all(&body, "<em>${1}</em>");
            let body = LINK_RE.replace_all(&body, |caps: &Captures<'_>| {
                let text = caps.get(1).map_or("", |m| m.as_str());
                let href = link_href(caps.get(2).map_or("", |m| m.as_str()));
                format!(
                    r#"<a href="{href}" target="_blank" rel="noopener noreferrer" class="{LINK_CLASS}">{text}</a>"#
                )
            });
            format!("{marker}{body}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn a link target into an attribute value.
///
/// Emphasis applied to underscores or stars inside a URL is undone, quotes
/// and the late-stage markers are percent-encoded, and script-capable
/// schemes are replaced with `#`.
fn link_href(raw: &str) -> String {
    let href = raw
        .replace("<strong>", "**")
        .replace("</strong>", "**")
        .replace("<em>", "_")
        .replace("</em>", "_")
        .replace('"', "%22")
        .replace('~', "%7E")
        .replace('`', "%60");

    let scheme_probe: String = href
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|s| scheme_probe.starts_with(s)) {
        return "#".to_owned();
    }
    href
}

fn split_list_marker(line: &str) -> (&str, &str) {
    LIST_MARKER_RE
        .find(line)
        .map_or(("", line), |m| line.split_at(m.end()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    const fn open_tag(self) -> &'static str {
        match self {
            Self::Unordered => r#"<ul class="list-disc pl-6 space-y-1">"#,
            Self::Ordered => r#"<ol class="list-decimal pl-6 space-y-1">"#,
        }
    }

    const fn close_tag(self) -> &'static str {
        match self {
            Self::Unordered => "</ul>",
            Self::Ordered => "</ol>",
        }
    }
}

fn classify(line: &str) -> Option<(ListKind, &str)> {
    let (marker, body) = split_list_marker(line);
    if marker.is_empty() {
        return None;
    }
    let kind = if marker.trim_end().ends_with('.') {
        ListKind::Ordered
    } else {
        ListKind::Unordered
    };
    Some((kind, body))
}

/// Group consecutive list lines of the same kind into one list.
///
/// Each list is emitted on a single line with a blank line on either side,
/// so the paragraph stage sees it as a block of its own.
fn apply_lists(html: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut run: Option<(ListKind, Vec<&str>)> = None;

    for line in html.split('\n') {
        match classify(line) {
            Some((kind, body)) => {
                let continues = matches!(&run, Some((current, _)) if *current == kind);
                if !continues {
                    flush_list(run.take(), &mut out);
                    run = Some((kind, Vec::new()));
                }
                if let Some((_, items)) = run.as_mut() {
                    items.push(body);
                }
            }
            None => {
                flush_list(run.take(), &mut out);
                out.push(line.to_owned());
            }
        }
    }
    flush_list(run, &mut out);

    out.join("\n")
}

fn flush_list(run: Option<(ListKind, Vec<&str>)>, out: &mut Vec<String>) {
    let Some((kind, items)) = run else {
        return;
    };
    let mut list = String::from(kind.open_tag());
    for item in items {
        list.push_str("<li>");
        list.push_str(item);
        list.push_str("</li>");
    }
    list.push_str(kind.close_tag());

    out.push(String::new());
    out.push(list);
    out.push(String::new());
}

/// Blank lines separate blocks. Lists pass through; every other block
/// becomes a paragraph with single newlines turned into `<br />`.
fn apply_breaks(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let blocks = html
        .split("\n\n")
        .map(|block| block.trim_matches('\n'))
        .filter(|block| !block.is_empty());

    for (index, block) in blocks.enumerate() {
        if block.starts_with("<ul") || block.starts_with("<ol") {
            out.push_str(block);
            continue;
        }
        if index == 0 {
            out.push_str("<p>");
        } else {
            out.push_str(r#"<p class=""#);
            out.push_str(PARAGRAPH_SPACING);
            out.push_str(r#"">"#);
        }
        out.push_str(&block.replace('\n', "<br />"));
        out.push_str("</p>");
    }
    out
}

fn ensure_wrapped(html: String) -> String {
    if html.is_empty() || ["<p", "<ul", "<ol"].iter().any(|tag| html.starts_with(tag)) {
        return html;
    }
    format!("<p>{html}</p>")
}

/// Strikethrough and inline code, applied to the assembled HTML.
fn apply_late_inline(html: &str) -> String {
    let html = STRIKE_RE.replace_all(html, "<del>${1}</del>");
    CODE_RE
        .replace_all(&html, format!(r#"<code class="{CODE_CLASS}">${{1}}</code>"#).as_str())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    static FORMATTER_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"</?(?:p|br|strong|em|a|ul|ol|li|del|code)\b[^<>]*>").expect("Invalid regex")
    });
    static ENTITY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"&(?:amp|lt|gt);").expect("Invalid regex"));

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_markdown(""), "");
        assert_eq!(strip_markdown(""), "");
    }

    #[test]
    fn test_bold_and_code() {
        assert!(parse_markdown("**bold**").contains("<strong>bold</strong>"));
        assert!(parse_markdown("__bold__").contains("<strong>bold</strong>"));
        assert_eq!(
            parse_markdown("`code`"),
            format!(r#"<p><code class="{CODE_CLASS}">code</code></p>"#)
        );
    }

    #[test]
    fn test_italic_and_strike() {
        assert_eq!(
            parse_markdown("*a* _b_ ~~c~~"),
            "<p><em>a</em> <em>b</em> <del>c</del></p>"
        );
    }

    #[test]
    fn test_escapes_before_formatting() {
        assert_eq!(
            parse_markdown("<script>alert(1)</script> & **x**"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt; &amp; <strong>x</strong></p>"
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            parse_markdown("[Docs](https://example.com/a_b_c)"),
            format!(
                r#"<p><a href="https://example.com/a_b_c" target="_blank" rel="noopener noreferrer" class="{LINK_CLASS}">Docs</a></p>"#
            )
        );
    }

    #[test]
    fn test_link_href_cannot_break_out_or_run_script() {
        let html = parse_markdown(r#"[x](" onmouseover="alert(1))"#);
        assert!(html.contains(r#"href="%22 onmouseover=%22alert(1""#));

        let html = parse_markdown("[x](JavaScript:alert(1))");
        assert!(html.contains(r##"href="#""##));
        let html = parse_markdown("[x](java\tscript:alert(1))");
        assert!(html.contains(r##"href="#""##));
    }

    #[test]
    fn test_paragraphs_and_breaks() {
        assert_eq!(
            parse_markdown("one\ntwo\n\nthree\r\n\r\n\r\nfour"),
            r#"<p>one<br />two</p><p class="mt-4">three</p><p class="mt-4">four</p>"#
        );
    }

    #[test]
    fn test_lists_form_their_own_blocks() {
        let html = parse_markdown("Intro\n- a\n- **b**\n1. one\n2. two\nOutro");
        assert_eq!(
            html,
            concat!(
                "<p>Intro</p>",
                r#"<ul class="list-disc pl-6 space-y-1"><li>a</li><li><strong>b</strong></li></ul>"#,
                r#"<ol class="list-decimal pl-6 space-y-1"><li>one</li><li>two</li></ol>"#,
                r#"<p class="mt-4">Outro</p>"#,
            )
        );
    }

    #[test]
    fn test_list_kind_follows_each_run() {
        let html = parse_markdown("* star item\n\n3. third\n\n- dash");
        assert!(html.starts_with("<ul"));
        assert!(html.contains(r#"<ol class="list-decimal pl-6 space-y-1"><li>third</li></ol>"#));
        assert!(html.ends_with("<li>dash</li></ul>"));
    }

    #[test]
    fn test_list_marker_is_not_emphasis() {
        assert_eq!(
            parse_markdown("* a *b*"),
            r#"<ul class="list-disc pl-6 space-y-1"><li>a <em>b</em></li></ul>"#
        );
    }

    #[test]
    fn test_unmatched_markers_pass_through() {
        assert_eq!(parse_markdown("2 * 3 = 6"), "<p>2 * 3 = 6</p>");
        assert_eq!(parse_markdown("a ~~ b ` c"), "<p>a ~~ b ` c</p>");
        assert_eq!(parse_markdown("1.5 million"), "<p>1.5 million</p>");
    }

    #[test]
    fn test_strip_markdown() {
        assert_eq!(strip_markdown("**bold** and _em_"), "bold and em");
        assert_eq!(
            strip_markdown("[site](https://x.io) ~~old~~ `<b>`"),
            "site old <b>"
        );
    }

    proptest! {
        #[test]
        fn prop_no_raw_markup_from_input(input in r"[a-z <>&*_\[\]()`~\n.\-0-9]{0,80}") {
            let html = parse_markdown(&input);
            let text = FORMATTER_TAG_RE.replace_all(&html, "");
            prop_assert!(!text.contains('<'), "raw < in {html:?}");
            prop_assert!(!text.contains('>'), "raw > in {html:?}");
            let without_entities = ENTITY_RE.replace_all(&text, "");
            prop_assert!(!without_entities.contains('&'), "raw & in {html:?}");
        }
    }
}
