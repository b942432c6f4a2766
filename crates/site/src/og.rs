//! Open Graph preview image rendered as SVG.

use std::fmt::Write as _;

use serde::Deserialize;

use crate::seo::escape_attr;

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

const DEFAULT_TITLE: &str = "Coming Soon";
const DEFAULT_BACKGROUND: &str = "#111827";
const MAX_TITLE_CHARS: usize = 120;

/// Query parameters of `/og-image`. Empty values count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OgImageParams {
    pub title: Option<String>,
    pub bg: Option<String>,
    pub logo: Option<String>,
}

impl OgImageParams {
    fn title(&self) -> String {
        let title = non_empty(self.title.as_deref()).unwrap_or(DEFAULT_TITLE);
        title.chars().take(MAX_TITLE_CHARS).collect()
    }

    fn background(&self) -> &str {
        non_empty(self.bg.as_deref()).unwrap_or(DEFAULT_BACKGROUND)
    }

    fn logo(&self) -> Option<&str> {
        non_empty(self.logo.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Render the preview card: a gradient background, an optional logo in the
/// top-left corner and the title below it.
#[must_use]
pub fn render(params: &OgImageParams) -> String {
    let bg = escape_attr(params.background());
    let title = escape_attr(&params.title());
    let logo = params.logo().map(escape_attr);
    let (text_y, text_height) = if logo.is_some() {
        (196, HEIGHT - 268)
    } else {
        (96, HEIGHT - 168)
    };

    let mut svg = String::with_capacity(2048);
    let _ = write!(
        svg,
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">
  <defs>
    <linearGradient id="g" x1="0" x2="1" y1="0" y2="1">
      <stop offset="0%" stop-color="{bg}" stop-opacity="1" />
      <stop offset="100%" stop-color="{bg}" stop-opacity="0.85" />
    </linearGradient>
    <filter id="s" x="-20%" y="-20%" width="140%" height="140%">
      <feDropShadow dx="0" dy="8" stdDeviation="12" flood-color="#000" flood-opacity="0.35"/>
    </filter>
  </defs>
  <rect width="100%" height="100%" fill="url(#g)"/>
"##
    );
    if let Some(logo) = logo {
        let _ = writeln!(
            svg,
            r#"  <image href="{logo}" x="72" y="72" height="96" width="96" preserveAspectRatio="xMidYMid meet"/>"#
        );
    }
    let _ = write!(
        svg,
        r##"  <foreignObject x="72" y="{text_y}" width="1056" height="{text_height}">
    <div xmlns="http://www.w3.org/1999/xhtml" style="font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial; color:#ffffff; font-weight:800; font-size:72px; line-height:1.1;">{title}</div>
  </foreignObject>
  <rect x="72" y="{bar_y}" width="360" height="8" rx="4" ry="4" fill="#ffffff" opacity="0.6" filter="url(#s)"/>
</svg>
"##,
        bar_y = HEIGHT - 96,
    );

    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(title: Option<&str>, bg: Option<&str>, logo: Option<&str>) -> OgImageParams {
        OgImageParams {
            title: title.map(str::to_owned),
            bg: bg.map(str::to_owned),
            logo: logo.map(str::to_owned),
        }
    }

    #[test]
    fn test_defaults() {
        let svg = render(&OgImageParams::default());
        assert!(svg.contains(">Coming Soon</div>"));
        assert!(svg.contains(r##"stop-color="#111827""##));
        assert!(!svg.contains("<image"));
        assert!(svg.contains(r#"y="96" width="1056" height="462""#));

        let svg = render(&params(Some(""), Some(""), Some("")));
        assert!(svg.contains(">Coming Soon</div>"));
    }

    #[test]
    fn test_logo_shifts_title() {
        let svg = render(&params(None, None, Some("https://cdn.example.com/logo.png")));
        assert!(svg.contains(r#"<image href="https://cdn.example.com/logo.png""#));
        assert!(svg.contains(r#"y="196" width="1056" height="362""#));
    }

    #[test]
    fn test_title_is_truncated() {
        let long = "é".repeat(200);
        let svg = render(&params(Some(&long), None, None));
        assert!(svg.contains(&format!(">{}</div>", "é".repeat(120))));
        assert!(!svg.contains(&"é".repeat(121)));
    }

    #[test]
    fn test_every_value_is_escaped() {
        let svg = render(&params(
            Some("<script>alert('x')</script>"),
            Some(r#""/><script>"#),
            Some(r#"x" onload="alert(1)"#),
        ));
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
        assert!(svg.contains(r#"stop-color="&quot;/&gt;&lt;script&gt;""#));
        assert!(svg.contains(r#"href="x&quot; onload=&quot;alert(1)""#));
    }
}
