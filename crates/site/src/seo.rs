//! Crawler detection and SEO tag injection.
//!
//! Crawlers rarely run scripts, so the title and the Open Graph / Twitter
//! card tags they need are written into the served HTML. A per-path override
//! can replace any of the site-wide SEO fields.

use std::fmt::Write as _;
use std::sync::LazyLock;

use comingsoon_core::content::SeoSettings;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static CRAWLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(bot|crawler|spider|crawling|facebookexternalhit|facebot|twitterbot|linkedinbot|slackbot|embedly|quora link preview|whatsapp|discordbot|pinterest|skypeuripreview|yahoo! slurp)",
    )
    .expect("Invalid regex")
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(<title[^>]*>).*?(</title>)").expect("Invalid regex"));

static META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)[ \t]*<meta\b[^>]*?\b(?:name|property)\s*=\s*"([^"]*)"[^>]*>[ \t]*\n?"#)
        .expect("Invalid regex")
});

static HEAD_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head>").expect("Invalid regex"));

/// Whether a user agent belongs to a search or link-preview crawler.
#[must_use]
pub fn is_crawler(user_agent: &str) -> bool {
    CRAWLER_RE.is_match(user_agent)
}

/// SEO fields stored for one path. Missing or empty fields fall back to the
/// site-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
}

impl SeoOverride {
    /// Read an override from loosely shaped JSON.
    ///
    /// Only non-blank string fields are kept; anything else is dropped.
    /// Returns `None` when the value is not an object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        Some(Self {
            title: field("title"),
            description: field("description"),
            keywords: field("keywords"),
            author: field("author"),
            og_image: field("ogImage"),
        })
    }

    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.keywords.is_none()
            && self.author.is_none()
            && self.og_image.is_none()
    }
}

/// Combine site-wide settings with a path override, field by field.
#[must_use]
pub fn resolve(global: &SeoSettings, route: Option<&SeoOverride>) -> SeoSettings {
    let Some(route) = route else {
        return global.clone();
    };
    let pick = |over: &Option<String>, base: &String| {
        over.as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| base.clone(), str::to_owned)
    };

    SeoSettings {
        title: pick(&route.title, &global.title),
        description: pick(&route.description, &global.description),
        keywords: pick(&route.keywords, &global.keywords),
        author: pick(&route.author, &global.author),
        og_image: pick(&route.og_image, &global.og_image),
    }
}

/// Normalize a request path into the key route overrides are stored under.
///
/// One leading and one trailing slash are removed, the result is
/// lowercased, and the root path becomes `index`.
#[must_use]
pub fn path_key(path: &str) -> String {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        "index".to_owned()
    } else {
        trimmed.to_lowercase()
    }
}

/// Escape text for use inside an HTML attribute or element.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Meta tag attribute, key and value for each tag written for crawlers.
fn meta_entries(seo: &SeoSettings) -> Vec<(&'static str, &'static str, &str)> {
    let mut entries = Vec::new();
    if !seo.description.is_empty() {
        entries.push(("name", "description", seo.description.as_str()));
        entries.push(("property", "og:description", seo.description.as_str()));
        entries.push(("name", "twitter:description", seo.description.as_str()));
    }
    if !seo.keywords.is_empty() {
        entries.push(("name", "keywords", seo.keywords.as_str()));
    }
    if !seo.author.is_empty() {
        entries.push(("name", "author", seo.author.as_str()));
    }
    if !seo.title.is_empty() {
        entries.push(("property", "og:title", seo.title.as_str()));
        entries.push(("name", "twitter:title", seo.title.as_str()));
    }
    if !seo.og_image.is_empty() {
        entries.push(("property", "og:image", seo.og_image.as_str()));
        entries.push(("name", "twitter:image", seo.og_image.as_str()));
    }
    entries.push(("property", "og:type", "website"));
    entries.push(("name", "twitter:card", "summary_large_image"));
    entries
}

/// The meta tags written for crawlers.
#[must_use]
pub fn meta_tags(seo: &SeoSettings) -> String {
    let mut tags = String::new();
    for (attr, key, value) in meta_entries(seo) {
        let _ = writeln!(
            tags,
            r#"<meta {attr}="{key}" content="{}" />"#,
            escape_attr(value)
        );
    }
    tags
}

/// Rewrite an HTML document's `<title>` and add SEO meta tags before
/// `</head>`.
///
/// Meta tags already in the head under a key that is about to be written are
/// removed first, so each key appears once. A document without a `<title>`
/// keeps its head as is apart from the meta tags; a document without
/// `</head>` only gets its title replaced.
#[must_use]
pub fn inject(html: &str, seo: &SeoSettings) -> String {
    let html = if seo.title.is_empty() {
        html.to_owned()
    } else {
        let title = escape_attr(&seo.title);
        TITLE_RE
            .replacen(html, 1, |caps: &regex::Captures<'_>| {
                let open = caps.get(1).map_or("<title>", |m| m.as_str());
                let close = caps.get(2).map_or("</title>", |m| m.as_str());
                format!("{open}{title}{close}")
            })
            .into_owned()
    };

    let Some(head_close) = HEAD_CLOSE_RE.find(&html) else {
        return html;
    };

    let written: Vec<&str> = meta_entries(seo).into_iter().map(|(_, key, _)| key).collect();
    let (head, rest) = html.split_at(head_close.start());
    let head = META_RE.replace_all(head, |caps: &regex::Captures<'_>| {
        let key = caps.get(1).map_or("", |m| m.as_str());
        if written.iter().any(|w| w.eq_ignore_ascii_case(key)) {
            String::new()
        } else {
            caps.get(0).map_or_else(String::new, |m| m.as_str().to_owned())
        }
    });

    let tags = meta_tags(seo);
    let mut out = String::with_capacity(html.len() + tags.len());
    out.push_str(&head);
    out.push_str(&tags);
    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn global() -> SeoSettings {
        SeoSettings {
            title: "Launching Soon".to_owned(),
            description: "Site-wide description".to_owned(),
            keywords: "launch".to_owned(),
            author: "Acme".to_owned(),
            og_image: "https://cdn.example.com/og.png".to_owned(),
        }
    }

    #[test]
    fn test_is_crawler() {
        assert!(is_crawler("Mozilla/5.0 (compatible; Googlebot/2.1)"));
        assert!(is_crawler("facebookexternalhit/1.1"));
        assert!(is_crawler("WhatsApp/2.23"));
        assert!(is_crawler("Mozilla/5.0 (compatible; Yahoo! Slurp)"));
        assert!(!is_crawler(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 Safari/605.1.15"
        ));
        assert!(!is_crawler(""));
    }

    #[test]
    fn test_path_key() {
        assert_eq!(path_key("/"), "index");
        assert_eq!(path_key(""), "index");
        assert_eq!(path_key("/About/"), "about");
        assert_eq!(path_key("/blog/Post"), "blog/post");
    }

    #[test]
    fn test_resolve_prefers_route_fields() {
        let route = SeoOverride {
            title: Some("About us".to_owned()),
            description: Some("   ".to_owned()),
            ..SeoOverride::default()
        };
        let selected = resolve(&global(), Some(&route));
        assert_eq!(selected.title, "About us");
        assert_eq!(selected.description, "Site-wide description");
        assert_eq!(selected.og_image, "https://cdn.example.com/og.png");

        assert_eq!(resolve(&global(), None), global());
    }

    #[test]
    fn test_override_from_loose_json() {
        let parsed = SeoOverride::from_value(&json!({
            "title": " About ",
            "description": 42,
            "ogImage": "",
            "unknown": "x"
        }))
        .unwrap();
        assert_eq!(parsed.title.as_deref(), Some("About"));
        assert_eq!(parsed.description, None);
        assert_eq!(parsed.og_image, None);

        assert!(SeoOverride::from_value(&json!("nope")).is_none());
        assert!(SeoOverride::from_value(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_inject_rewrites_title_and_head() {
        let html = "<html><head><title>Old</title></head><body></body></html>";
        let mut seo = global();
        seo.title = "Tom & Jerry's <launch>".to_owned();

        let out = inject(html, &seo);
        assert!(out.contains("<title>Tom &amp; Jerry&#039;s &lt;launch&gt;</title>"));
        assert!(!out.contains("<title>Old</title>"));
        assert!(out.contains(r#"<meta property="og:type" content="website" />"#));
        assert!(out.contains(r#"<meta name="twitter:card" content="summary_large_image" />"#));
        assert!(out.contains(r#"<meta name="keywords" content="launch" />"#));

        let meta_at = out.find("og:title").unwrap();
        let head_close = out.find("</head>").unwrap();
        assert!(meta_at < head_close);
    }

    #[test]
    fn test_inject_skips_empty_fields() {
        let seo = SeoSettings {
            title: String::new(),
            description: String::new(),
            keywords: String::new(),
            author: String::new(),
            og_image: String::new(),
        };
        let out = inject("<head><title>Keep</title></HEAD>", &seo);
        assert!(out.contains("<title>Keep</title>"));
        assert!(!out.contains("og:title"));
        assert!(!out.contains("description"));
        assert!(out.contains("og:type"));
    }

    #[test]
    fn test_inject_replaces_existing_meta_tags() {
        let html = concat!(
            "<html><head><title>Old</title>\n",
            "  <meta charset=\"utf-8\" />\n",
            "  <meta name=\"description\" content=\"Site-wide\" />\n",
            "  <meta name=\"viewport\" content=\"width=device-width\" />\n",
            "</head><body><meta name=\"description\" content=\"body\" /></body></html>"
        );
        let mut seo = global();
        seo.description = "Route description".to_owned();

        let out = inject(html, &seo);
        let (head, _) = out.split_once("</head>").unwrap();
        assert_eq!(head.matches(r#"name="description""#).count(), 1);
        assert!(head.contains(r#"<meta name="description" content="Route description" />"#));
        assert!(!head.contains("Site-wide"));
        assert!(head.contains(r#"<meta charset="utf-8" />"#));
        assert!(head.contains(r#"name="viewport""#));
        assert!(out.contains(r#"<body><meta name="description" content="body" /></body>"#));
    }

    #[test]
    fn test_inject_without_head_only_replaces_title() {
        let out = inject("<title>x</title><p>body</p>", &global());
        assert_eq!(out, "<title>Launching Soon</title><p>body</p>");
    }
}
