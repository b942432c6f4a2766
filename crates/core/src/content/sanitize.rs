//! Coerce a loosely-typed JSON document into an exact [`PageContent`].
//!
//! Values coming from storage or from an admin form may be older, newer or
//! simply sloppier than the current shape. Every field is read on its own:
//! when the input has a value of a coercible shape it wins, otherwise the
//! fallback's value is used. `null` counts as absent.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::model::{
    DisplayType, KNOWN_FIELDS, LogoType, METADATA_FIELDS, MobileImage, MobileImageSettings,
    PageContent, SeoSettings, SocialLink, SubscribeModalContent, ThemeMode,
};

/// Build a [`PageContent`] from `input`, falling back to `fallback` field by
/// field.
///
/// Never fails: a non-object input yields a clone of `fallback`. Top-level
/// keys that are not part of the content model are carried into `extra`,
/// except storage metadata (`updatedAt`, `siteId`).
#[must_use]
pub fn sanitize(input: &Value, fallback: &PageContent) -> PageContent {
    let Some(map) = input.as_object() else {
        return fallback.clone();
    };
    let fields = Fields(Some(map));

    PageContent {
        logo_type: fields.choice("logoType", LogoType::parse_loose, fallback.logo_type),
        logo_text: fields.string("logoText", &fallback.logo_text),
        logo_size: fields.size("logoSize", fallback.logo_size),
        logo_image_url: fields.string("logoImageUrl", &fallback.logo_image_url),
        logo_light_image_url: fields.string("logoLightImageUrl", &fallback.logo_light_image_url),
        logo_dark_image_url: fields.string("logoDarkImageUrl", &fallback.logo_dark_image_url),
        logo_image_width: fields.size("logoImageWidth", fallback.logo_image_width),
        heading: fields.string("heading", &fallback.heading),
        heading_size: fields.size("headingSize", fallback.heading_size),
        heading_font_family: fields.string("headingFontFamily", &fallback.heading_font_family),
        countdown_target: fields.string("countdownTarget", &fallback.countdown_target),
        description: fields.string("description", &fallback.description),
        socials: fields
            .get("socials")
            .and_then(Value::as_array)
            .map_or_else(|| fallback.socials.clone(), |items| socials(items)),
        social_icon_size: fields.size("socialIconSize", fallback.social_icon_size),
        interests: fields
            .get("interests")
            .and_then(interests)
            .unwrap_or_else(|| fallback.interests.clone()),
        footer_text: fields.string("footerText", &fallback.footer_text),
        side_image_url: fields.string("sideImageUrl", &fallback.side_image_url),
        font_family: fields.string("fontFamily", &fallback.font_family),
        accent_color: fields.string("accentColor", &fallback.accent_color),
        countdown_accent_color: fields
            .string("countdownAccentColor", &fallback.countdown_accent_color),
        subscribe_button_text: fields
            .string("subscribeButtonText", &fallback.subscribe_button_text),
        theme_mode: fields.choice("themeMode", ThemeMode::parse_loose, fallback.theme_mode),
        show_countdown: fields.flag("showCountdown", fallback.show_countdown),
        show_logo: fields.flag("showLogo", fallback.show_logo),
        subscribe_modal: subscribe_modal(&fields.nested("subscribeModal"), &fallback.subscribe_modal),
        seo: seo(&fields.nested("seo"), &fallback.seo),
        mobile_images: mobile_images(&fields.nested("mobileImages"), &fallback.mobile_images),
        extra: extra(map, &fallback.extra),
    }
}

/// Read access to one JSON object level, treating `null` as absent.
struct Fields<'a>(Option<&'a Map<String, Value>>);

impl<'a> Fields<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0?.get(key).filter(|v| !v.is_null())
    }

    fn nested(&self, key: &str) -> Self {
        Self(self.get(key).and_then(Value::as_object))
    }

    fn string(&self, key: &str, fallback: &str) -> String {
        self.get(key)
            .and_then(coerce_string)
            .unwrap_or_else(|| fallback.to_owned())
    }

    fn size(&self, key: &str, fallback: u32) -> u32 {
        self.get(key).and_then(coerce_size).unwrap_or(fallback)
    }

    fn flag(&self, key: &str, fallback: bool) -> bool {
        self.get(key).and_then(coerce_bool).unwrap_or(fallback)
    }

    fn choice<T: Copy>(&self, key: &str, parse: fn(&str) -> Option<T>, fallback: T) -> T {
        self.get(key)
            .and_then(Value::as_str)
            .and_then(parse)
            .unwrap_or(fallback)
    }
}

/// Strings pass through; numbers and booleans are rendered as text.
pub(crate) fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A positive pixel size from a number or numeric string, rounded.
fn coerce_size(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let n = n.round();
    if !n.is_finite() || n < 1.0 || n > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(n as u32)
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Social links in order, with every id present and unique.
fn socials(items: &[Value]) -> Vec<SocialLink> {
    let entries: Vec<Fields<'_>> = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| Fields(Some(map)))
        .collect();

    let taken: HashSet<String> = entries.iter().map(|f| f.string("id", "")).collect();
    let mut used: HashSet<String> = HashSet::new();
    let mut next = 1_usize;

    entries
        .iter()
        .map(|fields| {
            let mut id = fields.string("id", "").trim().to_owned();
            if id.is_empty() || used.contains(&id) {
                while taken.contains(&next.to_string()) || used.contains(&next.to_string()) {
                    next += 1;
                }
                id = next.to_string();
            }
            used.insert(id.clone());
            SocialLink {
                id,
                icon: fields.string("icon", ""),
                url: fields.string("url", ""),
                label: fields.string("label", ""),
            }
        })
        .collect()
}

/// Interests from an array, or from a comma-separated string as typed in the
/// settings form.
fn interests(value: &Value) -> Option<Vec<String>> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(coerce_string).collect(),
        Value::String(s) => s.split(',').map(str::to_owned).collect(),
        _ => return None,
    };
    Some(
        raw.iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

fn subscribe_modal(fields: &Fields<'_>, fallback: &SubscribeModalContent) -> SubscribeModalContent {
    SubscribeModalContent {
        title: fields.string("title", &fallback.title),
        subtitle: fields.string("subtitle", &fallback.subtitle),
        success_title: fields.string("successTitle", &fallback.success_title),
        success_message: fields.string("successMessage", &fallback.success_message),
        privacy_note: fields.string("privacyNote", &fallback.privacy_note),
    }
}

fn seo(fields: &Fields<'_>, fallback: &SeoSettings) -> SeoSettings {
    SeoSettings {
        title: fields.string("title", &fallback.title),
        description: fields.string("description", &fallback.description),
        keywords: fields.string("keywords", &fallback.keywords),
        author: fields.string("author", &fallback.author),
        og_image: fields.string("ogImage", &fallback.og_image),
    }
}

fn mobile_images(fields: &Fields<'_>, fallback: &MobileImageSettings) -> MobileImageSettings {
    let images = fields.get("images").and_then(Value::as_array).map_or_else(
        || fallback.images.clone(),
        |items| items.iter().filter_map(mobile_image).collect(),
    );

    MobileImageSettings {
        enabled: fields.flag("enabled", fallback.enabled),
        display_type: fields.choice("displayType", DisplayType::parse_loose, fallback.display_type),
        images,
    }
}

fn mobile_image(value: &Value) -> Option<MobileImage> {
    match value {
        Value::Object(map) => {
            let fields = Fields(Some(map));
            Some(MobileImage {
                url: fields.string("url", ""),
                description: fields.string("description", ""),
            })
        }
        Value::String(url) => Some(MobileImage {
            url: url.clone(),
            description: String::new(),
        }),
        _ => None,
    }
}

fn extra(map: &Map<String, Value>, fallback: &Map<String, Value>) -> Map<String, Value> {
    let mut extra = fallback.clone();
    extra.extend(
        map.iter()
            .filter(|(key, _)| {
                !KNOWN_FIELDS.contains(&key.as_str()) && !METADATA_FIELDS.contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    extra
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn defaults() -> PageContent {
        PageContent::defaults_at(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())
    }

    #[test]
    fn test_non_object_yields_fallback() {
        assert_eq!(sanitize(&json!("nope"), &defaults()), defaults());
        assert_eq!(sanitize(&Value::Null, &defaults()), defaults());
    }

    #[test]
    fn test_sanitizing_defaults_is_identity() {
        let value = serde_json::to_value(defaults()).unwrap();
        assert_eq!(sanitize(&value, &defaults()), defaults());
    }

    #[test]
    fn test_scalars_are_coerced() {
        let content = sanitize(
            &json!({
                "logoSize": "36.6",
                "headingSize": 0,
                "socialIconSize": -4,
                "showLogo": "false",
                "showCountdown": 0,
                "heading": 2026,
                "themeMode": "DARK",
                "logoType": "banner",
                "footerText": null,
            }),
            &defaults(),
        );
        assert_eq!(content.logo_size, 37);
        assert_eq!(content.heading_size, 48);
        assert_eq!(content.social_icon_size, 20);
        assert!(!content.show_logo);
        assert!(!content.show_countdown);
        assert_eq!(content.heading, "2026");
        assert_eq!(content.theme_mode, ThemeMode::Dark);
        assert_eq!(content.logo_type, LogoType::Text);
        assert_eq!(content.footer_text, defaults().footer_text);
    }

    #[test]
    fn test_mobile_image_fields_are_coerced_to_strings() {
        let content = sanitize(
            &json!({
                "mobileImages": {
                    "enabled": "on",
                    "displayType": "gallery",
                    "images": [
                        {"url": 42, "description": true},
                        "https://img.example.com/b.png",
                        {"description": "no url"},
                        7,
                    ]
                }
            }),
            &defaults(),
        );
        let settings = &content.mobile_images;
        assert!(settings.enabled);
        assert_eq!(settings.display_type, DisplayType::Gallery);
        assert_eq!(
            settings.images,
            vec![
                MobileImage {
                    url: "42".to_owned(),
                    description: "true".to_owned()
                },
                MobileImage {
                    url: "https://img.example.com/b.png".to_owned(),
                    description: String::new()
                },
                MobileImage {
                    url: String::new(),
                    description: "no url".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_social_ids_made_unique() {
        let content = sanitize(
            &json!({
                "socials": [
                    {"id": "2", "icon": "x", "url": "https://x.com", "label": "X"},
                    {"icon": "github", "url": "https://github.com", "label": "GitHub"},
                    {"id": "2", "icon": "youtube", "url": "https://youtube.com"},
                    "not a link",
                ]
            }),
            &defaults(),
        );
        let ids: Vec<&str> = content.socials.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
        assert_eq!(content.socials[2].label, "");
    }

    #[test]
    fn test_interests_from_comma_string() {
        let content = sanitize(&json!({"interests": " Rust, ,Go ,"}), &defaults());
        assert_eq!(content.interests, vec!["Rust", "Go"]);

        let content = sanitize(&json!({"interests": ["A", 1, {}, " "]}), &defaults());
        assert_eq!(content.interests, vec!["A", "1"]);
    }

    #[test]
    fn test_nested_objects_merge_per_field() {
        let content = sanitize(
            &json!({"seo": {"title": "Launch"}, "subscribeModal": "broken"}),
            &defaults(),
        );
        assert_eq!(content.seo.title, "Launch");
        assert_eq!(content.seo.keywords, defaults().seo.keywords);
        assert_eq!(content.subscribe_modal, defaults().subscribe_modal);
    }

    #[test]
    fn test_unknown_fields_kept_and_metadata_dropped() {
        let content = sanitize(
            &json!({"bannerText": "hi", "updatedAt": "2026-01-01", "siteId": "x"}),
            &defaults(),
        );
        assert_eq!(content.extra.len(), 1);
        assert_eq!(content.extra["bannerText"], "hi");
    }

    #[test]
    fn test_unknown_fields_survive_partial_save() {
        let current = sanitize(&json!({"bannerText": "hi"}), &defaults());
        let next = sanitize(&json!({"heading": "New", "promo": 1}), &current);
        assert_eq!(next.extra["bannerText"], "hi");
        assert_eq!(next.extra["promo"], 1);
        assert_eq!(next.heading, "New");
    }
}
