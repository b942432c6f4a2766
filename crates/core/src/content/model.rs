//! The page content document and its built-in defaults.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format of `countdownTarget`, matching an HTML `datetime-local` input.
pub const COUNTDOWN_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// How the logo is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoType {
    Text,
    Image,
}

/// Color theme selection for the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    System,
}

/// How mobile images are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    Single,
    Gallery,
}

/// The concrete scheme a page is being rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

macro_rules! loose_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// The serialized name of this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Parse a variant name, ignoring case and surrounding whitespace.
            #[must_use]
            pub fn parse_loose(s: &str) -> Option<Self> {
                let s = s.trim();
                $(if s.eq_ignore_ascii_case($text) {
                    return Some(Self::$variant);
                })+
                None
            }
        }
    };
}

loose_enum!(LogoType { Text => "text", Image => "image" });
loose_enum!(ThemeMode { Light => "light", Dark => "dark", System => "system" });
loose_enum!(DisplayType { Single => "single", Gallery => "gallery" });

/// A social profile link shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: String,
    pub icon: String,
    pub url: String,
    pub label: String,
}

/// Site-wide SEO metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoSettings {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub og_image: String,
}

/// Copy for the subscribe dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeModalContent {
    pub title: String,
    pub subtitle: String,
    pub success_title: String,
    pub success_message: String,
    pub privacy_note: String,
}

/// One image in the mobile gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileImage {
    pub url: String,
    pub description: String,
}

/// Images shown on small screens in place of the side image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileImageSettings {
    pub enabled: bool,
    pub display_type: DisplayType,
    pub images: Vec<MobileImage>,
}

impl MobileImageSettings {
    /// The images that should actually be rendered.
    ///
    /// Nothing when disabled; only the first image in `single` mode, extra
    /// entries are ignored rather than treated as an error.
    #[must_use]
    pub fn visible_images(&self) -> &[MobileImage] {
        if !self.enabled {
            return &[];
        }
        match self.display_type {
            DisplayType::Single => self.images.get(..1).unwrap_or_default(),
            DisplayType::Gallery => &self.images,
        }
    }
}

/// Time remaining until the countdown target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// The full, versionless page configuration for one site.
///
/// Every field has a default (see [`PageContent::defaults_at`]). Fields this
/// version does not know about are kept in `extra` so a round trip through
/// load and save never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub logo_type: LogoType,
    pub logo_text: String,
    pub logo_size: u32,
    /// Single logo used before light/dark variants existed.
    pub logo_image_url: String,
    pub logo_light_image_url: String,
    pub logo_dark_image_url: String,
    pub logo_image_width: u32,
    pub heading: String,
    pub heading_size: u32,
    pub heading_font_family: String,
    /// Local date and time in [`COUNTDOWN_FORMAT`].
    pub countdown_target: String,
    /// Markdown shown under the heading.
    pub description: String,
    pub socials: Vec<SocialLink>,
    pub social_icon_size: u32,
    pub interests: Vec<String>,
    pub footer_text: String,
    pub side_image_url: String,
    pub font_family: String,
    pub accent_color: String,
    pub countdown_accent_color: String,
    pub subscribe_button_text: String,
    pub theme_mode: ThemeMode,
    pub show_countdown: bool,
    pub show_logo: bool,
    pub subscribe_modal: SubscribeModalContent,
    pub seo: SeoSettings,
    pub mobile_images: MobileImageSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Top-level field names of [`PageContent`] as they appear in storage.
pub const KNOWN_FIELDS: &[&str] = &[
    "logoType",
    "logoText",
    "logoSize",
    "logoImageUrl",
    "logoLightImageUrl",
    "logoDarkImageUrl",
    "logoImageWidth",
    "heading",
    "headingSize",
    "headingFontFamily",
    "countdownTarget",
    "description",
    "socials",
    "socialIconSize",
    "interests",
    "footerText",
    "sideImageUrl",
    "fontFamily",
    "accentColor",
    "countdownAccentColor",
    "subscribeButtonText",
    "themeMode",
    "showCountdown",
    "showLogo",
    "subscribeModal",
    "seo",
    "mobileImages",
];

/// Storage metadata written next to the content, never part of it.
pub const METADATA_FIELDS: &[&str] = &["updatedAt", "siteId"];

const DEFAULT_LOGO_LIGHT: &str = "https://tailwindui.com/img/logos/mark.svg?color=indigo&shade=600";
const DEFAULT_LOGO_DARK: &str = "https://tailwindui.com/img/logos/mark.svg?color=white&shade=100";
const DEFAULT_SIDE_IMAGE: &str =
    "https://images.unsplash.com/photo-1542831371-29b0f74f9713?q=80&w=2070&auto=format&fit=crop";

impl PageContent {
    /// Built-in defaults, with the countdown set 30 days after `now`.
    ///
    /// Pure: every call builds a fresh value and nothing is shared.
    #[must_use]
    pub fn defaults_at(now: DateTime<Utc>) -> Self {
        let countdown = now + Duration::days(30);

        Self {
            logo_type: LogoType::Text,
            logo_text: "IChanneTech".to_owned(),
            logo_size: 28,
            logo_image_url: DEFAULT_LOGO_LIGHT.to_owned(),
            logo_light_image_url: DEFAULT_LOGO_LIGHT.to_owned(),
            logo_dark_image_url: DEFAULT_LOGO_DARK.to_owned(),
            logo_image_width: 150,
            heading: "Our website is under construction, follow us for update now!".to_owned(),
            heading_size: 48,
            heading_font_family: "Inter".to_owned(),
            countdown_target: countdown.format(COUNTDOWN_FORMAT).to_string(),
            description: "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
                          tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim \
                          veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea \
                          commodo consequat."
                .to_owned(),
            socials: vec![
                social("1", "x", "https://twitter.com", "X (Twitter)"),
                social("2", "instagram", "https://instagram.com", "Instagram"),
                social("3", "youtube", "https://youtube.com", "YouTube"),
                social("4", "github", "https://github.com", "GitHub"),
            ],
            social_icon_size: 20,
            interests: vec![
                "JavaScript".to_owned(),
                "TypeScript".to_owned(),
                "Node.js".to_owned(),
            ],
            footer_text: "Made by IChanneTech with love.".to_owned(),
            side_image_url: DEFAULT_SIDE_IMAGE.to_owned(),
            font_family: "Inter".to_owned(),
            accent_color: "#fce7f3".to_owned(),
            countdown_accent_color: "#000000".to_owned(),
            subscribe_button_text: "Subscribe".to_owned(),
            theme_mode: ThemeMode::System,
            show_countdown: true,
            show_logo: true,
            subscribe_modal: SubscribeModalContent {
                title: "Stay Updated".to_owned(),
                subtitle: "Subscribe to get notified when we launch. We promise not to spam you!"
                    .to_owned(),
                success_title: "🎉 Success!".to_owned(),
                success_message: "Thank you for subscribing! We'll keep you updated.".to_owned(),
                privacy_note: "We respect your privacy. Unsubscribe at any time.".to_owned(),
            },
            seo: SeoSettings {
                title: "Coming Soon - IChanneTech".to_owned(),
                description: "Our website is under construction. Subscribe to get notified when we launch!"
                    .to_owned(),
                keywords: "coming soon, launch, website, under construction".to_owned(),
                author: "IChanneTech".to_owned(),
                og_image: DEFAULT_SIDE_IMAGE.to_owned(),
            },
            mobile_images: MobileImageSettings {
                enabled: false,
                display_type: DisplayType::Single,
                images: Vec::new(),
            },
            extra: Map::new(),
        }
    }

    /// Built-in defaults relative to the current time.
    #[must_use]
    pub fn defaults() -> Self {
        Self::defaults_at(Utc::now())
    }

    /// The logo image for a color scheme.
    ///
    /// Prefers the scheme-specific variant, then the legacy single logo,
    /// then whichever variant exists.
    #[must_use]
    pub fn logo_url_for(&self, scheme: ColorScheme) -> &str {
        let specific = match scheme {
            ColorScheme::Light => &self.logo_light_image_url,
            ColorScheme::Dark => &self.logo_dark_image_url,
        };
        [
            specific,
            &self.logo_image_url,
            &self.logo_light_image_url,
            &self.logo_dark_image_url,
        ]
        .into_iter()
        .find(|url| !url.is_empty())
        .map_or("", String::as_str)
    }

    /// Parse `countdown_target`.
    ///
    /// Accepts the `datetime-local` form, with or without seconds, and full
    /// RFC 3339 timestamps. Local forms are interpreted as UTC.
    #[must_use]
    pub fn countdown_deadline(&self) -> Option<NaiveDateTime> {
        let raw = self.countdown_target.trim();
        NaiveDateTime::parse_from_str(raw, COUNTDOWN_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc).naive_utc())
            })
    }

    /// Time remaining until the countdown target, zero once it has passed.
    #[must_use]
    pub fn time_left(&self, now: DateTime<Utc>) -> TimeLeft {
        let Some(deadline) = self.countdown_deadline() else {
            return TimeLeft::default();
        };
        let remaining = deadline.and_utc() - now;
        if remaining <= Duration::zero() {
            return TimeLeft::default();
        }
        let total = remaining.num_seconds();
        TimeLeft {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }
}

fn social(id: &str, icon: &str, url: &str, label: &str) -> SocialLink {
    SocialLink {
        id: id.to_owned(),
        icon: icon.to_owned(),
        url: url.to_owned(),
        label: label.to_owned(),
    }
}
