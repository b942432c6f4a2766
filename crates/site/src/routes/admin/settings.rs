//! Content settings editor.
//!
//! The HTML form posts flat fields. Nested fields use dotted names
//! (`seo.title`, `subscribeModal.successMessage`), social links and mobile
//! images are edited as one `a | b | c` line per entry. The resulting JSON is
//! handed to the content service, which does all coercion.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use comingsoon_core::content::{MobileImage, SocialLink};
use serde_json::{Map, Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::services::{ContentError, LoadedContent};
use crate::state::AppState;

/// Result banner shown above the form.
pub struct Notice {
    pub success: bool,
    pub message: String,
}

/// Settings editor page.
#[derive(Template, WebTemplate)]
#[template(path = "admin/settings.html")]
pub struct SettingsTemplate {
    pub loaded: Arc<LoadedContent>,
    pub socials_text: String,
    pub interests_text: String,
    pub mobile_images_text: String,
    pub max_bytes: usize,
    pub notice: Option<Notice>,
}

impl SettingsTemplate {
    fn new(loaded: Arc<LoadedContent>, max_bytes: usize, notice: Option<Notice>) -> Self {
        let content = &loaded.content;
        Self {
            socials_text: format_socials(&content.socials),
            interests_text: content.interests.join(", "),
            mobile_images_text: format_images(&content.mobile_images.images),
            max_bytes,
            notice,
            loaded,
        }
    }
}

/// `GET /admin`
#[instrument(skip(state))]
pub async fn edit(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let loaded = state.content().current().await?;
    Ok(SettingsTemplate::new(loaded, state.content().max_bytes(), None))
}

/// `POST /admin/settings`
#[instrument(skip(state, pairs))]
pub async fn save(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let payload = form_to_payload(&pairs);
    let max_bytes = state.content().max_bytes();

    match state.content().save(&payload).await {
        Ok(saved) => {
            let notice = Notice {
                success: true,
                message: "Settings saved.".to_string(),
            };
            Ok(SettingsTemplate::new(Arc::new(saved), max_bytes, Some(notice)).into_response())
        }
        Err(ContentError::TooLarge(e)) => {
            let current = state.content().current().await?;
            let notice = Notice {
                success: false,
                message: e.to_string(),
            };
            Ok((
                StatusCode::PAYLOAD_TOO_LARGE,
                SettingsTemplate::new(current, max_bytes, Some(notice)),
            )
                .into_response())
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// Build a content payload from posted form fields. Later duplicates win,
/// so a hidden `false` input followed by a checkbox acts as a boolean.
#[must_use]
pub fn form_to_payload(pairs: &[(String, String)]) -> Value {
    let mut root = Map::new();
    for (key, value) in pairs {
        let value = match key.as_str() {
            "socials" => Value::Array(parse_socials(value)),
            "mobileImages.images" => Value::Array(parse_images(value)),
            _ => Value::String(value.clone()),
        };
        insert_path(&mut root, key, value);
    }
    Value::Object(root)
}

fn insert_path(map: &mut Map<String, Value>, key: &str, value: Value) {
    let Some((head, rest)) = key.split_once('.') else {
        map.insert(key.to_owned(), value);
        return;
    };
    let child = map
        .entry(head.to_owned())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(child) = child {
        insert_path(child, rest, value);
    }
}

fn split_line(line: &str) -> Vec<&str> {
    line.split('|').map(str::trim).collect()
}

/// One `icon | url | label` line per link. Ids follow line order.
fn parse_socials(text: &str) -> Vec<Value> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            let parts = split_line(line);
            let icon = parts.first().copied().unwrap_or_default();
            let url = parts.get(1).copied().unwrap_or_default();
            let label = parts.get(2).copied().filter(|l| !l.is_empty()).unwrap_or(icon);
            json!({ "id": (i + 1).to_string(), "icon": icon, "url": url, "label": label })
        })
        .collect()
}

/// One `url | description` line per image.
fn parse_images(text: &str) -> Vec<Value> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let parts = split_line(line);
            json!({
                "url": parts.first().copied().unwrap_or_default(),
                "description": parts.get(1).copied().unwrap_or_default(),
            })
        })
        .collect()
}

fn format_socials(socials: &[SocialLink]) -> String {
    socials
        .iter()
        .map(|s| format!("{} | {} | {}", s.icon, s.url, s.label))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_images(images: &[MobileImage]) -> String {
    images
        .iter()
        .map(|image| {
            if image.description.is_empty() {
                image.url.clone()
            } else {
                format!("{} | {}", image.url, image.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
