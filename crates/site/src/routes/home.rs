//! Public landing page.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use chrono::Utc;
use comingsoon_core::content::{ColorScheme, LogoType, MobileImage, ThemeMode, TimeLeft};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::services::LoadedContent;
use crate::state::AppState;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub loaded: Arc<LoadedContent>,
    pub time_left: TimeLeft,
    pub theme_class: &'static str,
    pub logo_is_image: bool,
    pub logo_light: String,
    pub logo_dark: String,
    pub mobile_images: Vec<MobileImage>,
    pub seo_title: String,
}

impl HomeTemplate {
    #[must_use]
    pub fn new(loaded: Arc<LoadedContent>) -> Self {
        let content = &loaded.content;
        let theme_class = match content.theme_mode {
            ThemeMode::Light => "theme-light",
            ThemeMode::Dark => "theme-dark",
            ThemeMode::System => "theme-system",
        };
        let seo_title = if content.seo.title.is_empty() {
            comingsoon_core::strip_markdown(&content.heading)
        } else {
            content.seo.title.clone()
        };

        Self {
            time_left: content.time_left(Utc::now()),
            theme_class,
            logo_is_image: content.logo_type == LogoType::Image,
            logo_light: content.logo_url_for(ColorScheme::Light).to_owned(),
            logo_dark: content.logo_url_for(ColorScheme::Dark).to_owned(),
            mobile_images: content.mobile_images.visible_images().to_vec(),
            seo_title,
            loaded,
        }
    }
}

/// Render the landing page from the current content.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let loaded = state.content().current().await?;
    Ok(HomeTemplate::new(loaded))
}
