//! SEO diagnostics.
//!
//! Shows which SEO fields a crawler would receive for a path, without
//! needing a crawler user agent.

use axum::{
    Json,
    extract::{Query, State},
};
use comingsoon_core::content::SeoSettings;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::seo::{self, SeoOverride};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SeoHealthQuery {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoHealth {
    pub ok: bool,
    pub origin: String,
    pub path_key: String,
    pub injection_enabled: bool,
    pub global: SeoSettings,
    pub route: Option<SeoOverride>,
    pub selected: SeoSettings,
}

/// `GET /seo-health?path=/about`
pub async fn seo_health(
    State(state): State<AppState>,
    Query(query): Query<SeoHealthQuery>,
) -> Result<Json<SeoHealth>> {
    let path_key = seo::path_key(query.path.as_deref().unwrap_or("/"));
    let loaded = state.content().current().await?;
    let route = state.content().route_seo(&path_key).await?;
    let selected = seo::resolve(&loaded.content.seo, route.as_deref());

    Ok(Json(SeoHealth {
        ok: true,
        origin: state.config().base_url.clone(),
        path_key,
        injection_enabled: state.config().seo_injection,
        global: loaded.content.seo.clone(),
        route: route.as_deref().cloned(),
        selected,
    }))
}
