//! Merge-on-load for stored page content.

use serde_json::{Map, Value};

use super::model::PageContent;
use super::sanitize::{coerce_string, sanitize};

const LEGACY_LOGO: &str = "logoImageUrl";
const LIGHT_LOGO: &str = "logoLightImageUrl";
const DARK_LOGO: &str = "logoDarkImageUrl";

/// Overlay a stored document onto the built-in defaults.
///
/// Fields present in storage win; fields an older document never had are
/// backfilled from `defaults`. Unknown fields pass through untouched.
#[must_use]
pub fn merge_stored(stored: &Value, defaults: &PageContent) -> PageContent {
    match stored.as_object() {
        Some(map) => sanitize(&Value::Object(migrate_legacy_logo(map, defaults)), defaults),
        None => defaults.clone(),
    }
}

/// Documents written before light/dark logos existed only carry
/// `logoImageUrl`. An absent or empty light logo is seeded from it; empty
/// logo URLs otherwise fall back to the defaults.
fn migrate_legacy_logo(stored: &Map<String, Value>, defaults: &PageContent) -> Map<String, Value> {
    let mut map = stored.clone();
    let non_empty = |key: &str| {
        stored
            .get(key)
            .and_then(coerce_string)
            .filter(|url| !url.trim().is_empty())
    };

    let legacy = non_empty(LEGACY_LOGO);
    let light = non_empty(LIGHT_LOGO)
        .or_else(|| legacy.clone())
        .unwrap_or_else(|| defaults.logo_light_image_url.clone());
    let dark = non_empty(DARK_LOGO).unwrap_or_else(|| defaults.logo_dark_image_url.clone());
    let legacy = legacy.unwrap_or_else(|| defaults.logo_image_url.clone());

    map.insert(LEGACY_LOGO.to_owned(), Value::String(legacy));
    map.insert(LIGHT_LOGO.to_owned(), Value::String(light));
    map.insert(DARK_LOGO.to_owned(), Value::String(dark));
    map
}
