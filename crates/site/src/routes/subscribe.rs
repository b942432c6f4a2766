//! Subscribe form handlers.
//!
//! `POST /subscribe` takes the plain HTML form and renders a result page;
//! `POST /api/subscribe` takes JSON and answers with an `ActionOutcome`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{ActionOutcome, AppError, add_breadcrumb};
use crate::filters;
use crate::services::{FieldError, RegisterError, SubscribeOutcome};
use crate::state::AppState;

const ALREADY_SUBSCRIBED: &str = "This email is already subscribed.";

/// Subscribe form data. Missing fields are reported by validation.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Result page for the no-script form.
#[derive(Template, WebTemplate)]
#[template(path = "subscribe_result.html")]
pub struct SubscribeResultTemplate {
    pub success: bool,
    pub title: String,
    pub message: String,
    pub fields: Vec<FieldError>,
}

async fn run(state: &AppState, form: &SubscribeForm) -> Result<SubscribeOutcome, RegisterError> {
    let outcome = state
        .register()
        .subscribe(&form.name, &form.email, form.phone.as_deref())
        .await?;
    if let SubscribeOutcome::Created(subscriber) = &outcome {
        add_breadcrumb(
            "subscribe",
            "Subscriber created",
            Some(&[("subscriber_id", subscriber.id.as_str())]),
        );
    }
    Ok(outcome)
}

/// Subscribe from the HTML form.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn subscribe_form(
    State(state): State<AppState>,
    Form(form): Form<SubscribeForm>,
) -> Response {
    let modal = match state.content().current().await {
        Ok(loaded) => loaded.content.subscribe_modal.clone(),
        Err(e) => return AppError::from(e).into_response(),
    };

    match run(&state, &form).await {
        Ok(SubscribeOutcome::Created(_)) => SubscribeResultTemplate {
            success: true,
            title: modal.success_title,
            message: modal.success_message,
            fields: Vec::new(),
        }
        .into_response(),
        Ok(SubscribeOutcome::AlreadySubscribed) => (
            StatusCode::CONFLICT,
            SubscribeResultTemplate {
                success: false,
                title: modal.title,
                message: ALREADY_SUBSCRIBED.to_string(),
                fields: Vec::new(),
            },
        )
            .into_response(),
        Err(RegisterError::Validation(fields)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            SubscribeResultTemplate {
                success: false,
                title: modal.title,
                message: "Please correct the following and try again.".to_string(),
                fields,
            },
        )
            .into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Subscribe via JSON.
///
/// A body that is not a JSON object of the expected shape is answered with
/// an `invalid_body` outcome rather than axum's plain-text rejection.
pub async fn subscribe_api(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeForm>, JsonRejection>,
) -> Result<Response, AppError> {
    match payload {
        Ok(Json(form)) => subscribe_json(&state, &form).await,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected subscribe body");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ActionOutcome::failure(
                    "invalid_body",
                    "Send name, email and optional phone as a JSON object.",
                )),
            )
                .into_response())
        }
    }
}

#[instrument(skip(state, form), fields(email = %form.email))]
async fn subscribe_json(state: &AppState, form: &SubscribeForm) -> Result<Response, AppError> {
    let outcome = match run(state, form).await? {
        SubscribeOutcome::Created(_) => {
            let loaded = state.content().current().await?;
            (
                StatusCode::CREATED,
                Json(ActionOutcome::ok(
                    loaded.content.subscribe_modal.success_message.clone(),
                )),
            )
        }
        SubscribeOutcome::AlreadySubscribed => (
            StatusCode::CONFLICT,
            Json(ActionOutcome::failure("already_subscribed", ALREADY_SUBSCRIBED)),
        ),
    };
    Ok(outcome.into_response())
}
