use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use pr_reviewer::github::PullRequestEvent;
use tracing::{debug, info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::webhook::webhook_response::WebhookResponse,
};

/// PR actions that start a review cycle; everything else is acknowledged
/// and ignored.
const REVIEWED_ACTIONS: [&str; 2] = ["opened", "synchronize"];

/// HTTP endpoint receiving GitHub `pull_request` webhook deliveries.
///
/// The shared secret in `X-Webhook-Secret` must match the configured
/// `WEBHOOK_SECRET`. Pipeline failures never surface as HTTP errors: the
/// pipeline reports them on the PR itself, and the delivery is always
/// acknowledged with 200 so the provider does not retry.
#[instrument(name = "github_webhook", skip(state, headers, event))]
pub async fn github_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(event): Json<PullRequestEvent>,
) -> Response {
    if let Some(id) = headers.get("X-GitHub-Delivery").and_then(|h| h.to_str().ok()) {
        debug!(%id, "delivery id attached");
    }

    // --- Validate shared secret -------------------------------------------------
    let expected_secret = state.webhook_secret.trim();
    let provided_secret = headers
        .get("X-Webhook-Secret")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .trim();

    if expected_secret.is_empty() {
        // Misconfiguration on server side.
        return ApiResponse::<()>::error(
            "SERVER_CONFIG_ERROR",
            "Webhook secret is not configured.",
        )
        .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    if provided_secret.is_empty() || provided_secret != expected_secret {
        return ApiResponse::<()>::error("UNAUTHORIZED", "Invalid webhook secret.")
            .into_response_with_status(StatusCode::UNAUTHORIZED);
    }

    // --- Filter actions -----------------------------------------------------------
    if !REVIEWED_ACTIONS.contains(&event.action.as_str()) {
        debug!(action = %event.action, "ignoring non-review action");
        return ApiResponse::success(WebhookResponse {
            message: format!("Ignored action '{}'.", event.action),
        })
        .into_response_with_status(StatusCode::OK);
    }

    info!(
        pr = event.pull_request.number,
        action = %event.action,
        "starting PR review cycle"
    );

    // --- Run review pipeline ----------------------------------------------------
    // Failures are reported as PR comments inside handle_pr_event.
    pr_reviewer::handle_pr_event(&state.client, &state.llm, &event).await;

    ApiResponse::success(WebhookResponse {
        message: "PR review completed.".to_string(),
    })
    .into_response_with_status(StatusCode::OK)
}
