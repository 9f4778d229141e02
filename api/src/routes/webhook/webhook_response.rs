use serde::Serialize;

/// Body of a successful webhook acknowledgement.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub message: String,
}
