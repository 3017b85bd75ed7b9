pub mod fraud;
pub mod notifications;

pub use fraud::{FraudClient, FraudEvaluation};
pub use notifications::{NotificationClient, NotificationOutcome, NotificationStatusLookup};

use serde_json::Value;

/// Pulls the collaborator's `detail` field out of an error body, falling
/// back to a generic message when the body is not what we expect.
pub(crate) async fn error_detail(response: reqwest::Response) -> String {
    response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("detail")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| "unknown error".to_string())
}
