/// Dry-Run Gate
///
/// Route middleware installed once over every device endpoint when the
/// process runs with `--dry-run`. It answers in place of the handler and
/// never calls `next`, so no Session Manager is reached.
///
/// - state-changing endpoints echo the JSON body tagged as simulated
/// - read endpoints return an empty placeholder response

use super::handlers::respond;
use crate::application::outcome::{Operation, OperationResult};
use crate::domain::validation::ValidationError;
use crate::shared::error::DeviceError;
use crate::shared::metrics::METRICS;
use crate::shared::protocol::parse_object;
use axum::{extract::Request, middleware::Next, response::Response};
use serde_json::json;
use tracing::info;

/// 请求体上限
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub const SIMULATED_CHANGE_MESSAGE: &str = "dry run: no changes sent to device";
pub const SIMULATED_READ_MESSAGE: &str = "dry run: device not contacted";

pub async fn gate(request: Request, next: Next) -> Response {
    let Some(operation) = Operation::from_path(request.uri().path()) else {
        return next.run(request).await;
    };

    METRICS
        .dry_run_requests_total
        .with_label_values(&[operation.as_str()])
        .inc();

    if operation.is_read_only() {
        info!(operation = operation.as_str(), "dry run: read answered with placeholder");
        return respond(OperationResult::success(
            SIMULATED_READ_MESSAGE,
            json!({
                "simulated": true,
                "operation": operation.as_str(),
                "response": "",
            }),
        ));
    }

    let input = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => parse_object(&body),
        Err(e) => Err(ValidationError::MalformedBody(e.to_string())),
    };

    match input {
        Ok(input) => {
            info!(operation = operation.as_str(), "dry run: request echoed");
            respond(OperationResult::success(
                SIMULATED_CHANGE_MESSAGE,
                json!({
                    "simulated": true,
                    "operation": operation.as_str(),
                    "input": input,
                }),
            ))
        }
        Err(e) => respond(OperationResult::failure(&DeviceError::from(e))),
    }
}
