/// Request Router handlers
///
/// Each handler parses the body, calls one Session Manager operation and
/// wraps the outcome in the uniform envelope. The HTTP status always
/// reflects the outcome.

use super::AppState;
use crate::application::outcome::{Operation, OperationResult};
use crate::shared::error::{DeviceError, ErrorKind};
use crate::shared::protocol::LoopbackRequest;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

/// 结果类别对应的HTTP状态码
pub fn status_for(result: &OperationResult) -> StatusCode {
    match result.kind {
        None => StatusCode::OK,
        Some(ErrorKind::InvalidInput) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::AuthError) | Some(ErrorKind::TransportError) => StatusCode::BAD_GATEWAY,
        Some(ErrorKind::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        Some(ErrorKind::DeviceRejected) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn respond(result: OperationResult) -> Response {
    (status_for(&result), Json(result)).into_response()
}

fn finish(operation: Operation, result: Result<Value, DeviceError>) -> Response {
    match result {
        Ok(data) => respond(OperationResult::success(operation.success_message(), data)),
        Err(e) => {
            if e.kind() == ErrorKind::InvalidInput {
                // 设备操作的失败已由SessionScope记录
                warn!(
                    variant = operation.variant(),
                    operation = operation.as_str(),
                    outcome = e.kind().as_str(),
                    error = %e,
                    "request rejected before contacting device"
                );
            }
            respond(OperationResult::failure(&e))
        }
    }
}

/// `POST /create-loopback`
pub async fn create_loopback(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match LoopbackRequest::from_body(&body) {
        Ok(request) => state
            .cli
            .create_loopback(&request)
            .await
            .map(|response| json!({ "response": response })),
        Err(e) => Err(e.into()),
    };
    finish(Operation::CreateLoopback, result)
}

/// `GET /list-interfaces`
pub async fn list_interfaces(State(state): State<AppState>) -> Response {
    let result = state
        .cli
        .list_interfaces()
        .await
        .map(|response| json!({ "response": response }));
    finish(Operation::ListInterfaces, result)
}

/// `POST /remove-loopback`
pub async fn remove_loopback(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match LoopbackRequest::from_body(&body) {
        Ok(request) => state
            .cli
            .delete_loopback(&request)
            .await
            .map(|response| json!({ "response": response })),
        Err(e) => Err(e.into()),
    };
    finish(Operation::RemoveLoopback, result)
}

/// `POST /configure-loopback`
pub async fn configure_loopback(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match LoopbackRequest::from_body(&body) {
        Ok(request) => state
            .netconf
            .configure_loopback(&request)
            .await
            .map(|reply| json!({ "reply": reply.raw() })),
        Err(e) => Err(e.into()),
    };
    finish(Operation::ConfigureLoopback, result)
}

/// `POST /delete-loopback`
pub async fn delete_loopback(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match LoopbackRequest::from_body(&body) {
        Ok(request) => state
            .netconf
            .delete_loopback(&request)
            .await
            .map(|reply| json!({ "reply": reply.raw() })),
        Err(e) => Err(e.into()),
    };
    finish(Operation::DeleteLoopback, result)
}

/// `POST /show-loopback`
pub async fn show_loopback(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match LoopbackRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => return finish(Operation::ShowLoopback, Err(e.into())),
    };

    match state.netconf.show_loopback(&request).await {
        Ok(view) if view.interface.is_none() => respond(OperationResult::success(
            "Loopback interface not configured",
            json!({ "interface": null, "xml": view.xml }),
        )),
        Ok(view) => finish(
            Operation::ShowLoopback,
            Ok(json!({ "interface": view.interface, "xml": view.xml })),
        ),
        Err(e) => finish(Operation::ShowLoopback, Err(e)),
    }
}
