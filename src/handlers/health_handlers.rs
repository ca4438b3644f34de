//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the photo slot and resource storage

use crate::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;

/// `GET /healthz`
///
/// Very small liveness probe. Always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that:
/// 1. Reads the photo slot through the repository.
/// 2. Creates, resolves and releases a tiny resource.
///
/// HTTP 200 when all checks pass, HTTP 503 when any check fails.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let slot_check = match state.repository.read_all().await {
        Ok(_) => CheckStatus::ok(),
        Err(e) => CheckStatus::failed(format!("error: {}", e)),
    };

    let resources = &state.resources;
    let resource_check = match resources
        .create("text/plain", Bytes::from_static(b"readyz"))
        .await
    {
        Ok(handle) => {
            let check = match resources.resolve(&handle).await {
                Ok(resource) if &resource.bytes[..] == b"readyz" => CheckStatus::ok(),
                Ok(_) => CheckStatus::failed("resource content mismatch"),
                Err(e) => CheckStatus::failed(format!("could not resolve resource: {}", e)),
            };
            // best-effort cleanup
            let _ = resources.release(&handle).await;
            check
        }
        Err(e) => CheckStatus::failed(format!("could not create resource: {}", e)),
    };

    let overall_ok = slot_check.ok && resource_check.ok;

    let mut checks = HashMap::new();
    checks.insert("slot", slot_check);
    checks.insert("resources", resource_check);

    let body = ReadyResponse {
        status: if overall_ok { "ok" } else { "error" }.into(),
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}
