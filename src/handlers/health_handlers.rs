//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks DB connectivity and storage I/O

use crate::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::collections::HashMap;
use tokio::fs;
use uuid::Uuid;

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
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `GET /healthz`
///
/// Liveness probe; always 200, never performs I/O.
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
/// Readiness probe: a `SELECT 1` against SQLite plus a best-effort
/// write/read/delete under the storage directory. 200 when both pass,
/// 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let database = database_check(&state).await;
    let storage = storage_check(&state).await;

    let overall_ok = database.ok && storage.ok;
    let mut checks = HashMap::new();
    checks.insert("database", database);
    checks.insert("storage", storage);

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadyResponse {
        status: if overall_ok { "ok".into() } else { "error".into() },
        checks,
    };

    (status, Json(body))
}

async fn database_check(state: &AppState) -> CheckStatus {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*state.gallery.db)
        .await
    {
        Ok(1) => CheckStatus {
            ok: true,
            error: None,
        },
        Ok(other) => CheckStatus {
            ok: false,
            error: Some(format!("unexpected result: {}", other)),
        },
        Err(err) => CheckStatus {
            ok: false,
            error: Some(err.to_string()),
        },
    }
}

async fn storage_check(state: &AppState) -> CheckStatus {
    let tmp_path = state
        .storage
        .base_path
        .join(format!(".readyz-{}", Uuid::new_v4()));

    let result = async {
        fs::write(&tmp_path, b"readyz").await?;
        let bytes = fs::read(&tmp_path).await?;
        fs::remove_file(&tmp_path).await?;
        if bytes == b"readyz" {
            Ok(())
        } else {
            Err(std::io::Error::other("file content mismatch"))
        }
    }
    .await;

    match result {
        Ok(()) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(err) => {
            let _ = fs::remove_file(&tmp_path).await;
            CheckStatus {
                ok: false,
                error: Some(err.to_string()),
            }
        }
    }
}
