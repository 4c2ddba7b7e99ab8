use axum::{extract::State, response::Response};
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;

use super::common::success_response;
use crate::store::EntityKind;
use crate::AppState;

/// Liveness check with per-table row counts
pub async fn health_check(State(state): State<AppState>) -> Response {
    let counts: BTreeMap<&'static str, i32> = state
        .store
        .read(|tables| {
            EntityKind::ALL
                .iter()
                .map(|kind| (kind.name(), tables.count(*kind)))
                .collect()
        })
        .await;

    success_response(json!({
        "status": "healthy",
        "service": "foodchain-api",
        "version": env!("CARGO_PKG_VERSION"),
        "tables": counts,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
