use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

use super::AdminState;
use crate::supervisor::{ApiResource, Status};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub objects: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let objects = state.supervisor.lock().await.names().len();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        objects,
    })
}

pub async fn get_objects(State(state): State<AdminState>) -> Json<BTreeMap<String, Status>> {
    Json(state.supervisor.lock().await.statuses())
}

pub async fn get_object(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Result<Json<Status>, StatusCode> {
    state
        .supervisor
        .lock()
        .await
        .status(&name)
        .map(Json)
        .map_err(|_| StatusCode::NOT_FOUND)
}

pub async fn get_kinds(State(state): State<AdminState>) -> Json<Vec<ApiResource>> {
    Json(state.registry.resources())
}

pub async fn get_default_spec(
    State(state): State<AdminState>,
    Path(kind): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state
        .registry
        .get(&kind)
        .map(|entry| Json(entry.default_spec()))
        .ok_or(StatusCode::NOT_FOUND)
}
