//! Employee routes: four verbs mapped 1:1 onto the directory store.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    middleware,
    routing::{get, put},
};
use platform_api::{ApiError, ApiResult, DeleteOutcome, EmployeeEnvelope};
use products_hr::{Employee, EmployeeId, EmployeePatch, NewEmployee};
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::{http::AppState, network};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            put(update_employee).delete(delete_employee),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.network),
            network::simulate_network,
        ))
}

/// JSON body decoded regardless of `Content-Type`; failures become validation errors.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|err| ApiError::validation(err.body_text()))?;
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|err| ApiError::validation(err.to_string()))
    }
}

fn parse_id(raw: &str) -> ApiResult<EmployeeId> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("invalid employee id `{raw}`")))
}

#[instrument(name = "employees.list", skip_all)]
async fn list_employees(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.store.lock().await.list())
}

#[instrument(name = "employees.create", skip_all)]
async fn create_employee(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<NewEmployee>,
) -> ApiResult<Json<EmployeeEnvelope>> {
    let employee = state.store.lock().await.insert(fields)?;
    info!(id = employee.id, "employee created");
    Ok(Json(EmployeeEnvelope { employee }))
}

#[instrument(name = "employees.update", skip_all, fields(id = %raw_id))]
async fn update_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(patch): JsonBody<EmployeePatch>,
) -> ApiResult<Json<EmployeeEnvelope>> {
    let id = parse_id(&raw_id)?;
    let employee = state.store.lock().await.update(id, patch)?;
    info!(id, "employee updated");
    Ok(Json(EmployeeEnvelope { employee }))
}

#[instrument(name = "employees.delete", skip_all, fields(id = %raw_id))]
async fn delete_employee(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    let id = parse_id(&raw_id)?;
    let success = state.store.lock().await.remove(id);
    info!(id, success, "employee delete handled");
    Ok(Json(DeleteOutcome { success }))
}
