use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::types::{DataResponse, MessageResponse};
use models::subscription;
use service::errors::ServiceError;
use service::subscription::{
    domain::{parse_date, SubscriptionInput},
    FilterSpec,
};

use crate::{errors::JsonApiError, routes::ServerState};

/// Raw filter query string. Dates arrive as text and are checked in
/// [`SubscriptionFilterQuery::into_filter`] before any query is built.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionFilterQuery {
    pub start_date_from: Option<String>,
    pub start_date_to: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

impl SubscriptionFilterQuery {
    pub fn into_filter(self) -> Result<FilterSpec, ServiceError> {
        Ok(FilterSpec {
            start_date_from: self
                .start_date_from
                .map(|raw| parse_date("start_date_from", &raw))
                .transpose()?,
            start_date_to: self
                .start_date_to
                .map(|raw| parse_date("start_date_to", &raw))
                .transpose()?,
            user_id: self.user_id,
            service_name: self.service_name,
        })
    }
}

// Extractor rejections are answered with the same `{"error": ..}` envelope
// as every other failure.

fn body(
    payload: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<SubscriptionInput, JsonApiError> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| JsonApiError::bad_request(rejection.body_text()))
}

fn path_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, JsonApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| JsonApiError::bad_request(rejection.body_text()))
}

fn filter(
    query: Result<Query<SubscriptionFilterQuery>, QueryRejection>,
) -> Result<FilterSpec, JsonApiError> {
    let Query(q) =
        query.map_err(|rejection| JsonApiError::bad_request(rejection.body_text()))?;
    Ok(q.into_filter()?)
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<SubscriptionFilterQuery>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<subscription::Model>>>, JsonApiError> {
    let rows = state.subscriptions.list(filter(query)?).await?;
    info!(count = rows.len(), "list subscriptions");
    Ok(Json(DataResponse { data: rows }))
}

/// Sum of prices over the filtered subscriptions.
pub async fn total(
    State(state): State<ServerState>,
    query: Result<Query<SubscriptionFilterQuery>, QueryRejection>,
) -> Result<Json<DataResponse<f64>>, JsonApiError> {
    let total = state.subscriptions.total_price(filter(query)?).await?;
    Ok(Json(DataResponse { data: total }))
}

pub async fn count(
    State(state): State<ServerState>,
    query: Result<Query<SubscriptionFilterQuery>, QueryRejection>,
) -> Result<Json<DataResponse<i64>>, JsonApiError> {
    let count = state.subscriptions.count(filter(query)?).await?;
    Ok(Json(DataResponse { data: count }))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<subscription::Model>>), JsonApiError> {
    let row = state.subscriptions.create(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

pub async fn get_one(
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DataResponse<subscription::Model>>, JsonApiError> {
    let row = state.subscriptions.get(path_id(id)?).await?;
    Ok(Json(DataResponse { data: row }))
}

pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<Json<DataResponse<subscription::Model>>, JsonApiError> {
    let row = state.subscriptions.update(path_id(id)?, body(payload)?).await?;
    Ok(Json(DataResponse { data: row }))
}

pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, JsonApiError> {
    state.subscriptions.delete(path_id(id)?).await?;
    Ok(Json(MessageResponse { message: "Subscription deleted successfully".into() }))
}
