use super::common::{
    created_response, json_body, no_content_response, success_response, PaginatedResponse,
    PaginationParams,
};
use crate::{
    auth::AuthRouterExt,
    entities::types::validate_money,
    errors::ApiError,
    services::promotions::{CreateDiscount, UpdateDiscount},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ActiveDiscountQuery {
    /// Customer group asking for discounts; omit for walk-in customers
    pub group_id: Option<String>,
    /// When present, each discount reports the amount it takes off this subtotal
    pub subtotal: Option<Decimal>,
    /// Defaults to now
    pub at: Option<DateTime<Utc>>,
}

pub async fn list_discounts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let discounts = state
        .services
        .promotions
        .list_discounts(page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        discounts, page, per_page,
    )))
}

pub async fn list_active_discounts(
    State(state): State<AppState>,
    Query(query): Query<ActiveDiscountQuery>,
) -> Result<Response, ApiError> {
    if let Some(subtotal) = &query.subtotal {
        validate_money(subtotal).map_err(|e| ApiError::BadRequest {
            message: format!(
                "subtotal: {}",
                e.message.unwrap_or_else(|| "invalid amount".into())
            ),
        })?;
    }
    let active = state
        .services
        .promotions
        .list_active(
            query.at.unwrap_or_else(Utc::now),
            query.group_id.as_deref(),
            query.subtotal,
        )
        .await?;
    Ok(success_response(active))
}

pub async fn get_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(success_response(
        state.services.promotions.get_discount(id).await?,
    ))
}

pub async fn create_discount(
    State(state): State<AppState>,
    payload: Result<Json<CreateDiscount>, JsonRejection>,
) -> Result<Response, ApiError> {
    let discount = state
        .services
        .promotions
        .create_discount(json_body(payload)?)
        .await?;
    Ok(created_response(discount))
}

pub async fn update_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateDiscount>, JsonRejection>,
) -> Result<Response, ApiError> {
    let discount = state
        .services
        .promotions
        .update_discount(id, json_body(payload)?)
        .await?;
    Ok(success_response(discount))
}

pub async fn delete_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.promotions.delete_discount(id).await?;
    Ok(no_content_response())
}

pub fn discount_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/discounts", get(list_discounts))
        .route("/discounts/active", get(list_active_discounts))
        .route("/discounts/:id", get(get_discount))
        .with_auth();

    let write = Router::new()
        .route("/discounts", post(create_discount))
        .route(
            "/discounts/:id",
            patch(update_discount).delete(delete_discount),
        )
        .with_staff();

    read.merge(write)
}
