use super::common::{
    created_response, json_body, no_content_response, success_response, PaginatedResponse,
    PaginationParams,
};
use crate::{
    auth::AuthRouterExt,
    entities::order::OrderState,
    errors::ApiError,
    services::orders::{CreateItemSold, CreateOrder, CreateTransaction, OrderDetail, UpdateOrder},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OrderListQuery {
    #[serde(default = "first_page")]
    pub page: u64,
    pub per_page: Option<u64>,
    pub state: Option<OrderState>,
}

fn first_page() -> u64 {
    1
}

// ---- orders ----

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&PaginationParams {
        page: query.page,
        per_page: query.per_page,
    });
    let orders = state
        .services
        .orders
        .list_orders(query.state, page, per_page)
        .await?;
    let total = orders.total;
    let details = orders
        .items
        .into_iter()
        .map(OrderDetail::from_model)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(success_response(PaginatedResponse::new(
        details, page, per_page, total,
    )))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let order = state.services.orders.get_order(id).await?;
    Ok(success_response(OrderDetail::from_model(order)?))
}

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrder>, JsonRejection>,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .orders
        .create_order(json_body(payload)?)
        .await?;
    Ok(created_response(OrderDetail::from_model(order)?))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateOrder>, JsonRejection>,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .orders
        .update_order(id, json_body(payload)?)
        .await?;
    Ok(success_response(OrderDetail::from_model(order)?))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.orders.delete_order(id).await?;
    Ok(no_content_response())
}

pub async fn list_order_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let transactions = state
        .services
        .orders
        .list_order_transactions(id, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        transactions,
        page,
        per_page,
    )))
}

pub async fn list_order_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let items = state
        .services
        .orders
        .list_order_items(id, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        items, page, per_page,
    )))
}

// ---- transactions ----

pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransaction>, JsonRejection>,
) -> Result<Response, ApiError> {
    let transaction = state
        .services
        .orders
        .create_transaction(json_body(payload)?)
        .await?;
    Ok(created_response(transaction))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(success_response(
        state.services.orders.get_transaction(id).await?,
    ))
}

// ---- items sold ----

pub async fn create_item_sold(
    State(state): State<AppState>,
    payload: Result<Json<CreateItemSold>, JsonRejection>,
) -> Result<Response, ApiError> {
    let item = state
        .services
        .orders
        .create_item_sold(json_body(payload)?)
        .await?;
    Ok(created_response(item))
}

pub async fn get_item_sold(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(success_response(
        state.services.orders.get_item_sold(id).await?,
    ))
}

pub async fn delete_item_sold(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.orders.delete_item_sold(id).await?;
    Ok(no_content_response())
}

/// Orders are rung up by any signed-in cashier; deletes are staff only.
pub fn order_routes() -> Router<AppState> {
    let register = Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order).patch(update_order))
        .route("/orders/:id/transactions", get(list_order_transactions))
        .route("/orders/:id/items", get(list_order_items))
        .route("/transactions", post(create_transaction))
        .route("/transactions/:id", get(get_transaction))
        .route("/items-sold", post(create_item_sold))
        .route("/items-sold/:id", get(get_item_sold))
        .with_auth();

    let staff = Router::new()
        .route("/orders/:id", delete(delete_order))
        .route("/items-sold/:id", delete(delete_item_sold))
        .with_staff();

    register.merge(staff)
}
