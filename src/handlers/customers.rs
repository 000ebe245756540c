use super::common::{
    created_response, json_body, no_content_response, success_response, PaginatedResponse,
    PaginationParams,
};
use crate::{
    auth::AuthRouterExt,
    errors::ApiError,
    services::customers::{CreateCustomer, CustomerFilter, UpdateCustomer},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CustomerListQuery {
    #[serde(default = "first_page")]
    pub page: u64,
    pub per_page: Option<u64>,
    /// Case-insensitive match on names, company, email and phone
    pub search: Option<String>,
    pub group_id: Option<String>,
}

fn first_page() -> u64 {
    1
}

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&PaginationParams {
        page: query.page,
        per_page: query.per_page,
    });
    let filter = CustomerFilter {
        search: query.search,
        group_id: query.group_id,
    };
    let customers = state
        .services
        .customers
        .list_customers(filter, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        customers, page, per_page,
    )))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(success_response(
        state.services.customers.get_customer(id).await?,
    ))
}

async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CreateCustomer>, JsonRejection>,
) -> Result<Response, ApiError> {
    let customer = state
        .services
        .customers
        .create_customer(json_body(payload)?)
        .await?;
    Ok(created_response(customer))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCustomer>, JsonRejection>,
) -> Result<Response, ApiError> {
    let customer = state
        .services
        .customers
        .update_customer(id, json_body(payload)?)
        .await?;
    Ok(success_response(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.customers.delete_customer(id).await?;
    Ok(no_content_response())
}

pub fn customer_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/customers", get(list_customers))
        .route("/customers/:id", get(get_customer))
        .with_auth();

    let write = Router::new()
        .route("/customers", post(create_customer))
        .route(
            "/customers/:id",
            patch(update_customer).delete(delete_customer),
        )
        .with_staff();

    read.merge(write)
}
