use super::common::{
    created_response, json_body, no_content_response, success_response, PaginatedResponse,
    PaginationParams,
};
use crate::{
    auth::AuthRouterExt,
    errors::ApiError,
    services::directory::{CreateEmployee, CreateLocation, UpdateEmployee, UpdateLocation},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

pub async fn list_locations(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let locations = state
        .services
        .directory
        .list_locations(page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        locations, page, per_page,
    )))
}

pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(success_response(
        state.services.directory.get_location(id).await?,
    ))
}

pub async fn create_location(
    State(state): State<AppState>,
    payload: Result<Json<CreateLocation>, JsonRejection>,
) -> Result<Response, ApiError> {
    let location = state
        .services
        .directory
        .create_location(json_body(payload)?)
        .await?;
    Ok(created_response(location))
}

pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateLocation>, JsonRejection>,
) -> Result<Response, ApiError> {
    let location = state
        .services
        .directory
        .update_location(id, json_body(payload)?)
        .await?;
    Ok(success_response(location))
}

pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.directory.delete_location(id).await?;
    Ok(no_content_response())
}

pub async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let employees = state
        .services
        .directory
        .list_employees(page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        employees, page, per_page,
    )))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(success_response(
        state.services.directory.get_employee(id).await?,
    ))
}

pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployee>, JsonRejection>,
) -> Result<Response, ApiError> {
    let employee = state
        .services
        .directory
        .create_employee(json_body(payload)?)
        .await?;
    Ok(created_response(employee))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateEmployee>, JsonRejection>,
) -> Result<Response, ApiError> {
    let employee = state
        .services
        .directory
        .update_employee(id, json_body(payload)?)
        .await?;
    Ok(success_response(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.directory.delete_employee(id).await?;
    Ok(no_content_response())
}

pub fn directory_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/locations", get(list_locations))
        .route("/locations/:id", get(get_location))
        .route("/employees", get(list_employees))
        .route("/employees/:id", get(get_employee))
        .with_auth();

    let write = Router::new()
        .route("/locations", post(create_location))
        .route(
            "/locations/:id",
            patch(update_location).delete(delete_location),
        )
        .route("/employees", post(create_employee))
        .route(
            "/employees/:id",
            patch(update_employee).delete(delete_employee),
        )
        .with_staff();

    read.merge(write)
}
