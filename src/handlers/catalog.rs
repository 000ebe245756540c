use super::common::{
    created_response, json_body, no_content_response, success_response, PaginatedResponse,
    PaginationParams,
};
use crate::{
    auth::AuthRouterExt,
    errors::ApiError,
    services::catalog::{
        CreateCategory, CreateProduct, CreateVariation, UpdateCategory, UpdateProduct,
        UpdateVariation,
    },
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

// ---- categories ----

pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let categories = state
        .services
        .catalog
        .list_categories(page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        categories, page, per_page,
    )))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let category = state.services.catalog.get_category(id).await?;
    Ok(success_response(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CreateCategory>, JsonRejection>,
) -> Result<Response, ApiError> {
    let category = state
        .services
        .catalog
        .create_category(json_body(payload)?)
        .await?;
    Ok(created_response(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateCategory>, JsonRejection>,
) -> Result<Response, ApiError> {
    let category = state
        .services
        .catalog
        .update_category(id, json_body(payload)?)
        .await?;
    Ok(success_response(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.catalog.delete_category(id).await?;
    Ok(no_content_response())
}

pub async fn list_category_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let products = state
        .services
        .catalog
        .list_category_products(id, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        products, page, per_page,
    )))
}

// ---- products ----

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let products = state.services.catalog.list_products(page, per_page).await?;
    Ok(success_response(PaginatedResponse::from_page(
        products, page, per_page,
    )))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let product = state.services.catalog.get_product(id).await?;
    Ok(success_response(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let product = state
        .services
        .catalog
        .create_product(json_body(payload)?)
        .await?;
    Ok(created_response(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let product = state
        .services
        .catalog
        .update_product(id, json_body(payload)?)
        .await?;
    Ok(success_response(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.catalog.delete_product(id).await?;
    Ok(no_content_response())
}

pub async fn list_product_variations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let (page, per_page) = state.page_bounds(&params);
    let variations = state
        .services
        .catalog
        .list_product_variations(id, page, per_page)
        .await?;
    Ok(success_response(PaginatedResponse::from_page(
        variations, page, per_page,
    )))
}

// ---- variations ----

pub async fn get_variation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let variation = state.services.catalog.get_variation(id).await?;
    Ok(success_response(variation))
}

pub async fn create_variation(
    State(state): State<AppState>,
    payload: Result<Json<CreateVariation>, JsonRejection>,
) -> Result<Response, ApiError> {
    let variation = state
        .services
        .catalog
        .create_variation(json_body(payload)?)
        .await?;
    Ok(created_response(variation))
}

pub async fn update_variation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateVariation>, JsonRejection>,
) -> Result<Response, ApiError> {
    let variation = state
        .services
        .catalog
        .update_variation(id, json_body(payload)?)
        .await?;
    Ok(success_response(variation))
}

pub async fn delete_variation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.services.catalog.delete_variation(id).await?;
    Ok(no_content_response())
}

pub fn catalog_routes() -> Router<AppState> {
    let read = Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
        .route("/categories/:id/products", get(list_category_products))
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id/variations", get(list_product_variations))
        .route("/variations/:id", get(get_variation))
        .with_auth();

    let write = Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/:id",
            patch(update_category).delete(delete_category),
        )
        .route("/products", post(create_product))
        .route("/products/:id", patch(update_product).delete(delete_product))
        .route("/variations", post(create_variation))
        .route(
            "/variations/:id",
            patch(update_variation).delete(delete_variation),
        )
        .with_staff();

    read.merge(write)
}
