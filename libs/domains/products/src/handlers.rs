use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::{Query, QueryRejection};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use rust_decimal::Decimal;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    ProductDetails, ProductFilter, ProductListParams, ProductPayload, ProductResponse,
    TotalStockValue,
};
use crate::paging::{Page, PageRequest, Sort};
use crate::repository::ProductRepository;
use crate::service::ProductService;

pub const TAG: &str = "Products";

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        total_stock_value,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(ProductPayload, ProductResponse, TotalStockValue),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            BadRequestResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Inventory product endpoints")
    )
)]
pub struct ApiDoc;

/// Create the product router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/total-stock", get(total_stock_value))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

/// List products, optionally filtered by name fragment and exact category
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProductListParams),
    responses(
        (status = 200, description = "One page of products", body = Page<ProductResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    params: Result<Query<ProductListParams>, QueryRejection>,
) -> ProductResult<Json<Page<ProductResponse>>> {
    let Query(params) = params.map_err(|e| ProductError::Validation(e.to_string()))?;

    let filter = ProductFilter::new(params.name, params.category);
    let request = PageRequest::new(params.page, params.size, Sort::parse(&params.sort)?);

    let page = service.list_products(filter, request).await?;
    Ok(Json(page.map(ProductResponse::from)))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> ProductResult<impl IntoResponse> {
    let product = service
        .create_product(ProductDetails::try_from(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// Total value of the stock of active products
#[utoipa::path(
    get,
    path = "/total-stock",
    tag = TAG,
    responses(
        (status = 200, description = "Sum of price times stock quantity over active products", body = TotalStockValue),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn total_stock_value<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<TotalStockValue>> {
    let total_value = service.total_stock_value().await?.unwrap_or(Decimal::ZERO);
    Ok(Json(TotalStockValue { total_value }))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<ProductResponse>> {
    let product = service.get_product(id).await?;
    Ok(Json(product.into()))
}

/// Replace every field of a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> ProductResult<Json<ProductResponse>> {
    let product = service
        .update_product(id, ProductDetails::try_from(payload)?)
        .await?;
    Ok(Json(product.into()))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    IdPath(id): IdPath,
) -> ProductResult<StatusCode> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
