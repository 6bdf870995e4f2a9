//! HTTP handlers for Products API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::{
        handlers::method_not_allowed,
        responses::{BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse},
    },
    ErrorResponse, ValidatedJson, ValidatedQuery,
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::warn;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{LimitQuery, MinMax, ProductDto};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        add_product,
        stream_products,
        sorted_products,
        recent_products,
        modified_products,
        group_by_price,
        min_max_products,
        cheap_products,
        last_products,
        count_products,
        get_product,
        delete_product,
    ),
    components(
        schemas(ProductDto, MinMax),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog and derived views")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(add_product))
        .route("/stream", get(stream_products))
        .route("/sorted", get(sorted_products))
        .route("/recent", get(recent_products))
        .route("/modified", get(modified_products))
        .route("/groupByPrice", get(group_by_price))
        .route("/minMax", get(min_max_products))
        .route("/cheap", get(cheap_products))
        .route("/last", get(last_products))
        .route("/count", get(count_products))
        .route("/{id}", get(get_product).delete(delete_product))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(shared_service)
}

/// List all products, or the default sample set when the catalog is empty
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<ProductDto>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<ProductDto>>> {
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Add a product
///
/// Any `id` in the body is ignored; the store assigns one.
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = ProductDto,
    responses(
        (status = 201, description = "Product added", body = ProductDto),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<ProductDto>,
) -> ProductResult<impl IntoResponse> {
    let product = service.add_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Stream all products as server-sent events
///
/// One `product` event per product. The default sample set, when served, is
/// paced by the configured emit delay.
#[utoipa::path(
    get,
    path = "/stream",
    tag = "Products",
    responses(
        (status = 200, description = "Event stream of products", content_type = "text/event-stream", body = ProductDto)
    )
)]
async fn stream_products<R: ProductRepository + 'static>(
    State(service): State<Arc<ProductService<R>>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        let mut products = std::pin::pin!(service.stream_products());
        while let Some(product) = products.next().await {
            match Event::default().event("product").json_data(&product) {
                Ok(event) => yield Ok(event),
                Err(e) => warn!(product_id = %product.id, error = %e, "Failed to encode product event"),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Products ordered by ascending price
#[utoipa::path(
    get,
    path = "/sorted",
    tag = "Products",
    responses(
        (status = 200, description = "Products by ascending price", body = Vec<ProductDto>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn sorted_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<ProductDto>>> {
    let products = service.sorted_products().await?;
    Ok(Json(products))
}

/// Recently added products
#[utoipa::path(
    get,
    path = "/recent",
    tag = "Products",
    params(LimitQuery),
    responses(
        (status = 200, description = "Recently added products", body = Vec<ProductDto>),
        (status = 400, description = "Malformed limit", body = ErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn recent_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> ProductResult<Json<Vec<ProductDto>>> {
    let products = service.recent_products(query.limit).await?;
    Ok(Json(products))
}

/// Added products, most recent first
#[utoipa::path(
    get,
    path = "/modified",
    tag = "Products",
    params(LimitQuery),
    responses(
        (status = 200, description = "Modification history", body = Vec<ProductDto>),
        (status = 400, description = "Malformed limit", body = ErrorResponse)
    )
)]
async fn modified_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> Json<Vec<ProductDto>> {
    Json(service.modified_products(query.limit).await)
}

/// Products grouped by exact price
///
/// Keys are prices rendered with a decimal point, e.g. `"120.0"`.
#[utoipa::path(
    get,
    path = "/groupByPrice",
    tag = "Products",
    responses(
        (status = 200, description = "Products keyed by price", body = std::collections::HashMap<String, Vec<ProductDto>>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn group_by_price<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<impl IntoResponse> {
    let groups = service.group_by_price().await?;
    Ok(Json(groups))
}

/// Cheapest and most expensive products
#[utoipa::path(
    get,
    path = "/minMax",
    tag = "Products",
    responses(
        (status = 200, description = "Cheapest and most expensive product", body = MinMax),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn min_max_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<MinMax>> {
    let min_max = service.min_max_products().await?;
    Ok(Json(min_max))
}

/// Products priced below 20
#[utoipa::path(
    get,
    path = "/cheap",
    tag = "Products",
    responses(
        (status = 200, description = "Cheap products", body = Vec<ProductDto>)
    )
)]
async fn cheap_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> Json<Vec<ProductDto>> {
    Json(service.cheap_products().await)
}

/// First three products in store order
#[utoipa::path(
    get,
    path = "/last",
    tag = "Products",
    responses(
        (status = 200, description = "First three products", body = Vec<ProductDto>)
    )
)]
async fn last_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> Json<Vec<ProductDto>> {
    Json(service.last_products().await)
}

/// Count stored products
#[utoipa::path(
    get,
    path = "/count",
    tag = "Products",
    responses(
        (status = 200, description = "Product count", body = u64)
    )
)]
async fn count_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> Json<u64> {
    Json(service.count_products().await)
}

/// Get a product by ID
///
/// Unknown or malformed ids return a placeholder product named
/// `"not found"` with price 0, not an error.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product, or the not-found placeholder", body = ProductDto)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<String>,
) -> Json<ProductDto> {
    Json(service.get_product(&id).await)
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted, or nothing to delete")
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<String>,
) -> StatusCode {
    service.delete_product(&id).await;
    StatusCode::NO_CONTENT
}
