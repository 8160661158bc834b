use actix_web::http::header;
use actix_web::web::Bytes;
use actix_web::{HttpResponse, Responder, get, web};
use futures::stream::StreamExt;
use log::error;

use crate::dto::categories::CategoryDto;
use crate::dto::products::ProductDto;
use crate::forms::listing::DeliveryParams;
use crate::models::config::ServerConfig;
use crate::pipeline::DeliveryMode;
use crate::repository::DieselRepository;
use crate::services::categories::show_categories;
use crate::services::listing::{list_products, stream_products};
use crate::services::products::show_product;
use crate::services::{ServiceError, ServiceResult};

/// Every product with its name upper-cased.
#[get("/products")]
pub async fn api_products(repo: web::Data<DieselRepository>) -> impl Responder {
    match list_products(repo.into_inner()).await {
        Ok(products) => HttpResponse::Ok().json(
            products
                .into_iter()
                .map(ProductDto::from)
                .collect::<Vec<_>>(),
        ),
        Err(e) => {
            error!("Failed to list products: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn ndjson_lines(products: Vec<ProductDto>) -> ServiceResult<Bytes> {
    let mut buf = Vec::new();
    for product in &products {
        serde_json::to_writer(&mut buf, product).map_err(|e| {
            error!("Failed to serialize product {}: {e}", product.id);
            ServiceError::Internal
        })?;
        buf.push(b'\n');
    }
    Ok(Bytes::from(buf))
}

/// Newline-delimited JSON, one line per product, written batch by batch in
/// the requested delivery mode. Defaults to the immediate mode.
#[get("/products/stream")]
pub async fn api_products_stream(
    params: web::Query<DeliveryParams>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let defaults = server_config.delivery_defaults();
    let mode = match params
        .into_inner()
        .into_mode(DeliveryMode::Immediate, &defaults)
    {
        Ok(mode) => mode,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };

    let body = stream_products(repo.into_inner(), mode, server_config.chunk_size())
        .map(|batch| ndjson_lines(batch?.into_iter().map(ProductDto::from).collect()));

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/x-ndjson"))
        .streaming(body)
}

/// A single stored product, as stored (no projection).
#[get("/products/{product_id}")]
pub async fn api_product(
    product_id: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match show_product(&product_id, repo.get_ref()) {
        Ok(product) => HttpResponse::Ok().json(ProductDto::from(product)),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(e) => {
            error!("Failed to get product: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/categories")]
pub async fn api_categories(repo: web::Data<DieselRepository>) -> impl Responder {
    match show_categories(repo.get_ref()) {
        Ok(categories) => HttpResponse::Ok().json(
            categories
                .into_iter()
                .map(CategoryDto::from)
                .collect::<Vec<_>>(),
        ),
        Err(e) => {
            error!("Failed to list categories: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
