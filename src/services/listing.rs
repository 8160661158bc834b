//! Product listings delivered through the streaming pipeline.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::stream::{self, BoxStream, Stream, TryStreamExt};

use crate::domain::product::Product;
use crate::pipeline::{DeliveryMode, deliver};
use crate::repository::ProductReader;

use super::{ServiceError, ServiceResult};

const IMMEDIATE_CHUNK: NonZeroUsize = NonZeroUsize::new(256).unwrap();

/// Lazily reads every product from the store.
///
/// The query runs on the blocking pool on first poll only; dropping the
/// stream before that never touches the store.
pub fn product_source<R>(repo: Arc<R>) -> impl Stream<Item = ServiceResult<Product>> + Send + 'static
where
    R: ProductReader + Send + Sync + 'static,
{
    stream::once(async move {
        let listed = tokio::task::spawn_blocking(move || {
            repo.list_products().map_err(|e| {
                log::error!("Failed to list products: {e}");
                ServiceError::Internal
            })
        })
        .await;

        match listed {
            Ok(result) => result,
            Err(e) => {
                log::error!("Product listing task failed: {e}");
                Err(ServiceError::Internal)
            }
        }
    })
    .map_ok(|products| stream::iter(products.into_iter().map(Ok::<_, ServiceError>)))
    .try_flatten()
}

/// Streams the product listing in `mode`, one batch per item.
pub fn stream_products<R>(
    repo: Arc<R>,
    mode: DeliveryMode,
    chunk_size: NonZeroUsize,
) -> BoxStream<'static, ServiceResult<Vec<Product>>>
where
    R: ProductReader + Send + Sync + 'static,
{
    log::debug!("Streaming products with {mode:?}");
    deliver(product_source(repo), mode, chunk_size)
}

/// Collects the whole listing in `mode` into a single vector.
pub async fn collect_products<R>(repo: Arc<R>, mode: DeliveryMode) -> ServiceResult<Vec<Product>>
where
    R: ProductReader + Send + Sync + 'static,
{
    stream_products(repo, mode, IMMEDIATE_CHUNK).try_concat().await
}

/// Collects the immediate listing into a single vector.
pub async fn list_products<R>(repo: Arc<R>) -> ServiceResult<Vec<Product>>
where
    R: ProductReader + Send + Sync + 'static,
{
    collect_products(repo, DeliveryMode::Immediate).await
}
