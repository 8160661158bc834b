//! Lazy delivery pipeline for product listings.
//!
//! Stages are plain [`futures::Stream`] adapters composed in a fixed order:
//! projection, then optional replication, then optional pacing. Nothing is
//! pulled from upstream before the consumer asks for it, and dropping the
//! assembled stream drops every pending timer and upstream future with it.

use std::num::NonZeroUsize;
use std::time::Duration;

use futures::stream::{BoxStream, Stream, StreamExt};

use crate::domain::product::Product;

pub mod pacing;
pub mod projection;
pub mod replication;

pub use pacing::{batches, delay_each, paced};
pub use projection::{upper_case_name, upper_case_names};
pub use replication::replicate;

/// How a listing is delivered to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Every projected record, flushed as soon as it is available.
    Immediate,
    /// The projected records replayed `count` times as one sequence.
    Replicated { count: usize },
    /// Batches of `batch_size` records, each record delayed by `delay`.
    Paced {
        batch_size: NonZeroUsize,
        delay: Duration,
    },
}

/// Assembles the pipeline for `mode` on top of `upstream`.
///
/// Items are batches: `chunk_size` bounds how many ready records are flushed
/// together for the unpaced modes, while the paced mode always yields full
/// `batch_size` batches except for the last one.
pub fn deliver<S, E>(
    upstream: S,
    mode: DeliveryMode,
    chunk_size: NonZeroUsize,
) -> BoxStream<'static, Result<Vec<Product>, E>>
where
    S: Stream<Item = Result<Product, E>> + Send + 'static,
    E: Send + 'static,
{
    let projected = upper_case_names(upstream);
    match mode {
        DeliveryMode::Immediate => projected
            .ready_chunks(chunk_size.get())
            .map(collect_batch)
            .boxed(),
        DeliveryMode::Replicated { count } => replicate(projected, count)
            .ready_chunks(chunk_size.get())
            .map(collect_batch)
            .boxed(),
        DeliveryMode::Paced { batch_size, delay } => paced(projected, batch_size, delay).boxed(),
    }
}

/// Turns a batch of results into a result of a batch, stopping at the first error.
pub(crate) fn collect_batch<T, E>(batch: Vec<Result<T, E>>) -> Result<Vec<T>, E> {
    batch.into_iter().collect()
}
