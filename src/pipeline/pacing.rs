use std::num::NonZeroUsize;
use std::time::Duration;

use futures::stream::{Stream, StreamExt};

use crate::pipeline::collect_batch;

/// Waits `delay` before making each upstream item available.
///
/// The next upstream item is not requested until the current delay elapsed
/// and the item was handed over, so a slow consumer throttles the producer.
pub fn delay_each<S>(upstream: S, delay: Duration) -> impl Stream<Item = S::Item>
where
    S: Stream,
{
    upstream.then(move |item| async move {
        tokio::time::sleep(delay).await;
        item
    })
}

/// Groups items into batches of `batch_size`; a batch is released only when it
/// is full or the upstream is exhausted.
pub fn batches<S>(upstream: S, batch_size: NonZeroUsize) -> impl Stream<Item = Vec<S::Item>>
where
    S: Stream,
{
    upstream.chunks(batch_size.get())
}

/// Interval pacing followed by batch pacing.
///
/// The `k`-th batch (1-based) is released no earlier than
/// `k * batch_size * delay` after the first poll.
pub fn paced<S, T, E>(
    upstream: S,
    batch_size: NonZeroUsize,
    delay: Duration,
) -> impl Stream<Item = Result<Vec<T>, E>>
where
    S: Stream<Item = Result<T, E>>,
{
    batches(delay_each(upstream, delay), batch_size).map(collect_batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::{self, TryStreamExt};
    use std::pin::pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    fn two() -> NonZeroUsize {
        NonZeroUsize::new(2).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn delays_every_item() {
        let start = Instant::now();
        let mut items = pin!(delay_each(stream::iter(1..=3), Duration::from_secs(1)));

        let mut seen = Vec::new();
        while let Some(item) = items.next().await {
            seen.push((item, start.elapsed()));
        }

        assert_eq!(seen.len(), 3);
        for (index, (item, elapsed)) in seen.into_iter().enumerate() {
            assert_eq!(item, index as u32 + 1);
            assert!(elapsed >= Duration::from_secs(index as u64 + 1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn batches_are_ordered_bounded_and_late_enough() {
        let delay = Duration::from_secs(1);
        let start = Instant::now();
        let mut out = pin!(paced(stream::iter((1..=5).map(Ok::<u32, ()>)), two(), delay));

        let mut released = Vec::new();
        while let Some(batch) = out.next().await {
            released.push((batch.unwrap(), start.elapsed()));
        }

        let flattened: Vec<u32> = released.iter().flat_map(|(b, _)| b.clone()).collect();
        assert_eq!(flattened, vec![1, 2, 3, 4, 5]);
        for (k, (batch, elapsed)) in released.iter().enumerate() {
            assert!(batch.len() <= 2);
            assert!(*elapsed >= delay * k as u32);
        }
        assert_eq!(released.last().unwrap().0, vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_pull_ahead_of_the_consumer() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let upstream = stream::iter((1..=10).map(Ok::<u32, ()>)).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut out = Box::pin(paced(upstream, two(), Duration::from_millis(10)));
        let first = out.next().await.unwrap().unwrap();
        assert_eq!(first, vec![1, 2]);
        assert_eq!(pulled.load(Ordering::SeqCst), 2);

        // Consumer goes away: the pending timer goes with the stream.
        drop(out);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(pulled.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_upstream_yields_nothing() {
        let out: Vec<Vec<u32>> = paced(stream::iter(Vec::<Result<u32, ()>>::new()), two(), Duration::from_secs(1))
            .try_collect()
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
