use futures::future::{self, Either, FutureExt};
use futures::stream::{self, Stream, TryStreamExt};

/// Replays a finite upstream `passes` times as one continuous sequence.
///
/// The upstream is drained once, on first poll, and the collected items are
/// replayed pass by pass in their original order. Zero passes yields an empty
/// sequence without ever polling the upstream. An upstream error ends the
/// sequence with that error.
pub fn replicate<S, T, E>(upstream: S, passes: usize) -> impl Stream<Item = Result<T, E>>
where
    S: Stream<Item = Result<T, E>>,
    T: Clone,
{
    if passes == 0 {
        return Either::Left(stream::empty::<Result<T, E>>());
    }

    let replayed = upstream
        .try_collect::<Vec<T>>()
        .map(move |collected| match collected {
            Ok(items) => Either::Left(stream::iter(
                std::iter::repeat_n(items, passes).flatten().map(Ok),
            )),
            Err(err) => Either::Right(stream::once(future::ready(Err(err)))),
        })
        .flatten_stream();

    Either::Right(replayed)
}
