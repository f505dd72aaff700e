//! Blocking producer → async consumer bridge.
//!
//! A producer closure runs on Tokio's blocking pool and pushes fragments into
//! a bounded `mpsc` channel with `blocking_send`: when the buffer is full the
//! worker thread parks until the consumer makes room. Nothing is dropped and
//! nothing spins.
//!
//! The consumer side is a [`FragmentStream`]. It yields fragments in
//! production order, then at most one terminal error, then ends. Dropping it
//! closes the channel and raises a stop flag; the worker notices on its next
//! send or before its next pull and drops the producer on its own thread.
//! A pull that is itself blocked (a stalled HTTP read, say) is not
//! interrupted: the worker only stops once that pull returns, at the latest
//! when the client's request timeout fires.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::errors::StreamError;

type Item = Result<String, StreamError>;

/// Runs `producer` on a dedicated blocking worker and streams its fragments.
///
/// `producer` is called on the worker, so opening the underlying generation
/// call does not block the caller either. Empty fragments are filtered out.
/// A failure (from `producer` itself or from any item) is delivered after the
/// fragments already buffered and ends the stream.
///
/// # Errors
/// - [`StreamError::InvalidCapacity`] if `capacity == 0`
/// - [`StreamError::NoRuntime`] outside a Tokio runtime
pub fn bridge<F, I>(capacity: usize, producer: F) -> Result<FragmentStream, StreamError>
where
    F: FnOnce() -> Result<I, StreamError> + Send + 'static,
    I: IntoIterator<Item = Item>,
{
    if capacity == 0 {
        return Err(StreamError::InvalidCapacity);
    }
    let handle = Handle::try_current().map_err(|_| StreamError::NoRuntime)?;

    let (tx, rx) = mpsc::channel::<Item>(capacity);
    let stop = Arc::new(AtomicBool::new(false));

    let worker = {
        let stop = Arc::clone(&stop);
        handle.spawn_blocking(move || run_producer(producer, tx, stop))
    };

    trace!(capacity, "bridge: producer worker spawned");

    Ok(FragmentStream {
        rx,
        worker: Some(worker),
        stop,
        cancelled: false,
    })
}

fn run_producer<F, I>(producer: F, tx: mpsc::Sender<Item>, stop: Arc<AtomicBool>)
where
    F: FnOnce() -> Result<I, StreamError>,
    I: IntoIterator<Item = Item>,
{
    let mut fragments = match producer() {
        Ok(it) => it.into_iter(),
        Err(e) => {
            warn!(error = %e, "bridge: producer failed to start");
            let _ = tx.blocking_send(Err(e));
            return;
        }
    };

    let mut sent = 0usize;
    loop {
        if stop.load(Ordering::Acquire) {
            debug!(sent, "bridge: consumer gone, stopping producer");
            return;
        }
        let Some(item) = fragments.next() else {
            debug!(sent, "bridge: producer finished");
            return;
        };
        match item {
            Ok(fragment) if fragment.is_empty() => continue,
            Ok(fragment) => {
                if tx.blocking_send(Ok(fragment)).is_err() {
                    debug!(sent, "bridge: consumer gone, stopping producer");
                    return;
                }
                sent += 1;
            }
            Err(e) => {
                warn!(error = %e, sent, "bridge: producer failed mid-stream");
                let _ = tx.blocking_send(Err(e));
                return;
            }
        }
    }
}

/// Ordered, non-empty text fragments from a bridged producer.
///
/// Implements [`futures::Stream`]; consume it with `StreamExt::next`.
#[derive(Debug)]
pub struct FragmentStream {
    rx: mpsc::Receiver<Item>,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    cancelled: bool,
}

impl FragmentStream {
    /// Stops the producer early. Buffered fragments are discarded and the
    /// stream ends.
    pub fn cancel(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.cancelled = true;
        self.rx.close();
        let mut discarded = 0usize;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        debug!(discarded, "bridge: stream cancelled");
    }
}

impl Stream for FragmentStream {
    type Item = Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cancelled {
            return Poll::Ready(None);
        }

        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(item)) => Poll::Ready(Some(item)),
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => {
                // The sender is gone; surface a worker panic once, then end.
                let Some(worker) = this.worker.as_mut() else {
                    return Poll::Ready(None);
                };
                match Pin::new(worker).poll(cx) {
                    Poll::Pending => Poll::Pending,
                    Poll::Ready(res) => {
                        this.worker = None;
                        match res {
                            Err(e) if e.is_panic() => {
                                warn!("bridge: producer worker panicked");
                                Poll::Ready(Some(Err(StreamError::WorkerPanicked)))
                            }
                            _ => Poll::Ready(None),
                        }
                    }
                }
            }
        }
    }
}

impl Drop for FragmentStream {
    fn drop(&mut self) {
        if self.worker.is_some() {
            trace!("bridge: stream dropped before completion");
        }
        self.stop.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn ok(items: &[&str]) -> Vec<Item> {
        items.iter().map(|s| Ok(s.to_string())).collect()
    }

    async fn drain(mut s: FragmentStream) -> (Vec<String>, Vec<StreamError>) {
        let mut out = Vec::new();
        let mut errs = Vec::new();
        while let Some(item) = s.next().await {
            match item {
                Ok(f) => out.push(f),
                Err(e) => errs.push(e),
            }
        }
        (out, errs)
    }

    /// Endless producer that counts pulls and flags when it is dropped.
    struct Endless {
        pulled: Arc<AtomicUsize>,
        dropped: Arc<AtomicBool>,
    }

    impl Iterator for Endless {
        type Item = Item;
        fn next(&mut self) -> Option<Item> {
            let n = self.pulled.fetch_add(1, Ordering::SeqCst);
            Some(Ok(format!("t{n}")))
        }
    }

    impl Drop for Endless {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    fn endless() -> (Endless, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let pulled = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicBool::new(false));
        (
            Endless {
                pulled: Arc::clone(&pulled),
                dropped: Arc::clone(&dropped),
            },
            pulled,
            dropped,
        )
    }

    async fn wait_for(flag: &AtomicBool) -> bool {
        for _ in 0..400 {
            if flag.load(Ordering::SeqCst) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn order_is_preserved_at_capacity_one() {
        let s = bridge(1, || Ok(ok(&["a", "b", "c"]))).unwrap();
        let (out, errs) = drain(s).await;
        assert_eq!(out, vec!["a", "b", "c"]);
        assert!(errs.is_empty());
    }

    #[tokio::test]
    async fn order_is_preserved_with_room_to_spare() {
        let s = bridge(8, || Ok(ok(&["a", "b", "c"]))).unwrap();
        let (out, _) = drain(s).await;
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn nothing_is_lost_under_backpressure() {
        let produced: Vec<String> = (0..500).map(|i| i.to_string()).collect();
        let expected = produced.clone();
        let s = bridge(2, move || Ok(produced.into_iter().map(Ok))).unwrap();

        let (out, errs) = drain(s).await;
        assert_eq!(out, expected);
        assert!(errs.is_empty());
    }

    #[tokio::test]
    async fn empty_fragments_are_filtered() {
        let s = bridge(4, || Ok(ok(&["", "a", "", "", "b", ""]))).unwrap();
        let (out, _) = drain(s).await;
        assert_eq!(out, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn producer_waits_when_buffer_is_full() {
        let (producer, pulled, _) = endless();
        let s = bridge(2, move || Ok(producer)).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        // two buffered + one parked in blocking_send
        assert!(pulled.load(Ordering::SeqCst) <= 3);
        drop(s);
    }

    #[tokio::test]
    async fn early_stop_terminates_producer() {
        let (producer, pulled, dropped) = endless();
        let mut s = bridge(1, move || Ok(producer)).unwrap();

        let first = s.next().await.unwrap().unwrap();
        assert_eq!(first, "t0");
        drop(s);

        assert!(wait_for(&dropped).await, "producer still running");
        let after = pulled.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(pulled.load(Ordering::SeqCst), after);
    }

    #[tokio::test]
    async fn cancel_stops_producer_and_ends_stream() {
        let (producer, _, dropped) = endless();
        let mut s = bridge(4, move || Ok(producer)).unwrap();

        assert!(s.next().await.is_some());
        s.cancel();
        assert!(wait_for(&dropped).await);
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn cancel_discards_buffered_fragments() {
        let done = Arc::new(AtomicBool::new(false));
        let finished = Arc::clone(&done);
        let mut s = bridge(8, move || {
            let items = ok(&["f0", "f1", "f2", "f3", "f4"]);
            Ok(items.into_iter().chain(std::iter::from_fn(move || {
                finished.store(true, Ordering::SeqCst);
                None
            })))
        })
        .unwrap();

        // all five fragments sit in the buffer
        assert!(wait_for(&done).await);
        s.cancel();
        assert!(s.next().await.is_none());
    }

    #[tokio::test]
    async fn mid_stream_failure_follows_buffered_fragments() {
        let s = bridge(8, || {
            Ok(vec![
                Ok("a".to_string()),
                Ok("b".to_string()),
                Err(StreamError::Generation("connection reset".into())),
                Ok("never".to_string()),
            ])
        })
        .unwrap();

        let (out, errs) = drain(s).await;
        assert_eq!(out, vec!["a", "b"]);
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], StreamError::Generation(_)));
    }

    #[tokio::test]
    async fn failure_to_start_is_the_only_item() {
        let s = bridge(1, || -> Result<Vec<Item>, StreamError> {
            Err(StreamError::Generation("401 unauthorized".into()))
        })
        .unwrap();

        let (out, errs) = drain(s).await;
        assert!(out.is_empty());
        assert_eq!(errs.len(), 1);
    }

    #[tokio::test]
    async fn worker_panic_surfaces_as_terminal_error() {
        struct PanicsAfterOne(bool);
        impl Iterator for PanicsAfterOne {
            type Item = Item;
            fn next(&mut self) -> Option<Item> {
                if self.0 {
                    panic!("producer blew up");
                }
                self.0 = true;
                Some(Ok("a".into()))
            }
        }

        let s = bridge(4, || Ok(PanicsAfterOne(false))).unwrap();
        let (out, errs) = drain(s).await;
        assert_eq!(out, vec!["a"]);
        assert!(matches!(errs.as_slice(), [StreamError::WorkerPanicked]));
    }

    #[tokio::test]
    async fn zero_capacity_is_rejected() {
        assert!(matches!(
            bridge(0, || Ok(ok(&["a"]))),
            Err(StreamError::InvalidCapacity)
        ));
    }

    #[test]
    fn requires_a_runtime() {
        assert!(matches!(
            bridge(1, || Ok(ok(&["a"]))),
            Err(StreamError::NoRuntime)
        ));
    }
}
