//! In-flight image resolutions.
//!
//! Each accepted file resolves on its own task and reports back over a
//! channel; the session drains completions and inserts them into whatever
//! the document looks like at that moment. Completion order is arbitrary.

use crate::images::{ImageCompletion, ImageError, ImageFile, ImageResolver};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::{FutureExt, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
#[cfg(feature = "async")]
use tracing::debug;
use tracing::{trace, warn};

pub struct ImageLoader {
    sender: UnboundedSender<ImageCompletion>,
    receiver: UnboundedReceiver<ImageCompletion>,
    in_flight: usize,
}

impl ImageLoader {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Starts resolving `file`. On the tokio runtime the work runs as a
    /// spawned task; without one it resolves before returning. Every spawn
    /// produces exactly one completion, a panicking resolver included.
    pub fn spawn(&mut self, resolver: Arc<dyn ImageResolver>, file: ImageFile) {
        let name = file.name.clone();
        let sender = self.sender.clone();
        let task = async move {
            let result = match AssertUnwindSafe(async { resolver.resolve(file).await }).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    warn!(name = %name, "image resolver panicked");
                    Err(ImageError::ReadFailed {
                        name: name.clone(),
                        reason: panic_reason(panic.as_ref()),
                    })
                }
            };
            trace!(name = %name, ok = result.is_ok(), "image resolved");
            // The receiver only goes away with the loader itself
            let _ = sender.unbounded_send(ImageCompletion { name, result });
        };
        self.in_flight += 1;
        run(task);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// A finished resolution, without waiting.
    pub fn try_next(&mut self) -> Option<ImageCompletion> {
        match self.receiver.try_recv() {
            Ok(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(completion)
            }
            _ => None,
        }
    }

    /// Waits for the next resolution. `None` once nothing is in flight.
    pub async fn next(&mut self) -> Option<ImageCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.receiver.next().await?;
        self.in_flight -= 1;
        Some(completion)
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "resolver panicked".to_string())
}

#[cfg(feature = "async")]
fn run<F>(task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => {
            debug!("no async runtime; resolving inline");
            futures::executor::block_on(task);
        }
    }
}

#[cfg(not(feature = "async"))]
fn run<F: Future<Output = ()>>(task: F) {
    futures::executor::block_on(task);
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader").field("in_flight", &self.in_flight).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::{DataUrlResolver, ImageError};

    #[test]
    fn test_inline_resolution_without_runtime() {
        let mut loader = ImageLoader::new();
        loader.spawn(Arc::new(DataUrlResolver), ImageFile::new("a.png", "image/png", vec![1]));
        loader.spawn(Arc::new(DataUrlResolver), ImageFile::new("b.png", "image/png", vec![]));
        assert_eq!(loader.in_flight(), 2);

        let first = loader.try_next().unwrap();
        assert_eq!(first.result, Ok("data:image/png;base64,AQ==".to_string()));
        let second = loader.try_next().unwrap();
        assert!(matches!(second.result, Err(ImageError::ReadFailed { .. })));
        assert_eq!(loader.in_flight(), 0);
        assert!(loader.try_next().is_none());
    }

    struct PanickingResolver;

    impl ImageResolver for PanickingResolver {
        fn resolve(&self, _file: ImageFile) -> futures::future::BoxFuture<'static, Result<String, ImageError>> {
            futures::future::lazy(|_| -> Result<String, ImageError> { panic!("decoder crashed") }).boxed()
        }
    }

    #[test]
    fn test_panicking_resolver_still_completes() {
        let mut loader = ImageLoader::new();
        loader.spawn(Arc::new(PanickingResolver), ImageFile::new("a.png", "image/png", vec![1]));
        let completion = loader.try_next().unwrap();
        assert_eq!(
            completion.result,
            Err(ImageError::ReadFailed {
                name: "a.png".to_string(),
                reason: "decoder crashed".to_string(),
            })
        );
        assert_eq!(loader.in_flight(), 0);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_spawned_resolution() {
        let mut loader = ImageLoader::new();
        loader.spawn(Arc::new(DataUrlResolver), ImageFile::new("a.png", "image/png", vec![1, 2]));
        let completion = loader.next().await.unwrap();
        assert_eq!(completion.name, "a.png");
        assert!(completion.result.is_ok());
        assert!(loader.next().await.is_none());
    }
}
