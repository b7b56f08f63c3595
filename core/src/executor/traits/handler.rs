use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::dataset::Row;

/// Per-row operation applied by the batch runner.
///
/// Implementations may be invoked concurrently for different rows. An `Err`
/// marks that row as failed; it is counted and reported, never retried.
#[async_trait]
pub trait RowHandler: Send + Sync {
    async fn handle(&self, row: &Row) -> anyhow::Result<()>;
}

#[async_trait]
impl<H: RowHandler + ?Sized> RowHandler for Arc<H> {
    async fn handle(&self, row: &Row) -> anyhow::Result<()> {
        (**self).handle(row).await
    }
}

#[async_trait]
impl<H: RowHandler + ?Sized> RowHandler for Box<H> {
    async fn handle(&self, row: &Row) -> anyhow::Result<()> {
        (**self).handle(row).await
    }
}

/// Closure adapter returned by [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

/// Wrap a closure as a [`RowHandler`].
///
/// ```
/// use rowflow_core::executor::handler_fn;
/// use rowflow_core::Row;
///
/// let handler = handler_fn(|row: &Row| {
///     let index = row.index();
///     async move {
///         anyhow::ensure!(index % 2 == 0, "odd row {index}");
///         Ok(())
///     }
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(&Row) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RowHandler for FnHandler<F>
where
    F: Fn(&Row) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn handle(&self, row: &Row) -> anyhow::Result<()> {
        (self.f)(row).await
    }
}
