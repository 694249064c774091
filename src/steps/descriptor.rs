//! Step definitions.
//!
//! A [`StepDescriptor`] pairs one asynchronous [`StepOperation`] with the
//! [`DisplayMapper`]s that turn the run context into UI channel values.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::context::RunContext;

/// Boxed future returned by closure-based step operations.
pub type StepFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Pure function deriving one display channel's value from the run context.
pub type DisplayMapper<T, D> = Arc<dyn Fn(&RunContext<T>) -> anyhow::Result<D> + Send + Sync>;

/// Wrap a closure as a [`DisplayMapper`].
pub fn mapper<T, D, F>(f: F) -> DisplayMapper<T, D>
where
    F: Fn(&RunContext<T>) -> anyhow::Result<D> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The unit of work behind a step.
///
/// Implementations read whatever earlier steps stored in the context and
/// return this step's result. Any error aborts the run.
#[async_trait]
pub trait StepOperation<T>: Send + Sync {
    /// Run the operation against the results of the preceding steps.
    async fn run(&self, context: &RunContext<T>) -> anyhow::Result<T>;
}

/// Adapter that lets a closure act as a [`StepOperation`].
pub struct FnOperation<F>(F);

#[async_trait]
impl<T, F> StepOperation<T> for FnOperation<F>
where
    T: Send + Sync,
    F: for<'a> Fn(&'a RunContext<T>) -> StepFuture<'a, T> + Send + Sync,
{
    async fn run(&self, context: &RunContext<T>) -> anyhow::Result<T> {
        (self.0)(context).await
    }
}

/// One named unit of work plus its display-mapping rules.
pub struct StepDescriptor<T, D> {
    /// Key under which the result is stored in the run context.
    pub key: String,
    /// Human-readable label used in progress display.
    pub name: String,
    pub(crate) operation: Arc<dyn StepOperation<T>>,
    pub(crate) display_mappers: Vec<DisplayMapper<T, D>>,
    pub(crate) pre_display_mappers: Option<Vec<DisplayMapper<T, D>>>,
}

impl<T: Send + Sync + 'static, D> StepDescriptor<T, D> {
    /// Create a step backed by a [`StepOperation`] implementation.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        operation: impl StepOperation<T> + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            operation: Arc::new(operation),
            display_mappers: Vec::new(),
            pre_display_mappers: None,
        }
    }

    /// Create a step backed by a closure returning a boxed future.
    ///
    /// ```
    /// use abstracta_assist::steps::{RunContext, StepDescriptor};
    ///
    /// let step: StepDescriptor<i32, String> = StepDescriptor::from_fn("answer", "Compute", |ctx| {
    ///     Box::pin(async move { Ok(ctx.len() as i32 + 41) })
    /// });
    /// assert_eq!(step.key, "answer");
    /// ```
    pub fn from_fn<F>(key: impl Into<String>, name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a RunContext<T>) -> StepFuture<'a, T> + Send + Sync + 'static,
    {
        Self::new(key, name, FnOperation(f))
    }
}

impl<T, D> StepDescriptor<T, D> {
    /// Mappers evaluated after the step succeeds, one per display channel.
    pub fn with_display(mut self, mappers: Vec<DisplayMapper<T, D>>) -> Self {
        self.display_mappers = mappers;
        self
    }

    /// Mappers evaluated right before the step runs.
    ///
    /// Without them the executor emits its clear-channel snapshot instead.
    pub fn with_pre_display(mut self, mappers: Vec<DisplayMapper<T, D>>) -> Self {
        self.pre_display_mappers = Some(mappers);
        self
    }

    /// Number of display channels this step maps to.
    pub fn channel_count(&self) -> usize {
        self.display_mappers.len()
    }
}

impl<T, D> fmt::Debug for StepDescriptor<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("display_mappers", &self.display_mappers.len())
            .field(
                "pre_display_mappers",
                &self.pre_display_mappers.as_ref().map(Vec::len),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(i32);

    #[async_trait]
    impl StepOperation<i32> for Constant {
        async fn run(&self, _context: &RunContext<i32>) -> anyhow::Result<i32> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn trait_operation_runs() {
        let step: StepDescriptor<i32, ()> = StepDescriptor::new("k", "Constant", Constant(7));
        let ctx = RunContext::new();
        assert_eq!(step.operation.run(&ctx).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn closure_operation_reads_context() {
        let step: StepDescriptor<i32, ()> = StepDescriptor::from_fn("sum", "Sum", |ctx| {
            Box::pin(async move {
                let a = *ctx.require("a")?;
                Ok(a + 1)
            })
        });
        let mut ctx = RunContext::new();
        ctx.insert("a", 10);
        assert_eq!(step.operation.run(&ctx).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn closure_operation_propagates_error() {
        let step: StepDescriptor<i32, ()> = StepDescriptor::from_fn("sum", "Sum", |ctx| {
            Box::pin(async move { Ok(*ctx.require("missing")?) })
        });
        let ctx = RunContext::new();
        assert!(step.operation.run(&ctx).await.is_err());
    }

    #[test]
    fn display_mappers_set_channel_count() {
        let step: StepDescriptor<i32, String> = StepDescriptor::new("k", "K", Constant(1))
            .with_display(vec![
                mapper(|_| Ok(String::new())),
                mapper(|ctx: &RunContext<i32>| Ok(ctx.len().to_string())),
            ]);
        assert_eq!(step.channel_count(), 2);
        assert!(step.pre_display_mappers.is_none());
    }

    #[test]
    fn debug_shows_key_and_counts() {
        let step: StepDescriptor<i32, String> = StepDescriptor::new("k", "Named", Constant(1))
            .with_pre_display(vec![mapper(|_| Ok(String::new()))]);
        let dbg = format!("{:?}", step);
        assert!(dbg.contains("Named"));
        assert!(dbg.contains("Some(1)"));
    }
}
