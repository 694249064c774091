//! Sequential step execution.
//!
//! This module provides the core orchestration engine:
//!
//! - [`StepDescriptor`] - A named async operation plus its display mappers
//! - [`RunContext`] - Results of the steps completed so far in one run
//! - [`StepExecutor`] - Runs a step list and streams [`Snapshot`]s
//! - [`StatusValue`] - Progress markup or a status message
//!
//! # Example
//!
//! ```no_run
//! use abstracta_assist::progress::HtmlProgressRenderer;
//! use abstracta_assist::steps::{mapper, RunContext, StepDescriptor, StepExecutor};
//! use futures_util::StreamExt;
//!
//! # async fn demo() -> abstracta_assist::Result<()> {
//! let executor = StepExecutor::<String, String>::builder()
//!     .step(
//!         StepDescriptor::from_fn("greet", "Greeting", |_ctx| {
//!             Box::pin(async { Ok("hello".to_string()) })
//!         })
//!         .with_display(vec![mapper(|ctx: &RunContext<String>| {
//!             Ok(ctx.require("greet")?.clone())
//!         })]),
//!     )
//!     .progress_renderer(HtmlProgressRenderer::new())
//!     .build()?;
//!
//! let mut stream = executor.execute();
//! while let Some(snapshot) = stream.next().await {
//!     let snapshot = snapshot?;
//!     println!("{:?}", snapshot.channels);
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod descriptor;
pub mod executor;
pub mod snapshot;

pub use context::{ContextError, RunContext};
pub use descriptor::{mapper, DisplayMapper, FnOperation, StepDescriptor, StepFuture, StepOperation};
pub use executor::{
    SnapshotStream, StepExecutor, StepExecutorBuilder, DEFAULT_FINAL_MESSAGE, DEFAULT_PACING,
};
pub use snapshot::{Snapshot, StatusValue};
