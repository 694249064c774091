//! Snapshot consumers.
//!
//! This module provides:
//! - [`SnapshotView`] trait for anything that displays a run
//! - [`TerminalView`] for interactive terminal usage
//! - [`RecordingView`] for tests
//! - [`drive`], the loop that feeds a run into a view
//!
//! # Example
//!
//! ```
//! use abstracta_assist::steps::{mapper, RunContext, StepDescriptor, StepExecutor};
//! use abstracta_assist::ui::{drive, RecordingView};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> abstracta_assist::Result<()> {
//! let executor = StepExecutor::<i32, i32>::builder()
//!     .step(
//!         StepDescriptor::<i32, i32>::from_fn("one", "One", |_| Box::pin(async { Ok(1) }))
//!             .with_display(vec![mapper(|ctx: &RunContext<i32>| Ok(*ctx.require("one")?))]),
//!     )
//!     .pacing(Duration::ZERO)
//!     .build()?;
//!
//! let mut view = RecordingView::new();
//! let emitted = drive(executor.execute(), &mut view).await?;
//! assert_eq!(emitted, 3);
//! assert_eq!(view.snapshots()[1].channels, vec![1]);
//! # Ok(())
//! # }
//! ```

mod recording;
mod terminal;

pub use recording::RecordingView;
pub use terminal::TerminalView;

use futures_util::StreamExt;
use tracing::debug;

use crate::error::{AssistError, Result};
use crate::steps::{Snapshot, SnapshotStream};

/// Something that displays the snapshots of a run.
///
/// This trait allows swapping the terminal for a recorder in tests.
pub trait SnapshotView<D> {
    /// Show one snapshot.
    fn apply(&mut self, snapshot: &Snapshot<D>) -> Result<()>;

    /// Show the error that ended the run.
    fn show_error(&mut self, error: &AssistError);
}

/// Feed every snapshot of `stream` into `view`.
///
/// This is the failure boundary of a run: the first error is shown on the
/// view and then returned. Returns the number of snapshots applied.
pub async fn drive<D>(mut stream: SnapshotStream<D>, view: &mut impl SnapshotView<D>) -> Result<usize> {
    let mut applied = 0;
    while let Some(item) = stream.next().await {
        match item {
            Ok(snapshot) => {
                view.apply(&snapshot)?;
                applied += 1;
            }
            Err(error) => {
                view.show_error(&error);
                return Err(error);
            }
        }
    }
    debug!("Run finished after {} snapshots", applied);
    Ok(applied)
}
