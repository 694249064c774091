//! Step execution engine.
//!
//! Runs an ordered list of [`StepDescriptor`]s against one [`RunContext`] and
//! produces a lazy stream of [`Snapshot`]s: an optional initial snapshot, a
//! "pre" and a "post" snapshot per step, then a final snapshot.

use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, Stream};
use tracing::{debug, error, info};

use crate::error::{AssistError, Result};
use crate::progress::ProgressRenderer;

use super::context::RunContext;
use super::descriptor::{DisplayMapper, StepDescriptor};
use super::snapshot::{Snapshot, StatusValue};

/// Pause applied between two emitted snapshots unless configured otherwise.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Status message of the default final snapshot.
pub const DEFAULT_FINAL_MESSAGE: &str = "Process completed successfully.";

/// Forward-only sequence of snapshots produced by one run.
///
/// The stream ends after the final snapshot, or right after the first error.
pub type SnapshotStream<D> = Pin<Box<dyn Stream<Item = Result<Snapshot<D>>> + Send>>;

/// Immutable description of a run, shared by every `execute` call.
struct RunPlan<T, D> {
    steps: Vec<StepDescriptor<T, D>>,
    step_names: Vec<String>,
    initial: Option<Snapshot<D>>,
    final_snapshot: Option<Snapshot<D>>,
    final_message: String,
    clear_channels: Vec<D>,
    renderer: Option<Arc<dyn ProgressRenderer>>,
    pacing: Duration,
}

impl<T, D> RunPlan<T, D> {
    fn first_step_phase(&self) -> Phase {
        if self.steps.is_empty() {
            Phase::Final
        } else {
            Phase::Pending(0)
        }
    }

    fn progress(&self, index: usize, animate: bool) -> StatusValue {
        let markup = match &self.renderer {
            Some(renderer) => renderer.render(&self.step_names, index, animate),
            None => String::new(),
        };
        StatusValue::Progress(markup)
    }
}

/// Runs a fixed step list, one fresh [`RunContext`] per [`execute`](Self::execute) call.
///
/// # Example
///
/// ```
/// use abstracta_assist::steps::{mapper, RunContext, StepDescriptor, StepExecutor};
/// use futures_util::TryStreamExt;
/// use std::time::Duration;
///
/// # tokio_test_block(async {
/// let executor = StepExecutor::<i64, String>::builder()
///     .step(
///         StepDescriptor::<i64, String>::from_fn("answer", "Compute answer", |_ctx| {
///             Box::pin(async { Ok(42) })
///         })
///         .with_display(vec![mapper(|ctx: &RunContext<i64>| Ok(ctx.require("answer")?.to_string()))]),
///     )
///     .pacing(Duration::ZERO)
///     .build()
///     .unwrap();
///
/// let snapshots: Vec<_> = executor.execute().try_collect().await.unwrap();
/// assert_eq!(snapshots.len(), 3);
/// assert_eq!(snapshots[1].channels, vec!["42".to_string()]);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
pub struct StepExecutor<T, D> {
    plan: Arc<RunPlan<T, D>>,
}

impl<T, D> Clone for StepExecutor<T, D> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
        }
    }
}

impl<T, D> StepExecutor<T, D> {
    /// Start configuring an executor.
    pub fn builder() -> StepExecutorBuilder<T, D> {
        StepExecutorBuilder::new()
    }

    /// Names of the steps, in execution order.
    pub fn step_names(&self) -> &[String] {
        &self.plan.step_names
    }

    /// Number of display channels every snapshot carries.
    pub fn channel_count(&self) -> usize {
        self.plan.clear_channels.len()
    }

    /// Pause applied between emitted snapshots.
    pub fn pacing(&self) -> Duration {
        self.plan.pacing
    }
}

impl<T, D> StepExecutor<T, D>
where
    T: Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    /// Start a new run.
    ///
    /// Nothing happens until the returned stream is polled. Each call owns a
    /// new, empty context, so concurrent runs never observe each other.
    pub fn execute(&self) -> SnapshotStream<D> {
        let state = RunState {
            plan: Arc::clone(&self.plan),
            context: RunContext::new(),
            phase: Phase::NotStarted,
            emitted: false,
        };

        Box::pin(stream::try_unfold(state, |mut state| async move {
            match state.advance().await? {
                Some(snapshot) => Ok(Some((snapshot, state))),
                None => Ok(None),
            }
        }))
    }
}

/// Position of a run in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    Initial,
    /// About to emit the "pre" snapshot of step `i`.
    Pending(usize),
    /// About to run step `i` and emit its "post" snapshot.
    Running(usize),
    Final,
    Finished,
}

struct RunState<T, D> {
    plan: Arc<RunPlan<T, D>>,
    context: RunContext<T>,
    phase: Phase,
    emitted: bool,
}

impl<T, D> RunState<T, D>
where
    T: Send + Sync,
    D: Clone,
{
    async fn pace(&self) {
        if self.emitted && !self.plan.pacing.is_zero() {
            tokio::time::sleep(self.plan.pacing).await;
        }
    }

    /// Produce the next snapshot, or `None` once the run is over.
    async fn advance(&mut self) -> Result<Option<Snapshot<D>>> {
        let plan = Arc::clone(&self.plan);
        let total = plan.steps.len();

        loop {
            let snapshot = match self.phase {
                Phase::NotStarted => {
                    info!("Starting step run with {} steps", total);
                    self.phase = Phase::Initial;
                    continue;
                }
                Phase::Initial => {
                    self.phase = plan.first_step_phase();
                    match &plan.initial {
                        Some(initial) => {
                            debug!("Emitting initial snapshot");
                            initial.clone()
                        }
                        None => continue,
                    }
                }
                Phase::Pending(i) => {
                    self.pace().await;
                    let step = &plan.steps[i];
                    info!("Starting step {}/{}: {}", i + 1, total, step.name);

                    let channels = match &step.pre_display_mappers {
                        Some(mappers) => evaluate(&step.name, mappers, &self.context)?,
                        None => plan.clear_channels.clone(),
                    };
                    self.phase = Phase::Running(i);
                    Snapshot::new(plan.progress(i, true), channels)
                }
                Phase::Running(i) => {
                    self.pace().await;
                    let step = &plan.steps[i];

                    let result = match step.operation.run(&self.context).await {
                        Ok(result) => result,
                        Err(source) => {
                            error!("Error in step '{}': {:#}", step.name, source);
                            self.phase = Phase::Finished;
                            return Err(AssistError::StepFailed {
                                step: step.name.clone(),
                                source,
                            });
                        }
                    };
                    info!("Completed step '{}' successfully", step.name);
                    self.context.insert(&step.key, result);

                    let channels = evaluate(&step.name, &step.display_mappers, &self.context)?;
                    self.phase = if i + 1 < total {
                        Phase::Pending(i + 1)
                    } else {
                        Phase::Final
                    };
                    Snapshot::new(plan.progress(i, false), channels)
                }
                Phase::Final => {
                    self.pace().await;
                    info!("All steps completed");
                    self.phase = Phase::Finished;

                    match &plan.final_snapshot {
                        Some(explicit) => {
                            debug!("Emitting explicit final snapshot");
                            explicit.clone()
                        }
                        None => {
                            debug!("Emitting default final message");
                            let channels = match plan.steps.last() {
                                Some(last) => {
                                    evaluate(&last.name, &last.display_mappers, &self.context)?
                                }
                                None => plan.clear_channels.clone(),
                            };
                            Snapshot::new(StatusValue::hidden_message(&plan.final_message), channels)
                        }
                    }
                }
                Phase::Finished => return Ok(None),
            };

            self.emitted = true;
            return Ok(Some(snapshot));
        }
    }
}

/// Evaluate one mapper per channel. Any mapper error aborts the run.
fn evaluate<T, D>(
    step: &str,
    mappers: &[DisplayMapper<T, D>],
    context: &RunContext<T>,
) -> Result<Vec<D>> {
    mappers
        .iter()
        .map(|mapper| mapper(context))
        .collect::<anyhow::Result<Vec<_>>>()
        .map_err(|source| {
            error!("Display mapping for step '{}' failed: {:#}", step, source);
            AssistError::DisplayFailed {
                step: step.to_string(),
                source,
            }
        })
}

/// Builder for [`StepExecutor`].
pub struct StepExecutorBuilder<T, D> {
    steps: Vec<StepDescriptor<T, D>>,
    initial: Option<Snapshot<D>>,
    final_snapshot: Option<Snapshot<D>>,
    final_message: String,
    clear_channels: Option<Vec<D>>,
    renderer: Option<Arc<dyn ProgressRenderer>>,
    pacing: Duration,
}

impl<T, D> Default for StepExecutorBuilder<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D> StepExecutorBuilder<T, D> {
    /// Create a builder with no steps, no renderer and default pacing.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            initial: None,
            final_snapshot: None,
            final_message: DEFAULT_FINAL_MESSAGE.to_string(),
            clear_channels: None,
            renderer: None,
            pacing: DEFAULT_PACING,
        }
    }

    /// Append a step.
    pub fn step(mut self, step: StepDescriptor<T, D>) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps, keeping their order.
    pub fn steps(mut self, steps: impl IntoIterator<Item = StepDescriptor<T, D>>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Snapshot emitted before anything runs.
    pub fn initial_snapshot(mut self, snapshot: Snapshot<D>) -> Self {
        self.initial = Some(snapshot);
        self
    }

    /// Renderer used for the progress markup. Without one the markup is empty.
    pub fn progress_renderer(mut self, renderer: impl ProgressRenderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Message shown in place of the progress markup by the default final snapshot.
    pub fn final_message(mut self, message: impl Into<String>) -> Self {
        self.final_message = message.into();
        self
    }

    /// Snapshot emitted after the last step instead of the default final snapshot.
    pub fn final_snapshot(mut self, snapshot: Snapshot<D>) -> Self {
        self.final_snapshot = Some(snapshot);
        self
    }

    /// Channel values emitted before a step that has no pre-display mappers.
    pub fn clear_channels(mut self, channels: Vec<D>) -> Self {
        self.clear_channels = Some(channels);
        self
    }

    /// Pause between emitted snapshots. `Duration::ZERO` disables it.
    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

impl<T, D: Clone + Default> StepExecutorBuilder<T, D> {
    /// Validate the step list and build the executor.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::InvalidStepList`] when two steps share a key or
    /// when any step, pre-display list, clear list, initial or final snapshot
    /// disagrees on the number of display channels.
    pub fn build(self) -> Result<StepExecutor<T, D>> {
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.key.as_str()) {
                return Err(invalid(format!("duplicate step key '{}'", step.key)));
            }
        }

        let arity = self
            .clear_channels
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.steps.first().map(StepDescriptor::channel_count))
            .or_else(|| self.initial.as_ref().map(|s| s.channels.len()))
            .or_else(|| self.final_snapshot.as_ref().map(|s| s.channels.len()))
            .unwrap_or(0);

        for step in &self.steps {
            if step.display_mappers.len() != arity {
                return Err(invalid(format!(
                    "step '{}' maps {} display channels, expected {}",
                    step.key,
                    step.display_mappers.len(),
                    arity
                )));
            }
            if let Some(pre) = &step.pre_display_mappers {
                if pre.len() != arity {
                    return Err(invalid(format!(
                        "step '{}' has {} pre-display mappers, expected {}",
                        step.key,
                        pre.len(),
                        arity
                    )));
                }
            }
        }

        for (label, snapshot) in [
            ("initial", &self.initial),
            ("final", &self.final_snapshot),
        ] {
            if let Some(snapshot) = snapshot {
                if snapshot.channels.len() != arity {
                    return Err(invalid(format!(
                        "{} snapshot has {} channels, expected {}",
                        label,
                        snapshot.channels.len(),
                        arity
                    )));
                }
            }
        }

        let step_names = self.steps.iter().map(|s| s.name.clone()).collect();
        let clear_channels = self
            .clear_channels
            .unwrap_or_else(|| vec![D::default(); arity]);

        Ok(StepExecutor {
            plan: Arc::new(RunPlan {
                steps: self.steps,
                step_names,
                initial: self.initial,
                final_snapshot: self.final_snapshot,
                final_message: self.final_message,
                clear_channels,
                renderer: self.renderer,
                pacing: self.pacing,
            }),
        })
    }
}

fn invalid(message: String) -> AssistError {
    AssistError::InvalidStepList { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::mapper;
    use futures_util::{StreamExt, TryStreamExt};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn constant(key: &str, value: i32) -> StepDescriptor<i32, String> {
        StepDescriptor::from_fn(key, key.to_uppercase(), move |_ctx| {
            Box::pin(async move { Ok(value) })
        })
        .with_display(vec![mapper(|ctx: &RunContext<i32>| Ok(ctx.len().to_string()))])
    }

    fn names_renderer(names: &[String], index: usize, animate: bool) -> String {
        format!("{}:{}:{}", names.len(), index, animate)
    }

    #[tokio::test]
    async fn emits_pre_and_post_per_step_plus_final() {
        let executor = StepExecutor::builder()
            .steps([constant("a", 1), constant("b", 2)])
            .pacing(Duration::ZERO)
            .build()
            .unwrap();

        let snapshots: Vec<_> = executor.execute().try_collect().await.unwrap();
        assert_eq!(snapshots.len(), 5);
        assert_eq!(snapshots[0].channels, vec![String::new()]);
        assert_eq!(snapshots[1].channels, vec!["1".to_string()]);
        assert_eq!(snapshots[3].channels, vec!["2".to_string()]);
        assert_eq!(
            snapshots[4].status,
            StatusValue::hidden_message(DEFAULT_FINAL_MESSAGE)
        );
        assert_eq!(snapshots[4].channels, vec!["2".to_string()]);
    }

    #[tokio::test]
    async fn progress_marks_animation_only_before_step() {
        let executor = StepExecutor::builder()
            .step(constant("a", 1))
            .progress_renderer(names_renderer)
            .pacing(Duration::ZERO)
            .build()
            .unwrap();

        let snapshots: Vec<_> = executor.execute().try_collect().await.unwrap();
        assert_eq!(snapshots[0].status.progress(), Some("1:0:true"));
        assert_eq!(snapshots[1].status.progress(), Some("1:0:false"));
    }

    #[tokio::test]
    async fn missing_renderer_yields_empty_markup() {
        let executor = StepExecutor::builder()
            .step(constant("a", 1))
            .pacing(Duration::ZERO)
            .build()
            .unwrap();
        let first = executor.execute().next().await.unwrap().unwrap();
        assert_eq!(first.status, StatusValue::Progress(String::new()));
    }

    #[tokio::test]
    async fn initial_snapshot_comes_first() {
        let executor = StepExecutor::builder()
            .step(constant("a", 1))
            .initial_snapshot(Snapshot::new(
                StatusValue::message("please wait"),
                vec!["init".to_string()],
            ))
            .pacing(Duration::ZERO)
            .build()
            .unwrap();

        let snapshots: Vec<_> = executor.execute().try_collect().await.unwrap();
        assert_eq!(snapshots.len(), 4);
        assert_eq!(snapshots[0].status, StatusValue::message("please wait"));
    }

    #[tokio::test]
    async fn explicit_final_snapshot_replaces_default() {
        let executor = StepExecutor::builder()
            .step(constant("a", 1))
            .final_snapshot(Snapshot::new(
                StatusValue::message("finished"),
                vec!["end".to_string()],
            ))
            .pacing(Duration::ZERO)
            .build()
            .unwrap();

        let snapshots: Vec<_> = executor.execute().try_collect().await.unwrap();
        let last = snapshots.last().unwrap();
        assert_eq!(last.status, StatusValue::message("finished"));
        assert_eq!(last.channels, vec!["end".to_string()]);
    }

    #[tokio::test]
    async fn empty_step_list_emits_only_final() {
        let executor: StepExecutor<i32, String> = StepExecutor::builder()
            .clear_channels(vec!["-".to_string()])
            .final_message("nothing to do")
            .pacing(Duration::ZERO)
            .build()
            .unwrap();

        let snapshots: Vec<_> = executor.execute().try_collect().await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].status, StatusValue::hidden_message("nothing to do"));
        assert_eq!(snapshots[0].channels, vec!["-".to_string()]);
    }

    #[tokio::test]
    async fn failure_stops_run_and_ends_stream() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later_calls);

        let executor = StepExecutor::builder()
            .step(constant("a", 1))
            .step(
                StepDescriptor::from_fn("b", "Broken", |_ctx| {
                    Box::pin(async { Err(anyhow::anyhow!("boom")) })
                })
                .with_display(vec![mapper(|_| Ok(String::new()))]),
            )
            .step(
                StepDescriptor::from_fn("c", "Never", move |_ctx| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Box::pin(async { Ok(3) })
                })
                .with_display(vec![mapper(|_| Ok(String::new()))]),
            )
            .pacing(Duration::ZERO)
            .build()
            .unwrap();

        let mut stream = executor.execute();
        let mut ok = 0;
        let err = loop {
            match stream.next().await {
                Some(Ok(_)) => ok += 1,
                Some(Err(e)) => break e,
                None => panic!("stream ended without error"),
            }
        };
        assert_eq!(ok, 3);
        assert_eq!(err.step(), Some("Broken"));
        assert!(stream.next().await.is_none());
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mapper_failure_is_fatal() {
        let executor = StepExecutor::builder()
            .step(
                StepDescriptor::from_fn("a", "Mapped", |_ctx| Box::pin(async { Ok(1) }))
                    .with_display(vec![mapper(|ctx: &RunContext<i32>| {
                        Ok(ctx.require("missing")?.to_string())
                    })]),
            )
            .pacing(Duration::ZERO)
            .build()
            .unwrap();

        let results: Vec<_> = executor.execute().collect().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(AssistError::DisplayFailed { ref step, .. }) if step == "Mapped"
        ));
    }

    #[tokio::test]
    async fn pre_display_mappers_replace_clear_snapshot() {
        let executor = StepExecutor::builder()
            .step(constant("a", 1))
            .step(
                constant("b", 2).with_pre_display(vec![mapper(|ctx: &RunContext<i32>| {
                    Ok(format!("before:{}", ctx.require("a")?))
                })]),
            )
            .clear_channels(vec!["cleared".to_string()])
            .pacing(Duration::ZERO)
            .build()
            .unwrap();

        let snapshots: Vec<_> = executor.execute().try_collect().await.unwrap();
        assert_eq!(snapshots[0].channels, vec!["cleared".to_string()]);
        assert_eq!(snapshots[2].channels, vec!["before:1".to_string()]);
    }

    #[tokio::test]
    async fn pacing_delays_between_emissions() {
        let executor = StepExecutor::builder()
            .step(constant("a", 1))
            .pacing(Duration::from_millis(20))
            .build()
            .unwrap();

        let start = std::time::Instant::now();
        let snapshots: Vec<_> = executor.execute().try_collect().await.unwrap();
        assert_eq!(snapshots.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let result = StepExecutor::builder()
            .steps([constant("a", 1), constant("a", 2)])
            .build();
        assert!(matches!(result, Err(AssistError::InvalidStepList { .. })));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let result = StepExecutor::builder()
            .step(constant("a", 1))
            .step(StepDescriptor::from_fn("b", "B", |_ctx| Box::pin(async { Ok(2) })))
            .build();
        let err = result.err().unwrap();
        assert!(err.to_string().contains("step 'b' maps 0 display channels, expected 1"));
    }

    #[test]
    fn clear_channel_mismatch_is_rejected() {
        let result = StepExecutor::builder()
            .step(constant("a", 1))
            .clear_channels(vec![String::new(), String::new()])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn initial_snapshot_mismatch_is_rejected() {
        let result = StepExecutor::builder()
            .step(constant("a", 1))
            .initial_snapshot(Snapshot::new(StatusValue::message("x"), vec![]))
            .build();
        assert!(result.err().unwrap().to_string().contains("initial snapshot"));
    }

    #[test]
    fn default_clear_channels_match_arity() {
        let executor = StepExecutor::builder()
            .step(constant("a", 1))
            .build()
            .unwrap();
        assert_eq!(executor.channel_count(), 1);
        assert_eq!(executor.pacing(), DEFAULT_PACING);
        assert_eq!(executor.step_names(), &["A".to_string()]);
    }
}
