//! Progress rendering.
//!
//! A progress renderer is a pure function of the step names, the index of the
//! current step, and whether the current step should be animated. The only
//! wall-clock dependency is the animation suffix, which renderers isolate in
//! a deterministic `render_frame` so tests can pin it.

mod html;
mod terminal;

pub use html::HtmlProgressRenderer;
pub use terminal::TerminalProgressRenderer;

use std::time::{SystemTime, UNIX_EPOCH};

/// Turns the step list and current position into progress markup.
pub trait ProgressRenderer: Send + Sync {
    /// Render the progress for `step_names` with `current` in progress.
    fn render(&self, step_names: &[String], current: usize, animate: bool) -> String;
}

impl<F> ProgressRenderer for F
where
    F: Fn(&[String], usize, bool) -> String + Send + Sync,
{
    fn render(&self, step_names: &[String], current: usize, animate: bool) -> String {
        self(step_names, current, animate)
    }
}

/// Display state of one step relative to the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMark {
    Done,
    InProgress,
    Pending,
}

impl StepMark {
    /// Mark for the step at `index` when `current` is in progress.
    pub fn for_index(index: usize, current: usize) -> Self {
        use std::cmp::Ordering;
        match index.cmp(&current) {
            Ordering::Less => Self::Done,
            Ordering::Equal => Self::InProgress,
            Ordering::Greater => Self::Pending,
        }
    }
}

/// Completion percentage when `current` of `total` steps are done.
///
/// Rounds down, treats an empty list as complete and never exceeds 100.
pub fn percent_complete(current: usize, total: usize) -> usize {
    if total == 0 {
        return 100;
    }
    (current.saturating_mul(100) / total).min(100)
}

/// Animation phase for the in-progress suffix, cycling twice a second.
pub fn animation_phase() -> usize {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    ((millis / 500) % 3) as usize
}

/// Suffix for an animation phase: `.`, `..` or `...`.
pub(crate) fn dots(phase: Option<usize>) -> String {
    match phase {
        Some(phase) => ".".repeat(phase % 3 + 1),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_down() {
        assert_eq!(percent_complete(0, 3), 0);
        assert_eq!(percent_complete(1, 3), 33);
        assert_eq!(percent_complete(2, 3), 66);
        assert_eq!(percent_complete(3, 3), 100);
    }

    #[test]
    fn percent_edge_cases() {
        assert_eq!(percent_complete(0, 0), 100);
        assert_eq!(percent_complete(9, 3), 100);
    }

    #[test]
    fn marks_follow_index() {
        assert_eq!(StepMark::for_index(0, 1), StepMark::Done);
        assert_eq!(StepMark::for_index(1, 1), StepMark::InProgress);
        assert_eq!(StepMark::for_index(2, 1), StepMark::Pending);
    }

    #[test]
    fn dots_cycle() {
        assert_eq!(dots(None), "");
        assert_eq!(dots(Some(0)), ".");
        assert_eq!(dots(Some(1)), "..");
        assert_eq!(dots(Some(2)), "...");
        assert_eq!(dots(Some(3)), ".");
    }

    #[test]
    fn animation_phase_in_range() {
        assert!(animation_phase() < 3);
    }

    #[test]
    fn closures_are_renderers() {
        let renderer = |names: &[String], current: usize, _animate: bool| {
            format!("{}/{}", current, names.len())
        };
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(renderer.render(&names, 1, false), "1/2");
    }
}
