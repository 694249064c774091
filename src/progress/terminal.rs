//! Themed text progress for the terminal.

use crate::display::AssistTheme;

use super::{animation_phase, dots, percent_complete, ProgressRenderer, StepMark};

const DEFAULT_BAR_WIDTH: usize = 24;

/// Renders progress as one line per step plus a `[████░░░░] 33%` bar.
#[derive(Debug, Clone)]
pub struct TerminalProgressRenderer {
    theme: AssistTheme,
    bar_width: usize,
}

impl Default for TerminalProgressRenderer {
    fn default() -> Self {
        Self::new(AssistTheme::new())
    }
}

impl TerminalProgressRenderer {
    pub fn new(theme: AssistTheme) -> Self {
        Self {
            theme,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }

    /// Set the number of cells in the bar.
    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width.max(1);
        self
    }

    /// Render with an explicit animation phase; `None` means no suffix.
    pub fn render_frame(&self, step_names: &[String], current: usize, phase: Option<usize>) -> String {
        let mut lines: Vec<String> = step_names
            .iter()
            .enumerate()
            .map(|(i, name)| match StepMark::for_index(i, current) {
                StepMark::Done => format!("{}", self.theme.success.apply_to(format!("✓ {}", name))),
                StepMark::InProgress => format!(
                    "{}",
                    self.theme.info.apply_to(format!("◉ {}{}", name, dots(phase)))
                ),
                StepMark::Pending => format!("{}", self.theme.dim.apply_to(format!("○ {}", name))),
            })
            .collect();

        lines.push(self.bar(percent_complete(current, step_names.len())));
        lines.join("\n")
    }

    fn bar(&self, percent: usize) -> String {
        let filled = self.bar_width * percent / 100;
        format!(
            "[{}{}] {}%",
            self.theme.bar.apply_to("█".repeat(filled)),
            self.theme.border.apply_to("░".repeat(self.bar_width - filled)),
            percent
        )
    }
}

impl ProgressRenderer for TerminalProgressRenderer {
    fn render(&self, step_names: &[String], current: usize, animate: bool) -> String {
        let phase = animate.then(animation_phase);
        self.render_frame(step_names, current, phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> TerminalProgressRenderer {
        TerminalProgressRenderer::new(AssistTheme::plain()).with_bar_width(8)
    }

    fn names() -> Vec<String> {
        ["fetch", "build", "submit"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renders_marks_and_bar() {
        let out = plain().render_frame(&names(), 1, None);
        assert_eq!(out, "✓ fetch\n◉ build\n○ submit\n[██░░░░░░] 33%");
    }

    #[test]
    fn animated_suffix() {
        let out = plain().render_frame(&names(), 0, Some(1));
        assert!(out.starts_with("◉ fetch..\n"));
    }

    #[test]
    fn complete_bar_is_full() {
        let out = plain().render_frame(&names(), 3, None);
        assert!(out.ends_with("[████████] 100%"));
    }

    #[test]
    fn bar_width_never_zero() {
        let out = TerminalProgressRenderer::new(AssistTheme::plain())
            .with_bar_width(0)
            .render_frame(&[], 0, None);
        assert_eq!(out, "[█] 100%");
    }
}
