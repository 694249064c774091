//! Interactive terminal view.

use console::Term;
use std::io::Write;

use crate::display::{should_use_colors, AssistTheme, ChannelUpdate, DisplayValue};
use crate::error::{AssistError, Result};
use crate::steps::{Snapshot, StatusValue};

use super::SnapshotView;

/// Draws a run on the terminal.
///
/// On a TTY the progress block is redrawn in place. Elsewhere each new
/// progress frame is printed once. Channel values are printed the first
/// time they become visible and again only when they change.
pub struct TerminalView {
    term: Term,
    theme: AssistTheme,
    live: bool,
    /// Lines of the progress block currently on screen.
    drawn_lines: usize,
    last_progress: Option<String>,
    printed: Vec<Option<DisplayValue>>,
}

impl TerminalView {
    /// Create a view on stdout.
    pub fn new() -> Self {
        let term = Term::stdout();
        let live = term.is_term();
        Self::with_term(term, AssistTheme::for_colors(should_use_colors()), live)
    }

    /// Create a view on a given terminal.
    pub fn with_term(term: Term, theme: AssistTheme, live: bool) -> Self {
        Self {
            term,
            theme,
            live,
            drawn_lines: 0,
            last_progress: None,
            printed: Vec::new(),
        }
    }

    fn draw_progress(&mut self, markup: &str) -> Result<()> {
        if self.last_progress.as_deref() == Some(markup) {
            return Ok(());
        }
        if self.live && self.drawn_lines > 0 {
            self.term.clear_last_lines(self.drawn_lines)?;
        }
        writeln!(self.term, "{}", markup)?;
        self.drawn_lines = markup.lines().count();
        self.last_progress = Some(markup.to_string());
        Ok(())
    }

    fn draw_channels(&mut self, channels: &[ChannelUpdate]) -> Result<()> {
        if self.printed.len() < channels.len() {
            self.printed.resize(channels.len(), None);
        }
        for (index, update) in channels.iter().enumerate() {
            let Some(value) = update.value.as_ref().filter(|_| update.visible) else {
                continue;
            };
            if self.printed[index].as_ref() == Some(value) {
                continue;
            }
            let rendered = self.render_value(value);
            writeln!(self.term)?;
            writeln!(self.term, "{}", rendered)?;
            self.printed[index] = Some(value.clone());
            // Anything printed below the progress block pins it.
            self.drawn_lines = 0;
        }
        Ok(())
    }

    fn render_value(&self, value: &DisplayValue) -> String {
        match value {
            DisplayValue::Text(text) | DisplayValue::Markdown(text) => text.clone(),
            DisplayValue::Json(json) => {
                serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
            }
            DisplayValue::Table(table) => table.render(),
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotView<ChannelUpdate> for TerminalView {
    fn apply(&mut self, snapshot: &Snapshot<ChannelUpdate>) -> Result<()> {
        match &snapshot.status {
            StatusValue::Progress(markup) => self.draw_progress(markup)?,
            StatusValue::Message {
                text,
                visible: true,
            } => {
                writeln!(self.term, "{}", self.theme.format_header(text))?;
                self.drawn_lines = 0;
            }
            StatusValue::Message { visible: false, .. } => {}
        }
        self.draw_channels(&snapshot.channels)
    }

    fn show_error(&mut self, error: &AssistError) {
        writeln!(self.term).ok();
        writeln!(self.term, "{}", self.theme.format_error(&error.to_string())).ok();
    }
}
