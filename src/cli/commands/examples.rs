//! `examples` command: print the built-in example requests.

use anyhow::anyhow;
use async_trait::async_trait;
use console::Term;

use crate::cli::args::ExamplesArgs;
use crate::display::AssistTheme;
use crate::error::{AssistError, Result};
use crate::flows::FlowKind;
use crate::prompts::EXAMPLE_PROMPTS;

use super::dispatcher::{Command, CommandResult};

pub struct ExamplesCommand {
    flow: Option<FlowKind>,
    theme: AssistTheme,
}

impl ExamplesCommand {
    pub fn new(args: &ExamplesArgs, theme: AssistTheme) -> Result<Self> {
        let flow = args
            .flow
            .as_deref()
            .map(str::parse::<FlowKind>)
            .transpose()
            .map_err(|e| AssistError::Other(anyhow!(e)))?;
        Ok(Self { flow, theme })
    }

    /// Text printed by the command.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for kind in FlowKind::ALL {
            if self.flow.is_some_and(|wanted| wanted != kind) {
                continue;
            }
            out.push_str(&self.theme.format_header(kind.label()));
            out.push('\n');
            for prompt in EXAMPLE_PROMPTS.iter().filter(|p| p.flow == kind) {
                out.push_str(&format!(
                    "\n  {}\n",
                    self.theme.highlight.apply_to(prompt.title)
                ));
                for line in prompt.text.lines() {
                    out.push_str(&format!("    {}\n", line));
                }
            }
            out.push_str(&format!(
                "\n  {}\n\n",
                self.theme
                    .dim
                    .apply_to(format!("abstracta-assist {} \"<request>\"", kind))
            ));
        }
        out
    }
}

#[async_trait]
impl Command for ExamplesCommand {
    async fn execute(&self) -> Result<CommandResult> {
        Term::stdout().write_str(&self.render())?;
        Ok(CommandResult::success())
    }
}
