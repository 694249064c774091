//! Flow commands: `api`, `dq-rule` and `profile`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context as _};
use async_trait::async_trait;
use console::Term;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

use crate::agent::OpenAiAgent;
use crate::backend::HttpBackend;
use crate::cli::args::FlowArgs;
use crate::config::AssistConfig;
use crate::display::{AssistTheme, ChannelUpdate};
use crate::error::{AssistError, Result};
use crate::flows::{FlowKind, FlowServices, FlowSettings};
use crate::progress::TerminalProgressRenderer;
use crate::ui::{drive, SnapshotView, TerminalView};

use super::dispatcher::{Command, CommandResult};

/// Runs one flow on the terminal.
pub struct RunCommand {
    kind: FlowKind,
    args: FlowArgs,
    config: AssistConfig,
    theme: AssistTheme,
}

impl RunCommand {
    pub fn new(kind: FlowKind, args: FlowArgs, config: AssistConfig, theme: AssistTheme) -> Self {
        Self {
            kind,
            args,
            config,
            theme,
        }
    }

    /// Run the flow for `request` against `services`, showing it on `view`.
    pub async fn run_with(
        &self,
        request: &str,
        services: &FlowServices,
        view: &mut impl SnapshotView<ChannelUpdate>,
    ) -> Result<usize> {
        let settings = FlowSettings::from_config(self.kind, &self.config);
        let executor = self.kind.build(
            services,
            &settings,
            request,
            TerminalProgressRenderer::new(self.theme.clone()),
        )?;
        info!("Running {} flow", self.kind);
        drive(executor.execute(), view).await
    }

    fn services(&self) -> Result<FlowServices> {
        Ok(FlowServices {
            backend: Arc::new(HttpBackend::new(self.config.backend.clone())?),
            agent: Arc::new(OpenAiAgent::new(&self.config.agent)?),
        })
    }
}

#[async_trait]
impl Command for RunCommand {
    async fn execute(&self) -> Result<CommandResult> {
        let request = read_request(&self.args).await?;
        let services = self.services()?;

        let term = Term::stdout();
        let live = term.is_term();
        let mut view = TerminalView::with_term(term.clone(), self.theme.clone(), live);

        match self.run_with(&request, &services, &mut view).await {
            Ok(_) => {
                term.write_line(&self.theme.format_success(&format!("{} finished", self.kind.label())))?;
                Ok(CommandResult::success())
            }
            Err(e) => {
                // Already shown by the view.
                error!("{} flow failed: {}", self.kind, e);
                Ok(CommandResult::failure(1))
            }
        }
    }
}

/// Collect the request text from the arguments, a file or stdin.
pub async fn read_request(args: &FlowArgs) -> Result<String> {
    let text = match (&args.file, args.request.as_slice()) {
        (Some(path), _) => read_file(path)?,
        (None, [dash]) if dash == "-" => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read request from stdin")?;
            text
        }
        (None, words) => words.join(" "),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AssistError::Other(anyhow!(
            "No request given; pass it as arguments, with --file, or as - to read stdin"
        )));
    }
    Ok(text)
}

fn read_file(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request from {}", path.display()))?)
}
