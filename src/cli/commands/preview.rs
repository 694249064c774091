//! `preview` command: show the data an API version returns.

use std::sync::Arc;

use async_trait::async_trait;
use console::Term;
use serde_json::Value;
use tracing::info;

use crate::backend::{AbstractaBackend, ServicePath};
use crate::cli::args::PreviewArgs;
use crate::display::{format_url_as_markdown, AssistTheme, DataTable};
use crate::error::Result;

use super::dispatcher::{Command, CommandResult};

pub struct PreviewCommand {
    path: ServicePath,
    json: bool,
    backend: Arc<dyn AbstractaBackend>,
    theme: AssistTheme,
}

impl PreviewCommand {
    pub fn new(
        args: &PreviewArgs,
        backend: Arc<dyn AbstractaBackend>,
        theme: AssistTheme,
    ) -> Result<Self> {
        Ok(Self {
            path: args.service.parse()?,
            json: args.json,
            backend,
            theme,
        })
    }

    /// Text printed for the fetched `data`.
    pub fn render(&self, data: &Value) -> String {
        let body = if self.json {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
        } else {
            DataTable::from_records_flattening(data, "_dq").render()
        };
        format!(
            "{}\n{}\n\n{}\n",
            self.theme.format_header(&self.path.to_string()),
            format_url_as_markdown("Web URL", &self.backend.web_url(&self.path)),
            body
        )
    }

    /// Fetch the preview data.
    pub async fn fetch(&self) -> Result<Value> {
        let token = self.backend.authenticate().await?;
        info!("Fetching preview of {}", self.path);
        Ok(self.backend.fetch_data(&token, &self.path).await?)
    }
}

#[async_trait]
impl Command for PreviewCommand {
    async fn execute(&self) -> Result<CommandResult> {
        let data = self.fetch().await?;
        Term::stdout().write_str(&self.render(&data))?;
        Ok(CommandResult::success())
    }
}
