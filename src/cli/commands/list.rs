//! `list` command: browse organizations, applications, data sources and services.

use std::sync::Arc;

use async_trait::async_trait;
use console::Term;

use crate::backend::{AbstractaBackend, DataSourceRef};
use crate::cli::args::ListTarget;
use crate::display::AssistTheme;
use crate::error::Result;

use super::dispatcher::{Command, CommandResult};

pub struct ListCommand {
    target: ListTarget,
    backend: Arc<dyn AbstractaBackend>,
    theme: AssistTheme,
}

impl ListCommand {
    pub fn new(target: ListTarget, backend: Arc<dyn AbstractaBackend>, theme: AssistTheme) -> Self {
        Self {
            target,
            backend,
            theme,
        }
    }

    /// Heading and entries for the target.
    pub async fn entries(&self) -> Result<(String, Vec<String>)> {
        let token = self.backend.authenticate().await?;
        let listed = match &self.target {
            ListTarget::Orgs => (
                "Organizations".to_string(),
                self.backend.list_organizations(&token).await?,
            ),
            ListTarget::Apps { org } => (
                format!("Applications in {}", org),
                self.backend.list_applications(&token, org).await?,
            ),
            ListTarget::Datasources { org, app } => (
                format!("Data sources in {}/{}", org, app),
                self.backend.list_data_sources(&token, org, app).await?,
            ),
            ListTarget::Services {
                org: Some(org),
                app: Some(app),
                datasource: Some(datasource),
            } => {
                let scope = DataSourceRef {
                    org: org.clone(),
                    app: app.clone(),
                    datasource: datasource.clone(),
                };
                let services = self.backend.list_services(&token, Some(&scope)).await?;
                (
                    format!("Services in {}/{}/{}", org, app, datasource),
                    services.iter().map(ToString::to_string).collect(),
                )
            }
            ListTarget::Services { .. } => {
                let services = self.backend.list_services(&token, None).await?;
                (
                    "Services".to_string(),
                    services.iter().map(ToString::to_string).collect(),
                )
            }
        };
        Ok(listed)
    }

    /// Text printed for a heading and its entries.
    pub fn render(&self, heading: &str, entries: &[String]) -> String {
        let mut out = format!(
            "{}\n",
            self.theme
                .format_header(&format!("{} ({})", heading, entries.len()))
        );
        if entries.is_empty() {
            out.push_str(&format!("  {}\n", self.theme.dim.apply_to("(none)")));
        }
        for entry in entries {
            out.push_str(&format!("  {}\n", entry));
        }
        out
    }
}

#[async_trait]
impl Command for ListCommand {
    async fn execute(&self) -> Result<CommandResult> {
        let (heading, entries) = self.entries().await?;
        Term::stdout().write_str(&self.render(&heading, &entries))?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HttpBackend;
    use crate::config::BackendConfig;

    fn command() -> ListCommand {
        let backend = Arc::new(HttpBackend::new(BackendConfig::default()).unwrap());
        ListCommand::new(ListTarget::Orgs, backend, AssistTheme::plain())
    }

    #[test]
    fn render_counts_entries() {
        let out = command().render("Organizations", &["a".to_string(), "b".to_string()]);
        assert!(out.contains("Organizations (2)"));
        assert!(out.contains("  a\n"));
        assert!(out.contains("  b\n"));
    }

    #[test]
    fn render_marks_empty_listing() {
        let out = command().render("Applications in demo", &[]);
        assert!(out.contains("Applications in demo (0)"));
        assert!(out.contains("(none)"));
    }
}
