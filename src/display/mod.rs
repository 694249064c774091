//! UI-facing display channel values.
//!
//! Flows emit [`Snapshot<ChannelUpdate>`](crate::steps::Snapshot): each
//! channel carries an optional [`DisplayValue`] and a visibility flag, the
//! way a widget update would.

mod table;
mod theme;

pub use table::DataTable;
pub use theme::{should_use_colors, AssistTheme};

use serde_json::Value;

/// Content of one display channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    /// Plain text.
    Text(String),
    /// Markdown (links, headings).
    Markdown(String),
    /// Raw JSON document.
    Json(Value),
    /// Tabular data preview.
    Table(DataTable),
}

impl DisplayValue {
    /// Short label for the kind of value, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Markdown(_) => "markdown",
            Self::Json(_) => "json",
            Self::Table(_) => "table",
        }
    }
}

/// Update for one display channel.
///
/// The default update clears the channel and hides it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelUpdate {
    /// New content, or `None` to clear.
    pub value: Option<DisplayValue>,
    /// Whether the channel is shown.
    pub visible: bool,
}

impl ChannelUpdate {
    /// Clear the channel and hide it.
    pub fn hidden() -> Self {
        Self::default()
    }

    /// Set the content and show it.
    pub fn show(value: DisplayValue) -> Self {
        Self {
            value: Some(value),
            visible: true,
        }
    }

    /// Set the content but keep the channel hidden.
    pub fn stash(value: DisplayValue) -> Self {
        Self {
            value: Some(value),
            visible: false,
        }
    }

    /// Whether there is something to show.
    pub fn is_shown(&self) -> bool {
        self.visible && self.value.is_some()
    }
}

/// Format a clickable markdown link under a heading.
pub fn format_url_as_markdown(label: &str, url: &str) -> String {
    format!("### {label}\n[{label}]({url})")
}

/// Remove every object entry named `key`, at any depth.
pub fn strip_key_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .filter(|(name, _)| name.as_str() != key)
                .map(|(name, inner)| (name.clone(), strip_key_recursive(inner, key)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| strip_key_recursive(item, key))
                .collect(),
        ),
        other => other.clone(),
    }
}
