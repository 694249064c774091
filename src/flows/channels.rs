//! Display channel layout shared by the flows.
//!
//! Every flow emits the status channel followed by four display channels:
//! the API URL, the web URL, the raw JSON of the fetched data and a table
//! preview of the same data.

use serde_json::Value;

use crate::display::{format_url_as_markdown, ChannelUpdate, DataTable, DisplayValue};
use crate::steps::{mapper, DisplayMapper, RunContext, Snapshot, StatusValue};

/// Position of the API URL channel.
pub const API_URL: usize = 0;
/// Position of the web URL channel.
pub const WEB_URL: usize = 1;
/// Position of the raw JSON channel.
pub const JSON_VIEW: usize = 2;
/// Position of the table preview channel.
pub const TABLE_VIEW: usize = 3;
/// Number of display channels.
pub const CHANNEL_COUNT: usize = 4;

/// Final message shown once a flow completes.
pub const FINAL_MESSAGE: &str = "✅ All done!";

/// Mapper type used by every flow.
pub type FlowMapper = DisplayMapper<Value, ChannelUpdate>;

/// Every channel cleared and hidden.
pub fn cleared() -> Vec<ChannelUpdate> {
    vec![ChannelUpdate::hidden(); CHANNEL_COUNT]
}

/// Visible banner with every channel cleared.
pub fn banner(message: &str) -> Snapshot<ChannelUpdate> {
    Snapshot::new(StatusValue::message(message), cleared())
}

/// Keep the channel hidden.
pub fn hidden() -> FlowMapper {
    mapper(|_| Ok(ChannelUpdate::hidden()))
}

/// Show a markdown string stored by an earlier step.
pub fn markdown(key: &'static str) -> FlowMapper {
    mapper(move |ctx: &RunContext<Value>| {
        let text: String = ctx.decode(key)?;
        Ok(ChannelUpdate::show(DisplayValue::Markdown(text)))
    })
}

/// Keep the JSON stored by an earlier step without showing it.
pub fn stashed_json(key: &'static str) -> FlowMapper {
    mapper(move |ctx: &RunContext<Value>| {
        Ok(ChannelUpdate::stash(DisplayValue::Json(
            ctx.require(key)?.clone(),
        )))
    })
}

/// Show the records stored by an earlier step as a table.
///
/// With `flatten`, nested objects under that key become `flatten.<field>` columns.
pub fn table(key: &'static str, flatten: Option<&'static str>) -> FlowMapper {
    mapper(move |ctx: &RunContext<Value>| {
        let records = ctx.require(key)?;
        let table = match flatten {
            Some(nested) => DataTable::from_records_flattening(records, nested),
            None => DataTable::from_records(records),
        };
        Ok(ChannelUpdate::show(DisplayValue::Table(table)))
    })
}

/// A markdown channel value for a link under a heading, as stored in the context.
pub fn link(label: &str, url: &str) -> Value {
    Value::String(format_url_as_markdown(label, url))
}

/// Mappers for a step that shows nothing.
pub fn all_hidden() -> Vec<FlowMapper> {
    (0..CHANNEL_COUNT).map(|_| hidden()).collect()
}
