//! Query API request body and response helpers.

use serde::Serialize;
use serde_json::Value;

use super::BackendError;

/// Body of a query API call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    #[serde(rename = "where")]
    pub where_clause: String,
    pub from: u32,
    pub to: u32,
    pub columns: String,
    pub lean: bool,
    #[serde(rename = "forUser")]
    pub for_user: Option<String>,
    #[serde(rename = "forUserSecret")]
    pub for_user_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderby: Option<String>,
}

impl QueryRequest {
    /// All columns of rows `from..=to` matching `where_clause`.
    pub fn new(where_clause: impl Into<String>, from: u32, to: u32) -> Self {
        Self {
            where_clause: where_clause.into(),
            from,
            to,
            columns: "*".to_string(),
            lean: true,
            for_user: None,
            for_user_secret: None,
            orderby: None,
        }
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn order_by(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    /// Run the query on behalf of a platform user.
    pub fn on_behalf_of(mut self, user: Option<String>, secret: Option<String>) -> Self {
        self.for_user = user;
        self.for_user_secret = secret;
        self
    }
}

/// Quote a value for use inside a single-quoted SQL literal.
pub(crate) fn sql_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Fail when a `StatusCode`/`statusCode` envelope reports anything but 200.
pub(crate) fn check_envelope(action: &str, body: &Value) -> Result<(), BackendError> {
    let code = body
        .get("StatusCode")
        .or_else(|| body.get("statusCode"))
        .and_then(|c| c.as_i64().or_else(|| c.as_str().and_then(|s| s.parse().ok())));

    match code {
        Some(code) if code != 200 => {
            let message = body
                .get("StatusMessage")
                .or_else(|| body.get("statusMessage"))
                .map(|m| m.as_str().map(String::from).unwrap_or_else(|| m.to_string()))
                .unwrap_or_default();
            Err(BackendError::Rejected {
                action: action.to_string(),
                code,
                message,
            })
        }
        _ => Ok(()),
    }
}

/// Collect one string column out of a list of records.
pub(crate) fn column(action: &str, records: &Value, name: &str) -> Result<Vec<String>, BackendError> {
    let items = records.as_array().ok_or_else(|| BackendError::InvalidResponse {
        action: action.to_string(),
        message: "expected a list of records".to_string(),
    })?;
    Ok(items
        .iter()
        .filter_map(|item| item.get(name))
        .map(text)
        .collect())
}

/// Render a scalar id or name without JSON quoting.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `application/x-www-form-urlencoded` body.
pub(crate) fn form_encode(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}
