//! Tabular previews of JSON records.

use console::measure_text_width;
use serde_json::{Map, Value};

/// A data preview: named columns and string cells, renderable with box drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl DataTable {
    /// Create an empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        let column_widths = headers.iter().map(|h| measure_text_width(h)).collect();
        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Build a table from JSON records.
    ///
    /// An array of objects yields one row per object and one column per key,
    /// in first-seen order. A lone object becomes a single row. Any other
    /// value ends up in a single `value` column.
    pub fn from_records(records: &Value) -> Self {
        let objects = as_objects(records);
        match objects {
            Some(objects) => Self::from_objects(&objects, &[]),
            None => scalar_table(records),
        }
    }

    /// Like [`from_records`](Self::from_records), but nested objects under
    /// `key` are expanded into `key.<sub>` columns placed after the others.
    pub fn from_records_flattening(records: &Value, key: &str) -> Self {
        let Some(objects) = as_objects(records) else {
            return scalar_table(records);
        };

        let flattened: Vec<Map<String, Value>> = objects
            .iter()
            .map(|object| {
                let mut base = Map::new();
                let mut nested = Map::new();
                for (name, value) in object.iter() {
                    if name == key {
                        flatten_into(&mut nested, key, value);
                    } else {
                        base.insert(name.clone(), value.clone());
                    }
                }
                base.extend(nested);
                base
            })
            .collect();

        let refs: Vec<&Map<String, Value>> = flattened.iter().collect();
        let prefix = format!("{}.", key);
        Self::from_objects(&refs, &[prefix.as_str()])
    }

    /// `trailing` lists header prefixes whose columns go after all others.
    fn from_objects(objects: &[&Map<String, Value>], trailing: &[&str]) -> Self {
        let mut leading_headers: Vec<String> = Vec::new();
        let mut trailing_headers: Vec<String> = Vec::new();
        for object in objects {
            for name in object.keys() {
                let bucket = if trailing.iter().any(|p| name.starts_with(p)) {
                    &mut trailing_headers
                } else {
                    &mut leading_headers
                };
                if !bucket.contains(name) {
                    bucket.push(name.clone());
                }
            }
        }
        leading_headers.extend(trailing_headers);

        let mut table = Self::new(leading_headers);
        for object in objects {
            let row = table
                .headers
                .iter()
                .map(|h| object.get(h).map(cell_text).unwrap_or_default())
                .collect();
            table.add_row(row);
        }
        table
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if i < self.column_widths.len() {
                self.column_widths[i] = self.column_widths[i].max(measure_text_width(cell));
            }
        }
        self.rows.push(row);
    }

    /// Column names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Row cells.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a string.
    pub fn render(&self) -> String {
        if self.headers.is_empty() {
            return String::from("(no data)");
        }

        let mut output = String::new();
        output.push_str(&self.render_border('┌', '┬', '┐'));
        output.push('\n');
        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_border('├', '┼', '┤'));
        output.push('\n');
        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }
        output.push_str(&self.render_border('└', '┴', '┘'));
        output
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let mut s = String::new();
        s.push(left);
        for (i, width) in self.column_widths.iter().enumerate() {
            s.push_str(&"─".repeat(width + 2));
            if i < self.column_widths.len() - 1 {
                s.push(mid);
            }
        }
        s.push(right);
        s
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");
        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(|s| s.as_str()).unwrap_or("");
            let pad = width.saturating_sub(measure_text_width(cell));
            s.push(' ');
            s.push_str(cell);
            s.push_str(&" ".repeat(pad));
            s.push_str(" │");
        }
        s
    }
}

fn as_objects(records: &Value) -> Option<Vec<&Map<String, Value>>> {
    match records {
        Value::Array(items) => items.iter().map(Value::as_object).collect(),
        Value::Object(object) => Some(vec![object]),
        _ => None,
    }
}

fn scalar_table(value: &Value) -> DataTable {
    let mut table = DataTable::new(vec!["value".to_string()]);
    match value {
        Value::Array(items) => {
            for item in items {
                table.add_row(vec![cell_text(item)]);
            }
        }
        Value::Null => {}
        other => table.add_row(vec![cell_text(other)]),
    }
    table
}

fn flatten_into(target: &mut Map<String, Value>, prefix: &str, value: &Value) {
    match value {
        Value::Object(object) => {
            for (name, inner) in object {
                flatten_into(target, &format!("{}.{}", prefix, name), inner);
            }
        }
        other => {
            target.insert(prefix.to_string(), other.clone());
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_use_first_seen_column_order() {
        let table = DataTable::from_records(&json!([
            {"id": 1, "name": "alpha"},
            {"name": "beta", "id": 2, "extra": true}
        ]));
        assert_eq!(table.headers(), &["id", "name", "extra"]);
        assert_eq!(table.rows()[0], vec!["1", "alpha", ""]);
        assert_eq!(table.rows()[1], vec!["2", "beta", "true"]);
    }

    #[test]
    fn single_object_is_one_row() {
        let table = DataTable::from_records(&json!({"a": "x"}));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn scalars_use_value_column() {
        let table = DataTable::from_records(&json!([1, 2]));
        assert_eq!(table.headers(), &["value"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn null_is_empty() {
        let table = DataTable::from_records(&Value::Null);
        assert!(table.is_empty());
    }

    #[test]
    fn flattening_expands_nested_key_after_other_columns() {
        let table = DataTable::from_records_flattening(
            &json!([
                {"_dq": {"score": 0.5, "checks": {"ISNOTNULL": "pass"}}, "id": 1},
                {"id": 2, "_dq": {"score": 1}}
            ]),
            "_dq",
        );
        assert_eq!(
            table.headers(),
            &["id", "_dq.checks.ISNOTNULL", "_dq.score"]
        );
        assert_eq!(table.rows()[0], vec!["1", "pass", "0.5"]);
        assert_eq!(table.rows()[1], vec!["2", "", "1"]);
    }

    #[test]
    fn render_uses_box_drawing() {
        let mut table = DataTable::new(vec!["Name".into(), "Status".into()]);
        table.add_row(vec!["step1".into(), "ok".into()]);
        let output = table.render();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "┌───────┬────────┐");
        assert_eq!(lines[3], "│ step1 │ ok     │");
    }

    #[test]
    fn render_handles_missing_cells() {
        let mut table = DataTable::new(vec!["A".into(), "B".into(), "C".into()]);
        table.add_row(vec!["only".into()]);
        assert!(table.render().contains("only"));
    }

    #[test]
    fn render_without_columns() {
        let table = DataTable::from_records(&json!([]));
        assert_eq!(table.render(), "(no data)");
    }
}
