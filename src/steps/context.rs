//! Per-run result accumulator.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised when reading from a [`RunContext`].
#[derive(Debug, Error)]
pub enum ContextError {
    /// No step with this key has completed yet.
    #[error("No result stored for step key '{key}'")]
    MissingKey { key: String },

    /// The stored result does not have the requested shape.
    #[error("Result for step key '{key}' has an unexpected shape: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Results of the steps that have completed so far in one run, keyed by step key.
///
/// A context is created empty by [`StepExecutor::execute`](super::StepExecutor::execute)
/// and gains exactly one entry per successful step. Operations and display
/// mappers only ever see it through a shared reference.
#[derive(Debug, Clone)]
pub struct RunContext<T> {
    results: HashMap<String, T>,
}

impl<T> Default for RunContext<T> {
    fn default() -> Self {
        Self {
            results: HashMap::new(),
        }
    }
}

impl<T> RunContext<T> {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Result stored for `key`, if that step has completed.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.results.get(key)
    }

    /// Result stored for `key`, or [`ContextError::MissingKey`].
    pub fn require(&self, key: &str) -> Result<&T, ContextError> {
        self.results.get(key).ok_or_else(|| ContextError::MissingKey {
            key: key.to_string(),
        })
    }

    /// Whether the step with this key has completed.
    pub fn contains_key(&self, key: &str) -> bool {
        self.results.contains_key(key)
    }

    /// Number of completed steps.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no step has completed yet.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Keys of the completed steps, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub(crate) fn insert(&mut self, key: &str, result: T) {
        self.results.insert(key.to_string(), result);
    }
}

impl RunContext<serde_json::Value> {
    /// Deserialize the result stored for `key` into a typed value.
    pub fn decode<P: DeserializeOwned>(&self, key: &str) -> Result<P, ContextError> {
        let value = self.require(key)?;
        serde_json::from_value(value.clone()).map_err(|source| ContextError::Decode {
            key: key.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn new_context_is_empty() {
        let ctx: RunContext<i32> = RunContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.len(), 0);
        assert!(ctx.get("anything").is_none());
    }

    #[test]
    fn insert_and_get() {
        let mut ctx = RunContext::new();
        ctx.insert("fetch", 42);
        assert_eq!(ctx.get("fetch"), Some(&42));
        assert!(ctx.contains_key("fetch"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn require_missing_key_errors() {
        let ctx: RunContext<i32> = RunContext::new();
        let err = ctx.require("build").unwrap_err();
        assert!(matches!(err, ContextError::MissingKey { ref key } if key == "build"));
        assert!(err.to_string().contains("build"));
    }

    #[test]
    fn insert_same_key_overwrites() {
        let mut ctx = RunContext::new();
        ctx.insert("a", 1);
        ctx.insert("a", 2);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get("a"), Some(&2));
    }

    #[test]
    fn keys_lists_completed_steps() {
        let mut ctx = RunContext::new();
        ctx.insert("a", 1);
        ctx.insert("b", 2);
        let mut keys: Vec<_> = ctx.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        #[serde(rename = "orgName")]
        org_name: String,
    }

    #[test]
    fn decode_typed_result() {
        let mut ctx = RunContext::new();
        ctx.insert("construct_payload", json!({"orgName": "demo_org_001"}));
        let payload: Payload = ctx.decode("construct_payload").unwrap();
        assert_eq!(payload.org_name, "demo_org_001");
    }

    #[test]
    fn decode_wrong_shape_errors() {
        let mut ctx = RunContext::new();
        ctx.insert("construct_payload", json!("just a string"));
        let err = ctx.decode::<Payload>("construct_payload").unwrap_err();
        assert!(matches!(err, ContextError::Decode { .. }));
    }

    #[test]
    fn decode_missing_key_errors() {
        let ctx: RunContext<serde_json::Value> = RunContext::new();
        let err = ctx.decode::<Payload>("construct_payload").unwrap_err();
        assert!(matches!(err, ContextError::MissingKey { .. }));
    }
}
