//! Layering of `.abstracta-assist` config files.
//!
//! Config is read from up to three files, lowest precedence first:
//!
//! 1. `~/.abstracta-assist/config.yml` (user-global credentials and endpoints)
//! 2. `.abstracta-assist/config.yml` (shared project settings)
//! 3. `.abstracta-assist/config.local.yml` (per-checkout overrides, usually untracked)
//!
//! Each layer is applied on top of the previous one:
//!
//! - sections such as `backend` or `agent` combine key by key, so a local
//!   file can change `backend.timeout_secs` and keep the project's URLs
//! - lists such as `backend.grant_roles` are taken whole from the higher layer
//! - a key set to `null` is dropped, which puts the built-in default back
//!   (`agent.api_key: null` discards a key inherited from the global file)
//! - an empty file leaves everything below it unchanged

use serde_yaml::Value;

/// Apply `layer` on top of `base` and return the combined document.
pub fn deep_merge(base: &Value, layer: &Value) -> Value {
    let (Value::Mapping(base_map), Value::Mapping(layer_map)) = (base, layer) else {
        return match layer {
            Value::Null => base.clone(),
            other => other.clone(),
        };
    };

    let mut combined = base_map.clone();
    for (key, value) in layer_map {
        match (value, base_map.get(key)) {
            (Value::Null, _) => {
                combined.remove(key);
            }
            (value, Some(below)) => {
                combined.insert(key.clone(), deep_merge(below, value));
            }
            (value, None) => {
                combined.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Mapping(combined)
}

/// Fold config layers in precedence order, starting from an empty mapping.
pub fn merge_layers(layers: &[Value]) -> Value {
    layers
        .iter()
        .fold(Value::Mapping(Default::default()), |below, layer| {
            deep_merge(&below, layer)
        })
}
