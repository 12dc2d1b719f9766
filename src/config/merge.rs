//! Configuration merge logic
//!
//! Layers merge with:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge two JSON values.
///
/// Objects merge recursively; anything else in `overlay`, including null
/// and arrays, replaces the base value.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge config layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_field_override() {
        let base = json!({"profile": {"theme": "BlackMATE", "window_manager": "i3"}});
        let overlay = json!({"profile": {"window_manager": "marco"}});
        let result = deep_merge(base, overlay);

        assert_eq!(result["profile"]["window_manager"], "marco");
        assert_eq!(result["profile"]["theme"], "BlackMATE");
    }

    #[test]
    fn test_array_replace() {
        let base = json!({"extra": ["a", "b", "c"]});
        let overlay = json!({"extra": ["x"]});
        let result = deep_merge(base, overlay);

        assert_eq!(result["extra"], json!(["x"]));
    }

    #[test]
    fn test_null_override() {
        let base = json!({"profile": {"show_desktop_icons": true}});
        let overlay = json!({"profile": {"show_desktop_icons": null}});
        let result = deep_merge(base, overlay);

        assert!(result["profile"]["show_desktop_icons"].is_null());
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"logging": {"level": "info"}, "panel": {"stale_prefix": "object-"}});
        let user = json!({"logging": {"level": "warn"}});
        let explicit = json!({"panel": {"stale_prefix": "launcher-"}});
        let cli = json!({"logging": {"level": "debug"}});

        let result = merge_layers(vec![builtin, user, explicit, cli]);

        assert_eq!(result["logging"]["level"], "debug");
        assert_eq!(result["panel"]["stale_prefix"], "launcher-");
    }
}
