use serde_json::Value;

/// True for documentation-only keys: `notes` itself or any `*_notes` key.
pub fn is_notes_key(key: &str) -> bool {
    key == "notes" || key.ends_with("_notes")
}

/// Recursively remove documentation-only keys from a specification tree.
pub fn strip_notes(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !is_notes_key(key));
            map.values_mut().for_each(strip_notes);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_notes),
        _ => {}
    }
}
