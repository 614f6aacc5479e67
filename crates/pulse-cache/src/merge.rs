//! JSON-level field merge for partial update payloads

use serde_json::Value;

/// Overlay the non-null fields of `patch` onto `base`.
///
/// Update events may carry a partial entity; fields absent from or null in
/// the patch must not clobber previously cached values. Non-object patches
/// replace the base wholesale.
pub fn merge_value(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                if value.is_null() {
                    continue;
                }
                base_map.insert(key.clone(), value.clone());
            }
        }
        (base, patch) => {
            *base = patch.clone();
        }
    }
}
