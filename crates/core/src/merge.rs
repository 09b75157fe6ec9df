//! Deep-merge semantics for the display/branding/TV-display config patches
//! accepted by `PUT /admin/display` and `PUT /admin/config`.
//!
//! `merge(c, {}) == c` and merges associate: applying `a` then `b` equals
//! applying `deep_merge(a, b)` in one step, since object keys are merged
//! key-by-key and non-object values simply overwrite.

use crate::error::ValidationError;
use serde_json::Value;

/// Recursively merge `patch` into `base`. Objects are merged key-by-key;
/// any other value (including arrays) in `patch` replaces the value in
/// `base` wholesale. Keys absent from `patch` are left untouched in `base`.
pub fn deep_merge(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            let mut merged = base_map.clone();
            for (key, patch_value) in patch_map {
                let merged_value = match merged.get(key) {
                    Some(base_value) => deep_merge(base_value, patch_value),
                    None => patch_value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        (_, patch_value) => patch_value.clone(),
    }
}

const MIN_DAYS_TO_DISPLAY: i64 = 1;
const MAX_DAYS_TO_DISPLAY: i64 = 14;
const MIN_REFRESH_INTERVAL_MS: i64 = 60_000;
const MAX_SHORT_LABEL_LEN: usize = 5;

static HEX_COLOR: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

fn hex_color_re() -> &'static regex::Regex {
    HEX_COLOR.get_or_init(|| regex::Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap())
}

/// Validate a merged display-config object against §4.4's rules. Returns
/// every violation found rather than stopping at the first one, so the
/// `VALIDATION_ERROR` response carries complete field-level detail.
pub fn validate_display_config(config: &Value) -> Result<(), ValidationError> {
    let mut fields = Vec::new();

    if let Some(colors) = config.get("colors").and_then(Value::as_object) {
        for (name, value) in colors {
            let ok = value.as_str().is_some_and(|s| hex_color_re().is_match(s));
            if !ok {
                fields.push(crate::error::FieldError::new(
                    format!("colors.{name}"),
                    "must be a hex color like #1a2b3c",
                ));
            }
        }
    }

    if let Some(sessions) = config.get("sessions") {
        validate_sessions(sessions, &mut fields);
    }

    if let Some(days) = config.get("daysToDisplay") {
        match days.as_i64() {
            Some(n) if (MIN_DAYS_TO_DISPLAY..=MAX_DAYS_TO_DISPLAY).contains(&n) => {}
            _ => fields.push(crate::error::FieldError::new(
                "daysToDisplay",
                format!("must be an integer between {MIN_DAYS_TO_DISPLAY} and {MAX_DAYS_TO_DISPLAY}"),
            )),
        }
    }

    if let Some(interval) = config.get("refreshIntervalMs") {
        match interval.as_i64() {
            Some(n) if n >= MIN_REFRESH_INTERVAL_MS => {}
            _ => fields.push(crate::error::FieldError::new(
                "refreshIntervalMs",
                format!("must be at least {MIN_REFRESH_INTERVAL_MS}"),
            )),
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}

fn validate_sessions(sessions: &Value, fields: &mut Vec<crate::error::FieldError>) {
    let Some(array) = sessions.as_array() else {
        fields.push(crate::error::FieldError::new("sessions", "must be an array"));
        return;
    };
    if array.is_empty() {
        fields.push(crate::error::FieldError::new("sessions", "must not be empty"));
        return;
    }

    let mut seen_ids = std::collections::HashSet::new();
    let mut seen_short_labels = std::collections::HashSet::new();
    for (index, session) in array.iter().enumerate() {
        let prefix = format!("sessions[{index}]");

        let id = session.get("id").and_then(Value::as_str).unwrap_or("");
        if id.is_empty() {
            fields.push(crate::error::FieldError::new(format!("{prefix}.id"), "must not be empty"));
        } else if !seen_ids.insert(id.to_string()) {
            fields.push(crate::error::FieldError::new(format!("{prefix}.id"), "must be unique within sessions"));
        }

        let label = session.get("label").and_then(Value::as_str).unwrap_or("");
        if label.is_empty() {
            fields.push(crate::error::FieldError::new(format!("{prefix}.label"), "must not be empty"));
        }

        let short_label = session.get("shortLabel").and_then(Value::as_str).unwrap_or("");
        if short_label.is_empty() {
            fields.push(crate::error::FieldError::new(
                format!("{prefix}.shortLabel"),
                "must not be empty",
            ));
        } else if short_label.chars().count() > MAX_SHORT_LABEL_LEN {
            fields.push(crate::error::FieldError::new(
                format!("{prefix}.shortLabel"),
                format!("must be at most {MAX_SHORT_LABEL_LEN} characters"),
            ));
        } else if !seen_short_labels.insert(short_label.to_string()) {
            fields.push(crate::error::FieldError::new(
                format!("{prefix}.shortLabel"),
                "must be unique within sessions",
            ));
        }

        let start = session.get("startTime").and_then(Value::as_str).unwrap_or("");
        let end = session.get("endTime").and_then(Value::as_str).unwrap_or("");
        if start.is_empty() || end.is_empty() || start >= end {
            fields.push(crate::error::FieldError::new(
                format!("{prefix}.startTime"),
                "startTime must be earlier than endTime",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_with_empty_patch_is_identity() {
        let base = json!({"a": 1, "b": {"c": 2}});
        assert_eq!(deep_merge(&base, &json!({})), base);
    }

    #[test]
    fn merge_preserves_unspecified_keys() {
        let base = json!({"a": 1, "b": 2});
        let merged = deep_merge(&base, &json!({"b": 3}));
        assert_eq!(merged, json!({"a": 1, "b": 3}));
    }

    #[test]
    fn merge_is_associative() {
        let base = json!({"a": {"x": 1, "y": 2}});
        let patch_a = json!({"a": {"x": 10}});
        let patch_b = json!({"a": {"y": 20}});

        let sequential = deep_merge(&deep_merge(&base, &patch_a), &patch_b);
        let combined = deep_merge(&base, &deep_merge(&patch_a, &patch_b));
        assert_eq!(sequential, combined);
    }

    #[test]
    fn merge_replaces_arrays_wholesale() {
        let base = json!({"sessions": [1, 2, 3]});
        let merged = deep_merge(&base, &json!({"sessions": [9]}));
        assert_eq!(merged, json!({"sessions": [9]}));
    }

    #[test]
    fn validates_hex_colors() {
        let config = json!({"colors": {"primary": "not-a-color"}});
        assert!(validate_display_config(&config).is_err());

        let config = json!({"colors": {"primary": "#1a2b3c"}});
        assert!(validate_display_config(&config).is_ok());
    }

    #[test]
    fn rejects_empty_session_list() {
        let config = json!({"sessions": []});
        assert!(validate_display_config(&config).is_err());
    }

    #[test]
    fn rejects_missing_session_id() {
        let config = json!({"sessions": [
            {"label": "Morning", "shortLabel": "AM", "startTime": "06:00", "endTime": "07:00"},
        ]});
        assert!(validate_display_config(&config).is_err());
    }

    #[test]
    fn rejects_duplicate_session_ids() {
        let config = json!({"sessions": [
            {"id": "1", "label": "Morning", "shortLabel": "AM", "startTime": "06:00", "endTime": "07:00"},
            {"id": "1", "label": "Evening", "shortLabel": "PM", "startTime": "18:00", "endTime": "19:00"},
        ]});
        assert!(validate_display_config(&config).is_err());
    }

    #[test]
    fn rejects_duplicate_short_labels() {
        let config = json!({"sessions": [
            {"id": "1", "label": "Morning", "shortLabel": "AM1", "startTime": "06:00", "endTime": "07:00"},
            {"id": "2", "label": "Morning 2", "shortLabel": "AM1", "startTime": "07:00", "endTime": "08:00"},
        ]});
        assert!(validate_display_config(&config).is_err());
    }

    #[test]
    fn rejects_reversed_time_window() {
        let config = json!({"sessions": [
            {"id": "1", "label": "Morning", "shortLabel": "AM", "startTime": "08:00", "endTime": "07:00"},
        ]});
        assert!(validate_display_config(&config).is_err());
    }

    #[test]
    fn rejects_short_label_over_length() {
        let config = json!({"sessions": [
            {"id": "1", "label": "Morning", "shortLabel": "TOOLONG", "startTime": "06:00", "endTime": "07:00"},
        ]});
        assert!(validate_display_config(&config).is_err());
    }

    #[test]
    fn rejects_out_of_range_days_to_display() {
        assert!(validate_display_config(&json!({"daysToDisplay": 0})).is_err());
        assert!(validate_display_config(&json!({"daysToDisplay": 15})).is_err());
        assert!(validate_display_config(&json!({"daysToDisplay": 7})).is_ok());
    }

    #[test]
    fn rejects_too_small_refresh_interval() {
        assert!(validate_display_config(&json!({"refreshIntervalMs": 1000})).is_err());
        assert!(validate_display_config(&json!({"refreshIntervalMs": 60_000})).is_ok());
    }
}
