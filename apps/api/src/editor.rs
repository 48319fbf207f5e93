use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use crate::models::resume_data::default_data;
use crate::store::DataSink;

/// Holds the resume data currently open in the editor.
///
/// The store writes loaded resumes into it through [`DataSink`]; edits from the
/// UI replace it and are then handed to the store for auto-save.
pub struct EditorSession {
    current: RwLock<Value>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(default_data()),
        }
    }

    pub fn current(&self) -> Value {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, data: Value) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = data;
    }

    /// Sets one top-level field and returns the updated document.
    /// A non-object document is reset to the blank document first.
    pub fn update_field(&self, field: &str, value: Value) -> Value {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if !current.is_object() {
            *current = default_data();
        }
        if let Value::Object(fields) = &mut *current {
            fields.insert(field.to_string(), value);
        }
        current.clone()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSink for EditorSession {
    fn apply(&self, data: Value) {
        self.replace(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_starts_with_blank_document() {
        assert_eq!(EditorSession::new().current(), default_data());
    }

    #[test]
    fn test_update_field_sets_single_key() {
        let editor = EditorSession::new();
        let updated = editor.update_field("name", json!("Ann"));
        assert_eq!(updated["name"], "Ann");
        assert_eq!(updated["fontFamily"], "Georgia, serif");
        assert_eq!(editor.current(), updated);
    }

    #[test]
    fn test_update_field_on_non_object_resets_first() {
        let editor = EditorSession::new();
        editor.replace(json!([1, 2]));
        let updated = editor.update_field("email", json!("a@b.c"));
        assert_eq!(updated["email"], "a@b.c");
        assert!(updated.get("summary").is_some());
    }

    #[test]
    fn test_apply_replaces_document() {
        let editor = EditorSession::new();
        editor.apply(json!({"name": "Loaded"}));
        assert_eq!(editor.current(), json!({"name": "Loaded"}));
    }
}
