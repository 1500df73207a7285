//! Applying client-supplied field maps to records.
//!
//! Each record kind lists the fields it accepts in its [`Patch`] type, with
//! one typed setter per field name. Decoding happens in full before the
//! record is touched, so a bad field leaves the target unchanged.

use crate::error::{StoreError, StoreResult};
use crate::qb::FieldValues;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A decoded, typed set of changes for one record kind.
pub trait Patch: Sized {
    /// Decode a field map. Unknown names, wrongly-typed values and the
    /// identity field are rejected.
    fn from_fields(fields: &Map<String, Value>) -> StoreResult<Self>;

    /// The changed columns, in declaration order, for a partial UPDATE.
    fn field_values(&self) -> FieldValues;

    /// True when the patch changes nothing.
    fn is_empty(&self) -> bool {
        self.field_values().present_count() == 0
    }
}

/// A record that accepts a [`Patch`].
pub trait Patchable {
    type Patch: Patch;

    /// Copy every present field of `patch` onto `self`.
    fn apply(&mut self, patch: Self::Patch);
}

/// Decode `fields` and apply them to `target`.
///
/// Either every field is applied or none is.
pub fn apply_patch<T: Patchable>(target: &mut T, fields: &Map<String, Value>) -> StoreResult<()> {
    let patch = T::Patch::from_fields(fields)?;
    target.apply(patch);
    Ok(())
}

/// Decode one field value, naming the field in the error.
pub fn decode_field<T: DeserializeOwned>(name: &str, value: &Value) -> StoreResult<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| StoreError::validation(format!("invalid value for {}: {}", name, e)))
}

/// Error for a field name the record kind does not accept.
pub fn unknown_field(name: &str) -> StoreError {
    StoreError::validation(format!("unknown field: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Note {
        id: i32,
        title: String,
        body: Option<String>,
    }

    #[derive(Debug, Default)]
    struct NotePatch {
        title: Option<String>,
        body: Option<Option<String>>,
    }

    impl Patch for NotePatch {
        fn from_fields(fields: &Map<String, Value>) -> StoreResult<Self> {
            let mut patch = NotePatch::default();
            for (name, value) in fields {
                match name.as_str() {
                    "id" => return Err(StoreError::immutable("Can't change note id!")),
                    "title" => patch.title = Some(decode_field(name, value)?),
                    "body" => patch.body = Some(decode_field(name, value)?),
                    other => return Err(unknown_field(other)),
                }
            }
            Ok(patch)
        }

        fn field_values(&self) -> FieldValues {
            let mut fields = FieldValues::new();
            fields
                .set_opt("title", self.title.clone())
                .set_nullable("body", self.body.clone());
            fields
        }
    }

    impl Patchable for Note {
        type Patch = NotePatch;

        fn apply(&mut self, patch: NotePatch) {
            if let Some(title) = patch.title {
                self.title = title;
            }
            if let Some(body) = patch.body {
                self.body = body;
            }
        }
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn applies_permitted_fields() {
        let mut note = Note {
            id: 1,
            title: "old".into(),
            body: Some("text".into()),
        };
        apply_patch(&mut note, &fields(json!({"title": "new", "body": null}))).unwrap();
        assert_eq!(note.id, 1);
        assert_eq!(note.title, "new");
        assert_eq!(note.body, None);
    }

    #[test]
    fn identity_field_is_rejected_and_nothing_changes() {
        let mut note = Note {
            id: 1,
            title: "old".into(),
            body: None,
        };
        let err = apply_patch(&mut note, &fields(json!({"title": "new", "id": 2}))).unwrap_err();
        assert!(err.is_immutable());
        assert_eq!(note.id, 1);
        assert_eq!(note.title, "old");
    }

    #[test]
    fn unknown_and_mistyped_fields_are_validation_errors() {
        let mut note = Note::default();
        let err = apply_patch(&mut note, &fields(json!({"color": "red"}))).unwrap_err();
        assert_eq!(err.to_string(), "unknown field: color");

        let err = apply_patch(&mut note, &fields(json!({"title": 5}))).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("invalid value for title"));
    }

    #[test]
    fn field_values_distinguish_absent_from_null() {
        let patch = NotePatch::from_fields(&fields(json!({"body": null}))).unwrap();
        let values = patch.field_values();
        assert_eq!(values.present_names(), vec!["body"]);
        assert!(!patch.is_empty());
        assert!(NotePatch::default().is_empty());
    }
}
