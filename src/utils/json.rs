use serde::de::DeserializeOwned;
use serde_json::Value;

/// How a single field appeared in a PATCH body.
#[derive(Debug, PartialEq)]
pub enum NullableValue<T> {
    Omitted,
    Null,
    Value(T),
}

impl<T> NullableValue<T> {
    /// Changeset form for a nullable column: `None` leaves it alone,
    /// `Some(None)` clears it.
    pub fn into_change(self) -> Option<Option<T>> {
        match self {
            NullableValue::Omitted => None,
            NullableValue::Null => Some(None),
            NullableValue::Value(value) => Some(Some(value)),
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, NullableValue::Omitted)
    }
}

pub fn classify_nullable<T: DeserializeOwned>(
    body: &Value,
    field: &str,
) -> Result<NullableValue<T>, String> {
    match body.get(field) {
        None => Ok(NullableValue::Omitted),
        Some(Value::Null) => Ok(NullableValue::Null),
        Some(other) => serde_json::from_value(other.clone())
            .map(NullableValue::Value)
            .map_err(|err| format!("invalid value for {field}: {err}")),
    }
}

/// Like [`classify_nullable`] for columns that cannot be cleared.
pub fn classify_required<T: DeserializeOwned>(body: &Value, field: &str) -> Result<Option<T>, String> {
    match classify_nullable(body, field)? {
        NullableValue::Omitted => Ok(None),
        NullableValue::Null => Err(format!("{field} cannot be null")),
        NullableValue::Value(value) => Ok(Some(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn distinguishes_missing_null_and_present() {
        let body = json!({ "notes": null, "beds": 3 });
        assert_eq!(
            classify_nullable::<String>(&body, "title").unwrap(),
            NullableValue::Omitted
        );
        assert_eq!(
            classify_nullable::<String>(&body, "notes").unwrap(),
            NullableValue::Null
        );
        assert_eq!(
            classify_nullable::<i32>(&body, "beds").unwrap(),
            NullableValue::Value(3)
        );
    }

    #[test]
    fn required_fields_reject_null_and_wrong_types() {
        let body = json!({ "title": null, "featured": "yes" });
        assert!(classify_required::<String>(&body, "title").is_err());
        assert!(classify_required::<bool>(&body, "featured").is_err());
        assert_eq!(classify_required::<bool>(&body, "missing").unwrap(), None);
    }

    #[test]
    fn into_change_maps_to_changeset_shape() {
        assert_eq!(NullableValue::<i32>::Omitted.into_change(), None);
        assert_eq!(NullableValue::<i32>::Null.into_change(), Some(None));
        assert_eq!(NullableValue::Value(2).into_change(), Some(Some(2)));
    }
}
