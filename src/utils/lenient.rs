//! Serde helpers for loosely typed JSON coming from callers and upstreams.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treat an explicit `null` the same as an absent field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept an identifier given either as a JSON string or a JSON number.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Like [`string_or_number`], for identifiers that must be present.
pub fn required_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_number(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a string or numeric id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "null_as_default")]
        names: Vec<String>,
        #[serde(default, deserialize_with = "string_or_number")]
        id: Option<String>,
    }

    #[test]
    fn null_and_missing_become_default() {
        let nulls: Sample = serde_json::from_value(json!({"names": null, "id": null})).unwrap();
        assert!(nulls.names.is_empty());
        assert_eq!(nulls.id, None);

        let missing: Sample = serde_json::from_value(json!({})).unwrap();
        assert!(missing.names.is_empty());
        assert_eq!(missing.id, None);
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let sample: Sample = serde_json::from_value(json!({"id": 1784512})).unwrap();
        assert_eq!(sample.id.as_deref(), Some("1784512"));
        let sample: Sample = serde_json::from_value(json!({"id": "17_84"})).unwrap();
        assert_eq!(sample.id.as_deref(), Some("17_84"));
    }
}
