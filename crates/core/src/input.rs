//! Serde helpers for request payloads.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};

/// Treat `""` and `null` as an absent value.
///
/// Form-style clients send empty strings for unset choice fields.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Distinguish a missing field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use together with `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ojt_db::entities::user::Course;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "empty_as_none")]
        course: Option<Course>,
        #[serde(default, deserialize_with = "nullable")]
        allowance: Option<Option<i32>>,
    }

    #[test]
    fn test_empty_string_is_none() {
        let p: Payload = serde_json::from_str(r#"{"course": ""}"#).unwrap();
        assert_eq!(p.course, None);

        let p: Payload = serde_json::from_str(r#"{"course": "cit"}"#).unwrap();
        assert_eq!(p.course, Some(Course::Cit));

        assert!(serde_json::from_str::<Payload>(r#"{"course": "law"}"#).is_err());
    }

    #[test]
    fn test_nullable_distinguishes_missing_and_null() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(p.allowance, None);

        let p: Payload = serde_json::from_str(r#"{"allowance": null}"#).unwrap();
        assert_eq!(p.allowance, Some(None));

        let p: Payload = serde_json::from_str(r#"{"allowance": 5}"#).unwrap();
        assert_eq!(p.allowance, Some(Some(5)));
    }
}
