// crates/types/src/details.rs
//! Opaque job payload forwarded verbatim by the event registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error converting a typed value into [`JobDetails`].
#[derive(Debug, Error)]
pub enum DetailsError {
    #[error("job details must serialize to a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error("job details serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Open-ended job payload: a JSON object keyed by string.
///
/// The event registry never reads or validates this shape; its meaning is a
/// contract between the producer that pushes it and the views that consume
/// it. Producers with a typed update available go through
/// [`JobStateUpdate::into_details`](crate::JobStateUpdate::into_details).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDetails(Map<String, Value>);

impl JobDetails {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build from any serializable value that maps to a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, DetailsError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DetailsError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for JobDetails {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<JobDetails> for Map<String, Value> {
    fn from(details: JobDetails) -> Self {
        details.0
    }
}

impl FromIterator<(String, Value)> for JobDetails {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for JobDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn insert_and_get() {
        let mut details = JobDetails::new();
        assert!(details.is_empty());

        details.insert("status", "RUNNING");
        details.insert("rowCount", 42);

        assert_eq!(details.len(), 2);
        assert_eq!(details.get("status"), Some(&json!("RUNNING")));
        assert_eq!(details.get("rowCount"), Some(&json!(42)));
        assert_eq!(details.get("missing"), None);
    }

    #[test]
    fn from_serialize_accepts_objects_only() {
        #[derive(Serialize)]
        struct Shape {
            name: &'static str,
        }

        let details = JobDetails::from_serialize(&Shape { name: "reflection" }).unwrap();
        assert_eq!(details.get("name"), Some(&json!("reflection")));

        let err = JobDetails::from_serialize(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, DetailsError::NotAnObject { kind: "array" }));

        let err = JobDetails::from_serialize(&"bare string").unwrap_err();
        assert!(matches!(err, DetailsError::NotAnObject { kind: "string" }));
    }

    #[test]
    fn transparent_serde_round_trip() {
        let details: JobDetails = serde_json::from_str(r#"{"a":1,"b":"two"}"#).unwrap();
        assert_eq!(details.len(), 2);

        let json = serde_json::to_string(&details).unwrap();
        let back: JobDetails = serde_json::from_str(&json).unwrap();
        assert_eq!(back, details);
    }

    #[test]
    fn display_is_compact_json() {
        let mut details = JobDetails::new();
        details.insert("id", "j1");
        assert_eq!(details.to_string(), r#"{"id":"j1"}"#);
    }
}
