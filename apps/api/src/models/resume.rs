use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A persisted resume. `data` is opaque to the store: any JSON document is accepted.
///
/// Decoding never rejects an object: odd field shapes written by older clients
/// fall back to defaults so one record cannot hide the rest of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub data: Value,
    /// Fields this service does not know about, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resume {
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            updated_at: Utc::now(),
            data,
            extra: Map::new(),
        }
    }

    #[cfg(test)]
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self::with_id(new_resume_id(), name, data)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> ResumeSummary {
        ResumeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Listing projection of a resume, without its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
}

/// Strings pass through, numbers and booleans are stringified, anything else is empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Accepts RFC 3339 strings and epoch milliseconds; anything else reads as the epoch.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_default(),
        _ => DateTime::default(),
    })
}

pub fn new_resume_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates an id not already used in `existing`.
pub fn unique_resume_id(existing: &[Resume]) -> String {
    loop {
        let id = new_resume_id();
        if !existing.iter().any(|r| r.id == id) {
            return id;
        }
    }
}

/// Returns the record with the latest `updated_at`; ties go to the first one encountered.
pub fn most_recent(resumes: &[Resume]) -> Option<&Resume> {
    resumes.iter().fold(None, |latest: Option<&Resume>, candidate| match latest {
        Some(current) if current.updated_at >= candidate.updated_at => Some(current),
        _ => Some(candidate),
    })
}
