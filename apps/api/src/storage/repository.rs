use serde_json::Value;
use tracing::warn;

use crate::models::resume::Resume;
use crate::storage::{KeyValueStore, StorageError};

/// Key holding the serialized resume collection.
pub const RESUMES_KEY: &str = "rm_resumes";
/// Key holding the id of the resume restored on the next session start.
pub const ACTIVE_KEY: &str = "rm_activeResumeId";

/// Persistence seam for the resume collection and the active-resume pointer.
///
/// The collection is always read and written whole. Reads are fail-soft:
/// anything unreadable is treated as absent and logged, never returned as an error.
pub trait ResumeRepository: Send + Sync {
    fn read_all(&self) -> Vec<Resume>;
    fn write_all(&self, resumes: &[Resume]) -> Result<(), StorageError>;
    fn active_id(&self) -> Option<String>;
    /// `None` removes the pointer.
    fn set_active_id(&self, id: Option<&str>) -> Result<(), StorageError>;
}

pub struct KvResumeRepository<S> {
    kv: S,
}

impl<S: KeyValueStore> KvResumeRepository<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    #[cfg(test)]
    pub fn kv(&self) -> &S {
        &self.kv
    }
}

impl<S: KeyValueStore> ResumeRepository for KvResumeRepository<S> {
    fn read_all(&self) -> Vec<Resume> {
        let raw = match self.kv.get(RESUMES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read resume collection, treating as empty: {e}");
                return Vec::new();
            }
        };

        let records: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Stored resume collection is not a JSON array, treating as empty: {e}");
                return Vec::new();
            }
        };

        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(resume) => Some(resume),
                Err(e) => {
                    warn!("Skipping stored entry {index}, not a resume record: {e}");
                    None
                }
            })
            .collect()
    }

    fn write_all(&self, resumes: &[Resume]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(resumes)?;
        self.kv.set(RESUMES_KEY, &raw)
    }

    fn active_id(&self) -> Option<String> {
        match self.kv.get(ACTIVE_KEY) {
            Ok(Some(raw)) => parse_pointer(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read active resume pointer: {e}");
                None
            }
        }
    }

    fn set_active_id(&self, id: Option<&str>) -> Result<(), StorageError> {
        match id {
            Some(id) => self.kv.set(ACTIVE_KEY, id),
            None => self.kv.remove(ACTIVE_KEY),
        }
    }
}

/// The pointer is stored as a bare id; a JSON-quoted id is accepted too.
fn parse_pointer(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let id = if trimmed.starts_with('"') {
        serde_json::from_str::<String>(trimmed).ok()?
    } else {
        trimmed.to_string()
    };
    (!id.is_empty()).then_some(id)
}
