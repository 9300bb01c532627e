// Storable record trait and the encode/decode boundary for stored entries

use crate::error::{Result, StoreError};
use crate::models::{Task, User, UserRecord};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashSet;

/// Core trait that any storable record must implement
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Collection name for this record type (e.g., "tasks", "users").
    /// Determines the storage key: {namespace}_{collection}
    fn collection_name() -> &'static str
    where
        Self: Sized;

    /// Shape checks beyond what deserialization already enforces
    fn validate(&self) -> std::result::Result<(), String> {
        validate_id(self.id())
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "tasks"
    }

    fn validate(&self) -> std::result::Result<(), String> {
        validate_id(&self.id)?;
        if self.updated_at < self.created_at {
            return Err(format!("task {} was updated before it was created", self.id));
        }
        Ok(())
    }
}

impl Record for UserRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "users"
    }
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "user"
    }
}

/// Validate record ID
pub fn validate_id(id: &str) -> std::result::Result<(), String> {
    if id.trim().is_empty() {
        return Err("Record ID cannot be empty or whitespace-only".to_string());
    }

    if id.len() > 256 {
        return Err(format!("Record ID too long: {} chars (max 256)", id.len()));
    }

    Ok(())
}

/// Decode a whole stored collection, rejecting malformed entries
pub fn decode_collection<T: Record>(key: &str, raw: &str) -> Result<Vec<T>> {
    let records: Vec<T> = serde_json::from_str(raw).map_err(|e| StoreError::corrupt(key, e))?;

    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        record.validate().map_err(|reason| StoreError::corrupt(key, reason))?;
        if !seen.insert(record.id()) {
            return Err(StoreError::corrupt(key, format!("duplicate id {}", record.id())));
        }
    }

    Ok(records)
}

/// Decode a single stored record
pub fn decode_record<T: Record>(key: &str, raw: &str) -> Result<T> {
    let record: T = serde_json::from_str(raw).map_err(|e| StoreError::corrupt(key, e))?;
    record.validate().map_err(|reason| StoreError::corrupt(key, reason))?;
    Ok(record)
}

pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASKS: &str = r#"[
        {"id":"t1","title":"One","description":"","priority":"low","status":"todo",
         "createdAt":"2025-01-01T00:00:00.000Z","updatedAt":"2025-01-01T00:00:00.000Z"},
        {"id":"t2","title":"Two","description":"d","priority":"high","status":"completed",
         "dueDate":"2025-02-01",
         "createdAt":"2025-01-01T00:00:00.000Z","updatedAt":"2025-01-03T00:00:00.000Z"}
    ]"#;

    #[test]
    fn test_collection_names() {
        assert_eq!(Task::collection_name(), "tasks");
        assert_eq!(UserRecord::collection_name(), "users");
        assert_eq!(User::collection_name(), "user");
    }

    #[test]
    fn test_decode_collection_keeps_order() {
        let tasks: Vec<Task> = decode_collection("k", TASKS).unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_decode_collection_rejects_malformed_json() {
        let err = decode_collection::<Task>("taskflow_tasks", "{not json").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "taskflow_tasks"));
    }

    #[test]
    fn test_decode_collection_rejects_missing_field() {
        let raw = r#"[{"id":"t1","title":"One","priority":"low","status":"todo",
            "createdAt":"2025-01-01T00:00:00.000Z","updatedAt":"2025-01-01T00:00:00.000Z"}]"#;
        assert!(decode_collection::<Task>("k", raw).is_err());
    }

    #[test]
    fn test_decode_collection_rejects_duplicate_ids() {
        let raw = r#"[{"id":"u1","email":"a@x.com","name":"A","password":"p"},
                      {"id":"u1","email":"b@x.com","name":"B","password":"p"}]"#;
        let err = decode_collection::<UserRecord>("k", raw).unwrap_err();
        assert!(err.to_string().contains("duplicate id u1"));
    }

    #[test]
    fn test_decode_collection_rejects_time_travel() {
        let raw = r#"[{"id":"t1","title":"One","description":"","priority":"low","status":"todo",
            "createdAt":"2025-01-02T00:00:00.000Z","updatedAt":"2025-01-01T00:00:00.000Z"}]"#;
        assert!(decode_collection::<Task>("k", raw).is_err());
    }

    #[test]
    fn test_decode_record_rejects_blank_id() {
        let raw = r#"{"id":"  ","email":"a@x.com","name":"A"}"#;
        assert!(decode_record::<User>("k", raw).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("abc").is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id("   ").is_err());
        assert!(validate_id(&"a".repeat(257)).is_err());
    }
}
