// Taskflow - local record store for tasks, user records and the current session

pub mod config;
pub mod error;
pub mod file_storage;
pub mod filter;
pub mod ids;
pub mod models;
pub mod record;
pub mod sqlite_storage;
pub mod storage;
pub mod store;
pub mod validate;

// Re-export main types for convenience
pub use config::{BackendKind, Config};
pub use error::StoreError;
pub use file_storage::FileStorage;
pub use filter::{TaskFilter, TaskStats};
pub use models::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus, User, UserRecord};
pub use record::Record;
pub use sqlite_storage::SqliteStorage;
pub use storage::{MemoryStorage, Storage, UnavailableStorage};
pub use store::Store;
