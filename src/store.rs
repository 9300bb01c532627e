// Local record store: tasks, user records and the current session

use crate::config::{BackendKind, Config, DEFAULT_NAMESPACE};
use crate::error::{Result, StoreError};
use crate::file_storage::FileStorage;
use crate::ids::{generate_id, next_timestamp, now};
use crate::models::{NewTask, Task, TaskPatch, User, UserRecord};
use crate::record::{self, Record};
use crate::sqlite_storage::SqliteStorage;
use crate::storage::{MemoryStorage, Storage, validate_namespace};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Record store over an injected key-value backend.
///
/// Every operation reads the latest persisted state, so nothing is cached
/// between calls. Mutations run a full read-modify-write cycle under a
/// per-collection lock, which keeps them atomic with respect to each other
/// when the store is shared between threads.
///
/// A backend that cannot be reached is never reported to callers: reads come
/// back empty and writes are dropped, each with a warning in the log.
pub struct Store {
    backend: Box<dyn Storage>,
    namespace: String,
    tasks_lock: Mutex<()>,
    users_lock: Mutex<()>,
}

impl Store {
    /// Store using the default `taskflow` key namespace
    pub fn new<S: Storage + 'static>(backend: S) -> Self {
        Self::from_boxed(Box::new(backend), DEFAULT_NAMESPACE.to_string())
    }

    /// Store whose keys are prefixed with `namespace`.
    ///
    /// Fails when the namespace cannot form valid storage keys, rather than
    /// letting every later read and write be dropped as unavailable.
    pub fn with_namespace<S: Storage + 'static>(backend: S, namespace: impl Into<String>) -> eyre::Result<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        Ok(Self::from_boxed(Box::new(backend), namespace))
    }

    /// Open the backend described by `config`
    pub fn open(config: &Config) -> eyre::Result<Self> {
        validate_namespace(&config.namespace)?;

        let backend: Box<dyn Storage> = match config.backend {
            BackendKind::Memory => Box::new(MemoryStorage::new()),
            BackendKind::File => Box::new(FileStorage::open(&config.data_dir)?),
            BackendKind::Sqlite => Box::new(SqliteStorage::open(config.database_path())?),
        };

        info!(backend = ?config.backend, namespace = %config.namespace, "Opened record store");
        Ok(Self::from_boxed(backend, config.namespace.clone()))
    }

    fn from_boxed(backend: Box<dyn Storage>, namespace: String) -> Self {
        Self {
            backend,
            namespace,
            tasks_lock: Mutex::new(()),
            users_lock: Mutex::new(()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    /// All tasks in insertion order
    pub fn get_tasks(&self) -> Result<Vec<Task>> {
        self.load::<Task>()
    }

    /// Replace the whole task collection
    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        let _guard = lock(&self.tasks_lock);
        self.persist(tasks)
    }

    /// Append a new task with a fresh id and `created_at == updated_at == now`.
    ///
    /// The input is stored as given; checking for a non-empty title is up to
    /// the caller.
    pub fn create_task(&self, new: NewTask) -> Result<Task> {
        let _guard = lock(&self.tasks_lock);
        let mut tasks = self.load::<Task>()?;

        let id = fresh_id(|candidate| tasks.iter().any(|t| t.id == candidate));
        let task = Task::from_new(new, id, now());
        tasks.push(task.clone());
        self.persist(&tasks)?;

        info!(id = %task.id, count = tasks.len(), "Created task");
        Ok(task)
    }

    /// Merge `patch` over the task with this id and refresh its `updated_at`.
    ///
    /// Returns `None` and writes nothing when no task has this id.
    pub fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>> {
        let _guard = lock(&self.tasks_lock);
        let mut tasks = self.load::<Task>()?;

        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "update_task: no such task");
            return Ok(None);
        };

        patch.apply(task);
        task.updated_at = next_timestamp(task.updated_at);
        let updated = task.clone();
        self.persist(&tasks)?;

        info!(id, "Updated task");
        Ok(Some(updated))
    }

    /// Remove the task with this id. Returns whether anything was removed.
    pub fn delete_task(&self, id: &str) -> Result<bool> {
        let _guard = lock(&self.tasks_lock);
        let mut tasks = self.load::<Task>()?;

        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            debug!(id, "delete_task: no such task");
            return Ok(false);
        }

        self.persist(&tasks)?;
        info!(id, "Deleted task");
        Ok(true)
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// The current session, if any. Not checked against the stored users.
    pub fn get_user(&self) -> Result<Option<User>> {
        let key = self.key::<User>();
        self.read_entry(&key)
            .map(|raw| record::decode_record(&key, &raw))
            .transpose()
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        let key = self.key::<User>();
        let raw = record::encode(&key, user)?;
        self.write_entry(&key, &raw);
        Ok(())
    }

    /// Log out
    pub fn clear_user(&self) {
        let key = self.key::<User>();
        if let Err(e) = self.backend.remove_item(&key) {
            warn!(key = %key, error = %e, "Storage unavailable, session not cleared");
        }
    }

    // ========================================================================
    // User records
    // ========================================================================

    /// Add a user record and make it the current session.
    ///
    /// Emails are compared exactly, so `A@x.com` and `a@x.com` are different
    /// users. Nothing is written when the email is already taken.
    pub fn register_user(&self, email: &str, name: &str, password: &str) -> Result<User> {
        let _guard = lock(&self.users_lock);
        let mut users = self.load::<UserRecord>()?;

        if users.iter().any(|u| u.email == email) {
            info!(email, "Registration rejected, email already taken");
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }

        let record = UserRecord {
            id: fresh_id(|candidate| users.iter().any(|u| u.id == candidate)),
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        };
        let user = record.to_user();
        users.push(record);
        self.persist(&users)?;
        self.save_user(&user)?;

        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Check an exact `(email, password)` pair and start a session for it
    pub fn login_user(&self, email: &str, password: &str) -> Result<User> {
        let users = self.load::<UserRecord>()?;

        let user = users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .map(UserRecord::to_user)
            .ok_or(StoreError::InvalidCredentials)?;

        self.save_user(&user)?;
        info!(user_id = %user.id, "Logged in");
        Ok(user)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn key<T: Record>(&self) -> String {
        format!("{}_{}", self.namespace, T::collection_name())
    }

    fn load<T: Record>(&self) -> Result<Vec<T>> {
        let key = self.key::<T>();
        match self.read_entry(&key) {
            Some(raw) => record::decode_collection(&key, &raw),
            None => Ok(Vec::new()),
        }
    }

    fn persist<T: Record>(&self, records: &[T]) -> Result<()> {
        let key = self.key::<T>();
        let raw = record::encode(&key, records)?;
        self.write_entry(&key, &raw);
        debug!(key = %key, count = records.len(), "Persisted collection");
        Ok(())
    }

    fn read_entry(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Storage unavailable, treating entry as absent");
                None
            }
        }
    }

    fn write_entry(&self, key: &str, raw: &str) {
        if let Err(e) = self.backend.set_item(key, raw) {
            warn!(key, error = %e, "Storage unavailable, write dropped");
        }
    }
}

fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    // The guarded value is (), so a poisoned lock carries no broken state
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Generate ids until one is not already taken
fn fresh_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id();
        if !taken(&id) {
            return id;
        }
    }
}
