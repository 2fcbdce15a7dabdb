//! Session registry holding the current dataset snapshot per user session.
//!
//! The engine itself is stateless; a front end keeps one snapshot per session
//! here and replaces it after every applied action. [`SessionStore::update`]
//! holds a per-session lock across read, apply and write, so two actions on
//! the same session never interleave while different sessions proceed in
//! parallel.

use crate::dataset::Dataset;
use crate::engine::{self, ActionReport, Params};
use crate::error::{DatawashError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = DatawashError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| DatawashError::Session(format!("invalid session id '{s}': {e}")))
    }
}

/// Storage for per-session dataset snapshots.
pub trait SessionStore: Send + Sync {
    /// Start a new session holding `dataset`.
    fn insert(&self, dataset: Dataset) -> Result<SessionId>;

    /// Copy of the current snapshot.
    fn get(&self, id: SessionId) -> Result<Dataset>;

    /// Replace the snapshot, creating the session if it does not exist.
    fn put(&self, id: SessionId, dataset: Dataset) -> Result<()>;

    fn delete(&self, id: SessionId) -> Result<()>;

    /// Atomically replace the snapshot with `f(current)`.
    fn update(&self, id: SessionId, f: &mut dyn FnMut(&Dataset) -> Dataset) -> Result<()>;
}

/// Process-local [`SessionStore`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Dataset>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<SessionId, Arc<Mutex<Dataset>>>>> {
        self.sessions
            .read()
            .map_err(|e| DatawashError::Session(format!("Lock poisoned: {e}")))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<SessionId, Arc<Mutex<Dataset>>>>> {
        self.sessions
            .write()
            .map_err(|e| DatawashError::Session(format!("Lock poisoned: {e}")))
    }

    fn slot(&self, id: SessionId) -> Result<Arc<Mutex<Dataset>>> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or_else(|| DatawashError::Session(format!("Session not found: {id}")))
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, dataset: Dataset) -> Result<SessionId> {
        let id = SessionId::new();
        self.write()?.insert(id, Arc::new(Mutex::new(dataset)));
        info!(session = %id, "Session created");
        Ok(id)
    }

    fn get(&self, id: SessionId) -> Result<Dataset> {
        let slot = self.slot(id)?;
        let dataset = slot
            .lock()
            .map_err(|e| DatawashError::Session(format!("Lock poisoned: {e}")))?;
        Ok(dataset.clone())
    }

    fn put(&self, id: SessionId, dataset: Dataset) -> Result<()> {
        let existing = self.read()?.get(&id).cloned();
        match existing {
            Some(slot) => {
                let mut current = slot
                    .lock()
                    .map_err(|e| DatawashError::Session(format!("Lock poisoned: {e}")))?;
                *current = dataset;
            }
            None => {
                self.write()?.insert(id, Arc::new(Mutex::new(dataset)));
            }
        }
        Ok(())
    }

    fn delete(&self, id: SessionId) -> Result<()> {
        if self.write()?.remove(&id).is_none() {
            return Err(DatawashError::Session(format!("Session not found: {id}")));
        }
        debug!(session = %id, "Session deleted");
        Ok(())
    }

    fn update(&self, id: SessionId, f: &mut dyn FnMut(&Dataset) -> Dataset) -> Result<()> {
        // The map lock is released before the session lock is taken, so a
        // long action never blocks other sessions.
        let slot = self.slot(id)?;
        let mut current = slot
            .lock()
            .map_err(|e| DatawashError::Session(format!("Lock poisoned: {e}")))?;
        *current = f(&current);
        Ok(())
    }
}

/// Apply one action to a session's current snapshot and store the result.
///
/// Skipped and rejected actions leave the snapshot as it was; their reason is
/// in the returned report.
///
/// # Errors
///
/// Returns [`DatawashError::Session`] if the session does not exist or its
/// lock is poisoned.
pub fn apply_in_session(
    store: &dyn SessionStore,
    id: SessionId,
    action: &str,
    params: &Params,
) -> Result<ActionReport> {
    let mut report = None;
    store.update(id, &mut |current: &Dataset| {
        let outcome = engine::apply(current, action, params);
        report = Some(outcome.report);
        outcome.dataset
    })?;
    report.ok_or_else(|| DatawashError::Session(format!("No report produced for session {id}")))
}
