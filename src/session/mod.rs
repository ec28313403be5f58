//! Saved draft invoices ("sessions") and autocomplete history
//!
//! The store keeps every session in memory and writes through to an
//! injected [`StorageBackend`] on each mutation. Exactly one session is
//! active at a time, or none once the last one is deleted.

mod storage;
mod suggest;

pub use storage::{Clock, MemoryStorage, SteppingClock, StorageBackend, SystemClock};
pub use suggest::SuggestionList;

use crate::document::OrderMetadata;
use crate::error::StoreError;
use crate::grid::{AxisSigns, GridEntryRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Storage key of the session record (id -> session)
pub const SESSIONS_KEY: &str = "lens_order.sessions";
/// Storage key of the active session id
pub const ACTIVE_SESSION_KEY: &str = "lens_order.active_session";
/// Storage key of remembered client names
pub const CLIENT_NAMES_KEY: &str = "lens_order.client_names";
/// Storage key of remembered lens types
pub const LENS_TYPES_KEY: &str = "lens_order.lens_types";

/// A named snapshot of an in-progress order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub order_metadata: OrderMetadata,
    #[serde(default)]
    pub grid_entries: Vec<GridEntryRecord>,
    #[serde(default)]
    pub axis_signs: AxisSigns,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Session {
    /// Total number of lenses ordered
    pub fn total_lenses(&self) -> u64 {
        self.grid_entries.iter().map(|e| e.quantity as u64).sum()
    }

    /// Case-insensitive match on name, client name and lens type.
    /// `term` must already be lowercase.
    fn matches(&self, term: &str) -> bool {
        [
            &self.name,
            &self.order_metadata.client_name,
            &self.order_metadata.lens_type,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
    }
}

/// What happened to the active pointer after a delete
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// An inactive session was removed
    Removed,
    /// The active session was removed and this one took its place
    Activated(Session),
    /// The active session was the last one; the user must create a new one
    NeedsNewSession,
}

/// Keyed collection of sessions with an active pointer
pub struct SessionStore<S: StorageBackend> {
    storage: S,
    clock: Box<dyn Clock>,
    sessions: BTreeMap<String, Session>,
    active: Option<String>,
    client_names: SuggestionList,
    lens_types: SuggestionList,
    next_seq: u64,
}

impl<S: StorageBackend> SessionStore<S> {
    /// Load persisted state from `storage`.
    ///
    /// A dangling active pointer is dropped rather than trusted.
    pub fn open(storage: S, clock: Box<dyn Clock>) -> Result<Self, StoreError> {
        let sessions: BTreeMap<String, Session> = read_json(&storage, SESSIONS_KEY)?;
        let client_names = read_json(&storage, CLIENT_NAMES_KEY)?;
        let lens_types = read_json(&storage, LENS_TYPES_KEY)?;

        let active = storage
            .get(ACTIVE_SESSION_KEY)?
            .filter(|id| sessions.contains_key(id));

        tracing::info!(
            sessions = sessions.len(),
            active = active.as_deref().unwrap_or("-"),
            "opened session store"
        );

        Ok(Self {
            storage,
            clock,
            sessions,
            active,
            client_names,
            lens_types,
            next_seq: 0,
        })
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref().and_then(|id| self.sessions.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// The backing storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// Create a blank, named session and make it active
    pub fn create(&mut self, name: &str) -> Result<&Session, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        let now = self.clock.now();
        let id = self.next_id(now);
        let session = Session {
            id: id.clone(),
            name: name.to_string(),
            order_metadata: OrderMetadata::fresh(now),
            grid_entries: Vec::new(),
            axis_signs: AxisSigns::default(),
            updated_at: now,
        };

        tracing::info!(id = %id, name = %name, "created session");
        self.sessions.insert(id.clone(), session);
        self.persist_sessions()?;
        self.set_active(Some(id.clone()))?;
        Ok(&self.sessions[&id])
    }

    /// Mark a session active and return its snapshot
    pub fn load(&mut self, id: &str) -> Result<Session, StoreError> {
        let session = self
            .sessions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownSession(id.to_string()))?;
        self.set_active(Some(id.to_string()))?;
        tracing::info!(id = %id, "loaded session");
        Ok(session)
    }

    /// Upsert the snapshot for `id` and refresh its timestamp
    pub fn save(
        &mut self,
        id: &str,
        metadata: &OrderMetadata,
        grid_entries: Vec<GridEntryRecord>,
        signs: AxisSigns,
    ) -> Result<(), StoreError> {
        let now = self.clock.now();
        let session = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| Session {
                id: id.to_string(),
                name: metadata.order_id.clone(),
                order_metadata: OrderMetadata::default(),
                grid_entries: Vec::new(),
                axis_signs: AxisSigns::default(),
                updated_at: now,
            });
        session.order_metadata = metadata.clone();
        session.grid_entries = grid_entries;
        session.axis_signs = signs;
        session.updated_at = now;

        tracing::trace!(id = %id, "saved session");
        self.persist_sessions()
    }

    /// Remove a session; if it was active, fall back to the most recently
    /// updated remaining one.
    pub fn delete(&mut self, id: &str) -> Result<DeleteOutcome, StoreError> {
        let Some(removed) = self.sessions.remove(id) else {
            return Err(StoreError::UnknownSession(id.to_string()));
        };
        if let Err(err) = self.persist_sessions() {
            self.sessions.insert(id.to_string(), removed);
            return Err(err);
        }
        tracing::info!(id = %id, "deleted session");

        if self.active.as_deref() != Some(id) {
            return Ok(DeleteOutcome::Removed);
        }
        // never point at a removed session, even if the fallback fails
        self.active = None;

        let next = self.list(None).first().map(|s| s.id.clone());
        match next {
            Some(next) => Ok(DeleteOutcome::Activated(self.load(&next)?)),
            None => {
                self.set_active(None)?;
                Ok(DeleteOutcome::NeedsNewSession)
            }
        }
    }

    /// Sessions, most recently updated first, optionally filtered
    pub fn list(&self, search: Option<&str>) -> Vec<&Session> {
        let term = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        let mut sessions: Vec<&Session> = self
            .sessions
            .values()
            .filter(|s| term.is_empty() || s.matches(&term))
            .collect();
        sessions.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        sessions
    }

    pub fn client_names(&self) -> &SuggestionList {
        &self.client_names
    }

    pub fn lens_types(&self) -> &SuggestionList {
        &self.lens_types
    }

    /// Remember the client name and lens type of an order for autocomplete
    pub fn remember_suggestions(&mut self, metadata: &OrderMetadata) -> Result<(), StoreError> {
        if self.client_names.remember(&metadata.client_name) {
            write_json(&mut self.storage, CLIENT_NAMES_KEY, &self.client_names)?;
        }
        if self.lens_types.remember(&metadata.lens_type) {
            write_json(&mut self.storage, LENS_TYPES_KEY, &self.lens_types)?;
        }
        Ok(())
    }

    fn set_active(&mut self, id: Option<String>) -> Result<(), StoreError> {
        match &id {
            Some(id) => self.storage.set(ACTIVE_SESSION_KEY, id)?,
            None => self.storage.remove(ACTIVE_SESSION_KEY)?,
        }
        self.active = id;
        Ok(())
    }

    fn persist_sessions(&mut self) -> Result<(), StoreError> {
        write_json(&mut self.storage, SESSIONS_KEY, &self.sessions)
    }

    fn next_id(&mut self, now: OffsetDateTime) -> String {
        let millis = (now.unix_timestamp_nanos() / 1_000_000).unsigned_abs();
        loop {
            let id = format!("inv-{:x}-{}", millis, self.next_seq);
            self.next_seq += 1;
            if !self.sessions.contains_key(&id) {
                return id;
            }
        }
    }
}

fn read_json<T, S>(storage: &S, key: &str) -> Result<T, StoreError>
where
    T: serde::de::DeserializeOwned + Default,
    S: StorageBackend,
{
    match storage.get(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(T::default()),
    }
}

fn write_json<T, S>(storage: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    S: StorageBackend,
{
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)
}
