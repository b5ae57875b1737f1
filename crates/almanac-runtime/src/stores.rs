//! External collaborator interfaces
//!
//! The core consumes three collaborators, each behind a trait: a key/value
//! settings store, a note store keyed by calendar date, and a broadcast
//! transport. In-memory implementations back tests and embedding hosts
//! that bring no store of their own.

use std::collections::HashMap;
use std::sync::Arc;

use almanac_core::AlmanacResult;
use almanac_sync::{Message, NoteRecord};
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;

/// Key/value settings store with get/set/register operations
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> AlmanacResult<()>;

    /// Declare a key with a default used when nothing is stored yet
    fn register(&mut self, key: &str, default: Value);
}

/// Document store for notes, exposing only day-level visibility and save
pub trait NoteStore {
    /// Notes visible for one calendar day
    fn notes_for_day(&self, year: i64, month: usize, day: u32) -> Vec<NoteRecord>;

    fn save(&mut self, note: NoteRecord) -> AlmanacResult<()>;
}

/// Broadcast transport: fire an envelope at every other connected client
///
/// Delivery is best effort; the returned flag reports whether the transport
/// accepted the envelope. Incoming messages arrive by the host invoking
/// `Client::receive` from its own transport handler.
pub trait Broadcast {
    fn emit(&mut self, msg: &Message) -> AlmanacResult<bool>;
}

/// In-memory settings store
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        MemorySettings::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> AlmanacResult<()> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    fn register(&mut self, key: &str, default: Value) {
        self.values.entry(key.to_owned()).or_insert(default);
    }
}

/// In-memory note store
#[derive(Debug, Default)]
pub struct MemoryNotes {
    notes: Vec<NoteRecord>,
}

impl MemoryNotes {
    pub fn new() -> Self {
        MemoryNotes::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl NoteStore for MemoryNotes {
    fn notes_for_day(&self, year: i64, month: usize, day: u32) -> Vec<NoteRecord> {
        self.notes
            .iter()
            .filter(|n| n.year == year && n.month == month && n.day == day)
            .cloned()
            .collect()
    }

    fn save(&mut self, note: NoteRecord) -> AlmanacResult<()> {
        if let Some(existing) = self.notes.iter_mut().find(|n| n.id == note.id) {
            *existing = note;
        } else {
            self.notes.push(note);
        }
        Ok(())
    }
}

/// Shared handle around a collaborator
///
/// Hosts usually keep their own reference to a store while the client owns
/// another; cloning the handle shares the underlying value.
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    pub fn new(inner: T) -> Self {
        Shared(Arc::new(Mutex::new(inner)))
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T: SettingsStore> SettingsStore for Shared<T> {
    fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> AlmanacResult<()> {
        self.lock().set(key, value)
    }

    fn register(&mut self, key: &str, default: Value) {
        self.lock().register(key, default);
    }
}

impl<T: NoteStore> NoteStore for Shared<T> {
    fn notes_for_day(&self, year: i64, month: usize, day: u32) -> Vec<NoteRecord> {
        self.lock().notes_for_day(year, month, day)
    }

    fn save(&mut self, note: NoteRecord) -> AlmanacResult<()> {
        self.lock().save(note)
    }
}

impl<T: Broadcast> Broadcast for Shared<T> {
    fn emit(&mut self, msg: &Message) -> AlmanacResult<bool> {
        self.lock().emit(msg)
    }
}
