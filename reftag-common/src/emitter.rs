//! Data-layer emitter capability
//!
//! The core hands exactly one [`DataLayerEntry`] per session to an
//! [`Emitter`]. Delivery downstream is the emitter's business; the core only
//! sees a synchronous failure, which aborts the attempt.

use crate::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A single key/value push, serialized as `{"<key>": "<value>"}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayerEntry {
    pub key: String,
    pub value: String,
}

impl DataLayerEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Serialize for DataLayerEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

/// Sink for data-layer pushes
///
/// Implementations must not block the caller.
pub trait Emitter {
    fn push(&self, entry: DataLayerEntry) -> Result<()>;
}

impl<E: Emitter + ?Sized> Emitter for &E {
    fn push(&self, entry: DataLayerEntry) -> Result<()> {
        (**self).push(entry)
    }
}

impl<E: Emitter + ?Sized> Emitter for Arc<E> {
    fn push(&self, entry: DataLayerEntry) -> Result<()> {
        (**self).push(entry)
    }
}

/// In-memory data layer keeping every push in order
#[derive(Debug, Default)]
pub struct MemoryDataLayer {
    entries: Mutex<Vec<DataLayerEntry>>,
}

impl MemoryDataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All pushes so far, oldest first
    pub fn entries(&self) -> Vec<DataLayerEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Latest value pushed under `key` (the data layer's computed state)
    pub fn state(&self, key: &str) -> Option<String> {
        self.entries()
            .into_iter()
            .rev()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value)
    }
}

impl Emitter for MemoryDataLayer {
    fn push(&self, entry: DataLayerEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| Error::collaborator("data layer lock poisoned"))?
            .push(entry);
        Ok(())
    }
}

/// Forwards pushes over an unbounded channel
///
/// Sending never waits; the receiving task owns delivery. A dropped receiver
/// surfaces as a collaborator failure on the next push.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<DataLayerEntry>,
}

impl ChannelEmitter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DataLayerEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Emitter for ChannelEmitter {
    fn push(&self, entry: DataLayerEntry) -> Result<()> {
        self.tx
            .send(entry)
            .map_err(|_| Error::collaborator("data layer channel closed"))
    }
}
