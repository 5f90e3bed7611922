//! In-memory resource used by this crate's tests

use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub key: String,
    pub body: String,
}

impl Note {
    pub fn new(key: &str, body: &str) -> Self {
        Self {
            key: key.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryResource {
    notes: Mutex<BTreeMap<String, Note>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MemoryResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, note: Note) {
        self.notes.lock().unwrap().insert(note.key.clone(), note);
    }

    pub fn take(&self, key: &str) -> Option<Note> {
        self.notes.lock().unwrap().remove(key)
    }

    pub fn get(&self, key: &str) -> Option<Note> {
        self.notes.lock().unwrap().get(key).cloned()
    }

    pub fn fail_next(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failure.lock().unwrap().take() {
            bail!(message);
        }
        Ok(())
    }
}

impl Resource for MemoryResource {
    type Attributes = Note;

    fn resource_type(&self) -> &'static str {
        "note"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .with(Attribute::required("key", "Unique key").force_new())
            .with(Attribute::required("body", "Note body"))
    }

    fn identify(&self, attributes: &Note) -> String {
        attributes.key.clone()
    }

    fn flatten(&self, attributes: &Note) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("key".to_string(), attributes.key.clone()),
            ("body".to_string(), attributes.body.clone()),
        ])
    }

    fn create(&self, desired: &Note) -> Result<String> {
        self.begin()?;
        let mut notes = self.notes.lock().unwrap();
        if notes.contains_key(&desired.key) {
            bail!("note {} already exists", desired.key);
        }
        notes.insert(desired.key.clone(), desired.clone());
        Ok(desired.key.clone())
    }

    fn read(&self, id: &str) -> Result<Option<Note>> {
        self.begin()?;
        Ok(self.notes.lock().unwrap().get(id).cloned())
    }

    fn update(&self, desired: &Note) -> Result<()> {
        self.begin()?;
        let mut notes = self.notes.lock().unwrap();
        match notes.get_mut(&desired.key) {
            Some(note) => {
                *note = desired.clone();
                Ok(())
            }
            None => bail!("note {} not found", desired.key),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.begin()?;
        if self.notes.lock().unwrap().remove(id).is_none() {
            bail!("note {} not found", id);
        }
        Ok(())
    }
}
