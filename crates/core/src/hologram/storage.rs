//! `holograms.yml`: one record per hologram, keyed by id.
//!
//! ```yaml
//! holograms:
//!   welcome:
//!     world: spawn
//!     x: 0.0
//!     y: 64.0
//!     z: 0.0
//!     lines:
//!     - '&bHello'
//! ```

use super::Hologram;
use crate::host::Position;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

static DEFAULT_DOCUMENT: &str = "holograms: {}\n";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid hologram file: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("invalid hologram file: {0}")]
    Layout(&'static str),

    #[error("{} could not be read earlier, refusing to overwrite it", .0.display())]
    ReadOnly(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HologramRecord {
    #[serde(default)]
    pub world: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub lines: Vec<String>,
}

impl HologramRecord {
    pub fn position(&self) -> Position {
        Position::new(self.world.clone(), self.x, self.y, self.z)
    }
}

impl From<&Hologram> for HologramRecord {
    fn from(hologram: &Hologram) -> Self {
        let position = hologram.position();
        HologramRecord {
            world: position.world.clone(),
            x: position.x,
            y: position.y,
            z: position.z,
            lines: hologram.lines().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum StoredRecord {
    Readable(HologramRecord),
    /// A record that didn't parse, written back exactly as it was read.
    Unreadable(Value),
}

#[derive(Serialize)]
struct HologramDocument<'a> {
    holograms: &'a IndexMap<String, StoredRecord>,
}

/// Keys are usually strings, but YAML happily reads `123:` as a number.
fn record_id(key: &Value) -> Option<String> {
    match key {
        Value::String(id) => Some(id.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// The whole store document, held in memory and written back in full.
/// Records are only touched when asked to, so entries nobody loaded survive
/// writes of other entries. That includes records that failed to parse.
#[derive(Debug)]
pub struct HologramStore {
    path: PathBuf,
    records: IndexMap<String, StoredRecord>,
    writable: bool,
}

impl HologramStore {
    /// Reads the store at `path`, creating an empty one if it doesn't exist.
    /// Only a file that can't be read as a whole is an error; single bad
    /// records are logged and kept aside.
    pub fn open(path: impl Into<PathBuf>) -> Result<HologramStore, StoreError> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, DEFAULT_DOCUMENT)?;
            info!("Created {}", path.display());
        }

        let contents = fs::read_to_string(&path)?;
        let document: Value = if contents.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml_ng::from_str(&contents)?
        };
        let section = match document {
            Value::Null => Value::Null,
            Value::Mapping(mut root) => root.remove("holograms").unwrap_or(Value::Null),
            _ => return Err(StoreError::Layout("expected a mapping at the top level")),
        };
        let entries = match section {
            Value::Null => Mapping::new(),
            Value::Mapping(entries) => entries,
            _ => return Err(StoreError::Layout("`holograms` must be a mapping")),
        };

        let mut records = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let Some(id) = record_id(&key) else {
                warn!("Dropping hologram with unusable id {:?}", key);
                continue;
            };
            let record = match serde_yaml_ng::from_value::<HologramRecord>(value.clone()) {
                Ok(record) => StoredRecord::Readable(record),
                Err(err) => {
                    warn!("Skipping hologram '{}': {}", id, err);
                    StoredRecord::Unreadable(value)
                }
            };
            records.insert(id, record);
        }

        Ok(HologramStore {
            path,
            records,
            writable: true,
        })
    }

    /// An empty store that will write to `path` on the next save.
    pub fn empty(path: impl Into<PathBuf>) -> HologramStore {
        HologramStore {
            path: path.into(),
            records: IndexMap::new(),
            writable: true,
        }
    }

    /// An empty store that never writes, for a file that must not be lost.
    pub fn read_only(path: impl Into<PathBuf>) -> HologramStore {
        HologramStore {
            writable: false,
            ..HologramStore::empty(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The records that parsed.
    pub fn records(&self) -> impl Iterator<Item = (&str, &HologramRecord)> {
        self.records.iter().filter_map(|(id, record)| match record {
            StoredRecord::Readable(record) => Some((id.as_str(), record)),
            StoredRecord::Unreadable(_) => None,
        })
    }

    pub fn get(&self, id: &str) -> Option<&HologramRecord> {
        match self.records.get(id)? {
            StoredRecord::Readable(record) => Some(record),
            StoredRecord::Unreadable(_) => None,
        }
    }

    /// Whether there is any record under `id`, readable or not.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn put(&mut self, id: &str, record: HologramRecord) {
        self.records
            .insert(id.to_string(), StoredRecord::Readable(record));
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.records.shift_remove(id).is_some()
    }

    /// Drops every readable record. Unreadable ones stay until someone fixes
    /// or replaces them.
    pub fn clear_readable(&mut self) {
        self.records
            .retain(|_, record| matches!(record, StoredRecord::Unreadable(_)));
    }

    pub fn save(&self) -> Result<(), StoreError> {
        if !self.writable {
            return Err(StoreError::ReadOnly(self.path.clone()));
        }
        let document = HologramDocument {
            holograms: &self.records,
        };
        let data = serde_yaml_ng::to_string(&document)?;

        let mut file = File::create(&self.path)?;
        file.write_all(data.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }
}
