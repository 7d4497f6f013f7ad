// used for persistence
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::construct::{Record, RecordKey};
use crate::error::{HbnbError, Result};

type Dict = serde_json::Map<String, serde_json::Value>;

/// Where the record store is flushed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    /// Nothing outlives the process.
    InMemory,
    /// A single JSON document keyed by `"ClassName.id"`.
    Json(PathBuf),
    /// A SQLite database file.
    Sqlite(PathBuf),
}

impl PersistenceMode {
    pub fn open(&self) -> Result<Box<dyn Persist>> {
        let persistor: Box<dyn Persist> = match self {
            PersistenceMode::InMemory => Box::new(MemoryPersistor::new()),
            PersistenceMode::Json(path) => Box::new(JsonFilePersistor::new(path)),
            PersistenceMode::Sqlite(path) => Box::new(SqlitePersistor::open(path)?),
        };
        Ok(persistor)
    }
}

/// A backing store for the full set of records. Saving always overwrites
/// whatever was persisted before.
pub trait Persist {
    fn load(&mut self) -> Result<Vec<Record>>;
    fn save(&mut self, records: &[&Record]) -> Result<()>;
    fn describe(&self) -> String;
}

// Every backend keys its rows by the "ClassName.id" text and checks it
// against the record it restores.
fn restore(key: &str, dict: &Dict) -> Result<Record> {
    let record = Record::from_dict(dict)?;
    match RecordKey::parse(key) {
        Some(parsed) if parsed == record.key() => Ok(record),
        _ => Err(HbnbError::DataCorruption {
            message: format!("key '{}' does not match record {}", key, record.key()),
        }),
    }
}

// ------------- In memory -------------
#[derive(Debug, Default)]
pub struct MemoryPersistor {
    snapshot: Vec<(String, Dict)>,
}

impl MemoryPersistor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persist for MemoryPersistor {
    fn load(&mut self) -> Result<Vec<Record>> {
        self.snapshot
            .iter()
            .map(|(key, dict)| restore(key, dict))
            .collect()
    }
    fn save(&mut self, records: &[&Record]) -> Result<()> {
        self.snapshot = records
            .iter()
            .map(|record| (record.key().to_string(), record.to_dict()))
            .collect();
        Ok(())
    }
    fn describe(&self) -> String {
        String::from("memory")
    }
}

// ------------- JSON file -------------
#[derive(Debug)]
pub struct JsonFilePersistor {
    path: PathBuf,
}

impl JsonFilePersistor {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Persist for JsonFilePersistor {
    fn load(&mut self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no JSON store yet");
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| {
            HbnbError::Persistence(format!("could not read {}: {}", self.path.display(), e))
        })?;
        if text.trim().is_empty() {
            warn!(path = %self.path.display(), "JSON store is empty");
            return Ok(Vec::new());
        }
        let document: Dict = serde_json::from_str(&text)?;
        let mut records = Vec::with_capacity(document.len());
        for (key, entry) in &document {
            let dict = entry.as_object().ok_or_else(|| HbnbError::DataCorruption {
                message: format!("entry '{}' is not an object", key),
            })?;
            records.push(restore(key, dict)?);
        }
        Ok(records)
    }
    fn save(&mut self, records: &[&Record]) -> Result<()> {
        let mut document = Dict::new();
        for record in records {
            document.insert(
                record.key().to_string(),
                serde_json::Value::Object(record.to_dict()),
            );
        }
        let text = serde_json::to_string(&document)?;
        fs::write(&self.path, text).map_err(|e| {
            HbnbError::Persistence(format!("could not write {}: {}", self.path.display(), e))
        })
    }
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

// ------------- SQLite -------------
pub struct SqlitePersistor {
    db: Connection,
    location: String,
}

impl SqlitePersistor {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let location = path.as_ref().display().to_string();
        Self::prime(Connection::open(path)?, location)
    }
    pub fn open_in_memory() -> Result<Self> {
        Self::prime(Connection::open_in_memory()?, String::from(":memory:"))
    }
    fn prime(connection: Connection, location: String) -> Result<Self> {
        connection.execute_batch(
            "
            create table if not exists Record (
                Record_Key text not null,
                Class text not null,
                Position integer not null,
                Attributes text not null,
                constraint referenceable_Record_Key primary key (
                    Record_Key
                )
            );
            ",
        )?;
        Ok(SqlitePersistor {
            db: connection,
            location,
        })
    }
}

impl Persist for SqlitePersistor {
    fn load(&mut self) -> Result<Vec<Record>> {
        let mut all_records = self.db.prepare(
            "
            select Record_Key, Attributes
                from Record
                order by Position
            ",
        )?;
        let rows = all_records.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (key, attributes) = row?;
            let dict: Dict = serde_json::from_str(&attributes)?;
            records.push(restore(&key, &dict)?);
        }
        Ok(records)
    }
    fn save(&mut self, records: &[&Record]) -> Result<()> {
        let transaction = self.db.transaction()?;
        transaction.execute("delete from Record", [])?;
        {
            let mut add_record = transaction.prepare(
                "
                insert into Record (
                    Record_Key,
                    Class,
                    Position,
                    Attributes
                ) values (?1, ?2, ?3, ?4)
                ",
            )?;
            for (position, record) in records.iter().enumerate() {
                add_record.execute(params![
                    record.key().to_string(),
                    record.kind().name(),
                    position as i64,
                    serde_json::to_string(&record.to_dict())?
                ])?;
            }
        }
        transaction.commit()?;
        Ok(())
    }
    fn describe(&self) -> String {
        format!("sqlite:{}", self.location)
    }
}
