// the store index uses a fast non-cryptographic hasher
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::{BTreeMap, HashMap};

// used to print out readable forms of a construct
use std::fmt;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use tracing::{debug, info};
use uuid::Uuid;

// our own stuff that we need
use crate::datatype::{Value, ValueType, format_timestamp, parse_timestamp};
use crate::error::{HbnbError, Result};
use crate::persist::Persist;
pub use crate::persist::PersistenceMode;

pub type KeyHasher = BuildHasherDefault<SeaHasher>;

// ------------- RecordKind -------------
/// Every class of record the shell knows how to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, RecordKind, KeyHasher> = RecordKind::ALL
        .iter()
        .map(|kind| (kind.name(), *kind))
        .collect();
}

impl RecordKind {
    pub const ALL: [RecordKind; 7] = [
        RecordKind::BaseModel,
        RecordKind::User,
        RecordKind::State,
        RecordKind::City,
        RecordKind::Amenity,
        RecordKind::Place,
        RecordKind::Review,
    ];
    /// Looks a class name up in the registry. Names are case sensitive.
    pub fn resolve(name: &str) -> Option<RecordKind> {
        REGISTRY.get(name).copied()
    }
    pub const fn name(self) -> &'static str {
        match self {
            RecordKind::BaseModel => "BaseModel",
            RecordKind::User => "User",
            RecordKind::State => "State",
            RecordKind::City => "City",
            RecordKind::Amenity => "Amenity",
            RecordKind::Place => "Place",
            RecordKind::Review => "Review",
        }
    }
    /// Attributes the class itself defines, along with their types.
    pub const fn class_attributes(self) -> &'static [(&'static str, ValueType)] {
        match self {
            RecordKind::BaseModel => &[],
            RecordKind::User => &[
                ("email", ValueType::Str),
                ("password", ValueType::Str),
                ("first_name", ValueType::Str),
                ("last_name", ValueType::Str),
            ],
            RecordKind::State => &[("name", ValueType::Str)],
            RecordKind::City => &[("state_id", ValueType::Str), ("name", ValueType::Str)],
            RecordKind::Amenity => &[("name", ValueType::Str)],
            RecordKind::Place => &[
                ("city_id", ValueType::Str),
                ("user_id", ValueType::Str),
                ("name", ValueType::Str),
                ("description", ValueType::Str),
                ("number_rooms", ValueType::Int),
                ("number_bathrooms", ValueType::Int),
                ("max_guest", ValueType::Int),
                ("price_by_night", ValueType::Int),
                ("latitude", ValueType::Float),
                ("longitude", ValueType::Float),
                ("amenity_ids", ValueType::Json),
            ],
            RecordKind::Review => &[
                ("place_id", ValueType::Str),
                ("user_id", ValueType::Str),
                ("text", ValueType::Str),
            ],
        }
    }
    pub fn class_attribute(self, attribute: &str) -> Option<ValueType> {
        self.class_attributes()
            .iter()
            .find(|(name, _)| *name == attribute)
            .map(|(_, value_type)| *value_type)
    }
    /// The value a class attribute holds until it is assigned.
    pub fn default_value(self, attribute: &str) -> Option<Value> {
        self.class_attribute(attribute).map(|value_type| match value_type {
            ValueType::Str => Value::Str(String::new()),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Bool => Value::Bool(false),
            ValueType::Json => Value::Json(serde_json::Value::Array(Vec::new())),
        })
    }
    pub fn instantiate(self) -> Record {
        Record::new(self)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ------------- RecordKey -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    kind: RecordKind,
    id: String,
}

impl RecordKey {
    pub fn new(kind: RecordKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
    /// Parses the `"ClassName.id"` text form.
    pub fn parse(text: &str) -> Option<RecordKey> {
        let (class_name, id) = text.split_once('.')?;
        let kind = RecordKind::resolve(class_name)?;
        Some(Self::new(kind, id))
    }
    pub fn kind(&self) -> RecordKind {
        self.kind
    }
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.id)
    }
}

// ------------- Record -------------
/// Names that are part of the record's identity rather than its attributes.
pub const PROTECTED_ATTRIBUTES: [&str; 4] = ["__class__", "id", "created_at", "updated_at"];

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: RecordKind,
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    attributes: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(kind: RecordKind) -> Self {
        let now = Utc::now();
        Self {
            kind,
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            attributes: BTreeMap::new(),
        }
    }
    pub fn kind(&self) -> RecordKind {
        self.kind
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.kind, self.id.clone())
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }
    pub fn is_protected(attribute: &str) -> bool {
        PROTECTED_ATTRIBUTES.contains(&attribute)
    }
    /// The value `attribute` reads as: the instance value, else the class
    /// default.
    pub fn lookup(&self, attribute: &str) -> Option<Value> {
        self.attributes
            .get(attribute)
            .cloned()
            .or_else(|| self.kind.default_value(attribute))
    }
    /// The type an assignment to `attribute` has to keep: the instance value
    /// wins over the class default.
    pub fn attribute_type(&self, attribute: &str) -> Option<ValueType> {
        self.lookup(attribute).as_ref().map(Value::value_type)
    }
    /// Assigns an attribute, creating it when new. Returns false for the
    /// protected identity attributes, which are left alone.
    pub fn set(&mut self, attribute: &str, value: Value) -> bool {
        if Self::is_protected(attribute) {
            return false;
        }
        self.attributes.insert(attribute.to_string(), value);
        true
    }
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
    pub fn to_dict(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut dict = serde_json::Map::new();
        dict.insert("__class__".into(), self.kind.name().into());
        dict.insert("id".into(), self.id.clone().into());
        dict.insert("created_at".into(), format_timestamp(&self.created_at).into());
        dict.insert("updated_at".into(), format_timestamp(&self.updated_at).into());
        for (name, value) in &self.attributes {
            dict.insert(name.clone(), value.into());
        }
        dict
    }
    pub fn from_dict(dict: &serde_json::Map<String, serde_json::Value>) -> Result<Record> {
        let class_name = text_field(dict, "__class__")?;
        let kind = RecordKind::resolve(class_name).ok_or_else(|| HbnbError::DataCorruption {
            message: format!("unknown class '{class_name}'"),
        })?;
        let mut record = Record {
            kind,
            id: text_field(dict, "id")?.to_string(),
            created_at: timestamp_field(dict, "created_at")?,
            updated_at: timestamp_field(dict, "updated_at")?,
            attributes: BTreeMap::new(),
        };
        for (name, json) in dict {
            if !Self::is_protected(name) {
                record.attributes.insert(name.clone(), Value::from(json.clone()));
            }
        }
        Ok(record)
    }
}

fn text_field<'d>(
    dict: &'d serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<&'d str> {
    dict.get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| HbnbError::DataCorruption {
            message: format!("record is missing the text field '{field}'"),
        })
}

fn timestamp_field(
    dict: &serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<DateTime<Utc>> {
    let raw = text_field(dict, field)?;
    parse_timestamp(raw).ok_or_else(|| HbnbError::DataCorruption {
        message: format!("'{raw}' in field '{field}' is not a timestamp"),
    })
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut rendered = BTreeMap::new();
        rendered.insert("id", Value::Str(self.id.clone()).to_string());
        rendered.insert("created_at", Value::Str(format_timestamp(&self.created_at)).to_string());
        rendered.insert("updated_at", Value::Str(format_timestamp(&self.updated_at)).to_string());
        for (name, value) in &self.attributes {
            rendered.insert(name.as_str(), value.to_string());
        }
        let body = rendered
            .iter()
            .map(|(name, value)| format!("\"{}\": {}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{}] ({}) {{{}}}", self.kind, self.id, body)
    }
}

// ------------- Database -------------
// Owns every record of the session, in insertion order, along with the
// persistor that the full store is flushed to.
pub struct Database {
    records: HashMap<RecordKey, Record, KeyHasher>,
    order: Vec<RecordKey>,
    persistor: Box<dyn Persist>,
    saves: usize,
}

impl Database {
    pub fn new(mode: PersistenceMode) -> Result<Database> {
        Self::with_persistor(mode.open()?)
    }
    pub fn with_persistor(mut persistor: Box<dyn Persist>) -> Result<Database> {
        let restored = persistor.load()?;
        let mut database = Database {
            records: HashMap::default(),
            order: Vec::new(),
            persistor,
            saves: 0,
        };
        for record in restored {
            database.keep(record);
        }
        debug!(records = database.len(), persistor = %database.persistor.describe(), "restored records");
        Ok(database)
    }
    /// Takes ownership of a record. Returns true if a record with the same
    /// key was previously kept, in which case it is replaced in place.
    pub fn keep(&mut self, record: Record) -> bool {
        let key = record.key();
        let previously_kept = self.records.insert(key.clone(), record).is_some();
        if !previously_kept {
            self.order.push(key);
        }
        previously_kept
    }
    pub fn create(&mut self, kind: RecordKind) -> Result<RecordKey> {
        let record = kind.instantiate();
        let key = record.key();
        self.keep(record);
        self.save()?;
        info!(key = %key, "created record");
        Ok(key)
    }
    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.records.get(key)
    }
    pub fn get_mut(&mut self, key: &RecordKey) -> Option<&mut Record> {
        self.records.get_mut(key)
    }
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records.contains_key(key)
    }
    pub fn all(&self) -> impl Iterator<Item = &Record> {
        self.order.iter().filter_map(|key| self.records.get(key))
    }
    pub fn all_of(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.all().filter(move |record| record.kind() == kind)
    }
    pub fn count(&self, kind: RecordKind) -> usize {
        self.all_of(kind).count()
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// Removes a record without persisting the change.
    pub fn remove(&mut self, key: &RecordKey) -> Option<Record> {
        let removed = self.records.remove(key);
        if removed.is_some() {
            self.order.retain(|kept| kept != key);
        }
        removed
    }
    /// Removes a record and persists the store.
    pub fn destroy(&mut self, key: &RecordKey) -> Result<Option<Record>> {
        let removed = self.remove(key);
        if removed.is_some() {
            self.save()?;
            info!(key = %key, "destroyed record");
        }
        Ok(removed)
    }
    /// Refreshes the record's `updated_at` and persists the store.
    pub fn save_record(&mut self, key: &RecordKey) -> Result<()> {
        if let Some(record) = self.records.get_mut(key) {
            record.touch();
        }
        self.save()
    }
    /// Writes the full store through the persistor.
    pub fn save(&mut self) -> Result<()> {
        let records: Vec<&Record> = self
            .order
            .iter()
            .filter_map(|key| self.records.get(key))
            .collect();
        self.persistor.save(&records)?;
        self.saves += 1;
        debug!(records = records.len(), saves = self.saves, "saved store");
        Ok(())
    }
    /// How many times the store has been persisted during this session.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}
