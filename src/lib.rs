//! hbnb – a line-based shell over a small store of typed records.
//!
//! Records come in a fixed set of classes (`BaseModel`, `User`, `State`,
//! `City`, `Amenity`, `Place`, `Review`). Each one is identified by its class
//! and a generated id, carries creation and update timestamps, and holds any
//! number of named attributes of primitive type.
//!
//! ## Modules
//! * [`construct`] – The record registry, record keys, records and the
//!   [`construct::Database`] that owns them.
//! * [`datatype`] – Attribute [`datatype::Value`]s and the types they can take.
//! * [`persist`] – In-memory, JSON file and SQLite persistence.
//! * [`parser`] – Shell-style and call-style command grammars.
//! * [`coercion`] – Typed assignment of raw text onto attributes.
//! * [`console`] – The command dispatcher and the interactive read loop.
//! * [`settings`] – Settings read with the `config` crate.
//!
//! ## Command Syntax
//! Shell-style lines put the command first:
//! `create User`, `show User <id>`, `update User <id> email "a@b.c"`.
//! Call-style lines put the class first:
//! `User.all()`, `User.count()`, `User.show("<id>")`,
//! `User.update("<id>", "email", "a@b.c")`,
//! `User.update("<id>", {"first_name": "Betty", "age": 30})`.
//!
//! Every mutation writes the whole store through its persistor before the
//! command returns.
//!
//! ## Quick Start
//! ```
//! use hbnb::{console::Console, construct::{Database, PersistenceMode, RecordKind}};
//! let database = Database::new(PersistenceMode::InMemory).unwrap();
//! let mut console = Console::new(database, Vec::new());
//! console.onecmd("create User").unwrap();
//! console.onecmd("all User").unwrap();
//! assert_eq!(console.database().count(RecordKind::User), 1);
//! ```

pub mod coercion;
pub mod console;
pub mod construct;
pub mod datatype;
pub mod error;
pub mod parser;
pub mod persist;
pub mod settings;

pub use error::{Diagnostic, HbnbError, Result};
