use hbnb::HbnbError;
use hbnb::console::Console;
use hbnb::construct::{Database, PersistenceMode, RecordKey, RecordKind};
use hbnb::datatype::Value;
use hbnb::persist::{Persist, SqlitePersistor};

// Runs a few commands against a fresh console and hands the store back.
fn session(mode: PersistenceMode, lines: &[&str]) -> Database {
    let database = Database::new(mode).expect("db");
    let mut console = Console::new(database, Vec::new());
    for line in lines {
        console.onecmd(line).expect("command ran");
    }
    console.into_parts().0
}

fn populate(mode: PersistenceMode) -> Database {
    let mut database = Database::new(mode).expect("db");
    let user = database.create(RecordKind::User).unwrap();
    let place = database.create(RecordKind::Place).unwrap();
    database.create(RecordKind::City).unwrap();
    let mut console = Console::new(database, Vec::new());
    for line in [
        format!("update User {} first_name \"Betty\"", user.id()),
        format!("update Place {} latitude 2", place.id()),
        format!("update Place {} number_rooms 3", place.id()),
        format!("Place.update(\"{}\", {{\"amenity_ids\": [\"a\", \"b\"], \"open\": true}})", place.id()),
    ] {
        console.onecmd(&line).unwrap();
    }
    console.into_parts().0
}

fn assert_same_store(original: &Database, restored: &Database) {
    let before: Vec<_> = original.all().map(|record| record.to_dict()).collect();
    let after: Vec<_> = restored.all().map(|record| record.to_dict()).collect();
    assert_eq!(before, after);
    for (a, b) in original.all().zip(restored.all()) {
        assert_eq!(a.attributes(), b.attributes(), "types survive for {}", a.key());
    }
}

#[test]
fn in_memory_mode_keeps_nothing_across_sessions() {
    let first = session(PersistenceMode::InMemory, &["create User", "create State"]);
    assert_eq!(first.len(), 2);
    assert_eq!(first.save_count(), 2);
    let second = session(PersistenceMode::InMemory, &[]);
    assert!(second.is_empty());
}

#[test]
fn json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let original = populate(PersistenceMode::Json(path.clone()));
    let restored = Database::new(PersistenceMode::Json(path.clone())).expect("reload");
    assert_same_store(&original, &restored);

    let place = restored.all_of(RecordKind::Place).next().unwrap();
    assert_eq!(place.get("latitude"), Some(&Value::Float(2.0)));
    assert_eq!(place.get("number_rooms"), Some(&Value::Int(3)));
    assert_eq!(place.get("open"), Some(&Value::Bool(true)));

    let text = std::fs::read_to_string(&path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();
    let key = format!("Place.{}", place.id());
    assert_eq!(document[&key]["__class__"], "Place");
    assert_eq!(document[&key]["latitude"], serde_json::json!(2.0));
}

#[test]
fn json_file_keeps_creation_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let original = session(
        PersistenceMode::Json(path.clone()),
        &["create Review", "create Amenity", "create BaseModel", "create Amenity"],
    );
    let restored = Database::new(PersistenceMode::Json(path)).unwrap();
    let kinds: Vec<RecordKind> = restored.all().map(|record| record.kind()).collect();
    assert_eq!(
        kinds,
        vec![RecordKind::Review, RecordKind::Amenity, RecordKind::BaseModel, RecordKind::Amenity]
    );
    assert_same_store(&original, &restored);
}

#[test]
fn destroy_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let first = session(PersistenceMode::Json(path.clone()), &["create User", "create User"]);
    let keys: Vec<RecordKey> = first.all().map(|record| record.key()).collect();
    let line = format!("User.destroy(\"{}\")", keys[0].id());
    let second = session(PersistenceMode::Json(path.clone()), &[line.as_str()]);
    assert_eq!(second.len(), 1);
    let third = Database::new(PersistenceMode::Json(path)).unwrap();
    assert!(!third.contains(&keys[0]));
    assert!(third.contains(&keys[1]));
}

#[test]
fn missing_or_empty_json_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    assert!(Database::new(PersistenceMode::Json(path.clone())).unwrap().is_empty());
    std::fs::write(&path, "  \n").unwrap();
    assert!(Database::new(PersistenceMode::Json(path)).unwrap().is_empty());
}

#[test]
fn corrupt_json_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    std::fs::write(&path, "{\"User.1\": ").unwrap();
    match Database::new(PersistenceMode::Json(path)) {
        Err(HbnbError::DataCorruption { .. }) => (),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("corrupt store loaded"),
    }
}

#[test]
fn mismatched_key_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let document = serde_json::json!({
        "User.1": {
            "__class__": "City",
            "id": "1",
            "created_at": "2017-09-28T21:03:54.052298",
            "updated_at": "2017-09-28T21:03:54.052302"
        }
    });
    std::fs::write(&path, document.to_string()).unwrap();
    match Database::new(PersistenceMode::Json(path)) {
        Err(HbnbError::DataCorruption { message }) => assert!(message.contains("User.1")),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("mismatched store loaded"),
    }
}

#[test]
fn stored_timestamps_are_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let document = serde_json::json!({
        "State.abc": {
            "__class__": "State",
            "id": "abc",
            "created_at": "2017-09-28T21:03:54.052298",
            "updated_at": "2017-09-28T21:05:54.119427",
            "name": "Nevada"
        }
    });
    std::fs::write(&path, document.to_string()).unwrap();
    let database = Database::new(PersistenceMode::Json(path)).unwrap();
    let state = database.get(&RecordKey::new(RecordKind::State, "abc")).expect("restored");
    let dict = state.to_dict();
    assert_eq!(dict["created_at"], "2017-09-28T21:03:54.052298");
    assert_eq!(dict["updated_at"], "2017-09-28T21:05:54.119427");
    assert_eq!(state.get("name"), Some(&Value::Str("Nevada".into())));
}

#[test]
fn sqlite_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hbnb.db");
    let original = populate(PersistenceMode::Sqlite(path.clone()));
    let restored = Database::new(PersistenceMode::Sqlite(path)).expect("reload");
    assert_eq!(restored.len(), 3);
    assert_same_store(&original, &restored);
}

#[test]
fn sqlite_save_replaces_previous_rows() {
    let mut persistor = SqlitePersistor::open_in_memory().unwrap();
    let first = RecordKind::Amenity.instantiate();
    let second = RecordKind::Review.instantiate();
    persistor.save(&[&first, &second]).unwrap();
    persistor.save(&[&second]).unwrap();
    let loaded = persistor.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].to_dict(), second.to_dict());
    assert!(persistor.describe().starts_with("sqlite:"));
}

#[test]
fn float_attributes_keep_their_type_when_given_inf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("file.json");
    let original = populate(PersistenceMode::Json(path.clone()));
    let place = original.all_of(RecordKind::Place).next().unwrap().key();
    let lines = [
        format!("update Place {} latitude inf", place.id()),
        format!("update Place {} longitude NaN", place.id()),
    ];
    drop(original);
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    let updated = session(PersistenceMode::Json(path.clone()), &lines);
    let restored = Database::new(PersistenceMode::Json(path)).expect("reload");
    assert_same_store(&updated, &restored);
    let record = restored.get(&place).unwrap();
    assert_eq!(record.get("latitude"), Some(&Value::Float(2.0)));
    assert_eq!(record.get("longitude"), None);
}
