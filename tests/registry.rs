use hbnb::construct::{Record, RecordKey, RecordKind};
use hbnb::datatype::{Value, ValueType};

#[test]
fn class_names_resolve_exactly() {
    for kind in RecordKind::ALL {
        assert_eq!(RecordKind::resolve(kind.name()), Some(kind));
    }
    assert_eq!(RecordKind::resolve("user"), None);
    assert_eq!(RecordKind::resolve("Users"), None);
    assert_eq!(RecordKind::resolve(""), None);
}

#[test]
fn class_defaults() {
    assert_eq!(RecordKind::Place.class_attribute("max_guest"), Some(ValueType::Int));
    assert_eq!(RecordKind::Place.default_value("max_guest"), Some(Value::Int(0)));
    assert_eq!(RecordKind::Place.default_value("longitude"), Some(Value::Float(0.0)));
    assert_eq!(
        RecordKind::Place.default_value("amenity_ids"),
        Some(Value::Json(serde_json::json!([])))
    );
    assert_eq!(RecordKind::User.default_value("email"), Some(Value::Str(String::new())));
    assert_eq!(RecordKind::BaseModel.default_value("name"), None);
    assert_eq!(RecordKind::Review.class_attribute("rating"), None);
}

#[test]
fn keys_print_and_parse() {
    let key = RecordKey::new(RecordKind::City, "42-abc");
    assert_eq!(key.to_string(), "City.42-abc");
    assert_eq!(RecordKey::parse("City.42-abc"), Some(key));
    assert_eq!(RecordKey::parse("Town.42"), None);
    assert_eq!(RecordKey::parse("City"), None);
}

#[test]
fn fresh_records_are_distinct() {
    let first = RecordKind::Amenity.instantiate();
    let second = RecordKind::Amenity.instantiate();
    assert_ne!(first.id(), second.id());
    assert_eq!(first.created_at(), first.updated_at());
    assert!(first.attributes().is_empty());
}

#[test]
fn printed_form_sorts_keys() {
    let mut record = Record::new(RecordKind::User);
    record.set("last_name", Value::Str("Holberton".into()));
    record.set("age", Value::Int(30));
    record.set("height", Value::Float(2.0));
    let printed = record.to_string();
    let prefix = format!("[User] ({}) {{\"age\": 30, \"created_at\": \"", record.id());
    assert!(printed.starts_with(&prefix), "{printed}");
    assert!(printed.contains("\"height\": 2.0, \"id\": "));
    assert!(printed.contains("\"last_name\": \"Holberton\", \"updated_at\": \""));
    assert!(printed.ends_with("\"}"));
}

#[test]
fn dict_form_round_trips() {
    let mut record = Record::new(RecordKind::State);
    record.set("name", Value::Str("Ohio".into()));
    let dict = record.to_dict();
    assert_eq!(dict["__class__"], "State");
    assert_eq!(dict["id"], record.id());
    let mut restored = Record::from_dict(&dict).expect("restored");
    assert_eq!(restored.key(), record.key());
    assert_eq!(restored.to_dict(), dict);
    assert!(!restored.set("__class__", Value::Str("City".into())));
}

#[test]
fn class_defaults_drive_lookup_until_assigned() {
    let mut place = Record::new(RecordKind::Place);
    assert_eq!(place.lookup("number_rooms"), Some(Value::Int(0)));
    assert_eq!(place.attribute_type("number_rooms"), Some(ValueType::Int));
    assert_eq!(place.get("number_rooms"), None, "defaults are not instance attributes");
    place.set("number_rooms", Value::Str("four".into()));
    assert_eq!(place.lookup("number_rooms"), Some(Value::Str("four".into())));
    assert_eq!(place.attribute_type("number_rooms"), Some(ValueType::Str));
    assert_eq!(place.lookup("nothing"), None);
}
