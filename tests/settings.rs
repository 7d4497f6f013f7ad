use std::path::PathBuf;

use hbnb::HbnbError;
use hbnb::construct::PersistenceMode;
use hbnb::settings::Settings;

#[test]
fn defaults_apply_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let name = dir.path().join("hbnb");
    let settings = Settings::load(name.to_str().unwrap()).expect("defaults");
    assert_eq!(settings, Settings::default());
    assert_eq!(
        settings.persistence_mode().unwrap(),
        PersistenceMode::Json(PathBuf::from("file.json"))
    );
}

#[test]
fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("hbnb.toml"),
        "persistence = \"sqlite\"\nsqlite_path = \"records.db\"\nlog_filter = \"hbnb=debug\"\n",
    )
    .unwrap();
    let name = dir.path().join("hbnb");
    let settings = Settings::load(name.to_str().unwrap()).expect("settings");
    assert_eq!(settings.log_filter, "hbnb=debug");
    assert_eq!(settings.file_path, PathBuf::from("file.json"));
    assert_eq!(
        settings.persistence_mode().unwrap(),
        PersistenceMode::Sqlite(PathBuf::from("records.db"))
    );
}

#[test]
fn persistence_names() {
    let mut settings = Settings::default();
    settings.persistence = String::from("Memory");
    assert_eq!(settings.persistence_mode().unwrap(), PersistenceMode::InMemory);
    settings.persistence = String::from("file");
    assert!(matches!(settings.persistence_mode(), Ok(PersistenceMode::Json(_))));
    settings.persistence = String::from("postgres");
    assert!(matches!(settings.persistence_mode(), Err(HbnbError::Config(_))));
}
