use std::fs;

use modulith::config::{ConfigStore, Dto, EntityConfig, ProjectConfig};
use modulith::error::Error;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn unknown_keys_survive_a_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path());
    fs::create_dir_all(dir.path().join(".modulith")).unwrap();
    fs::write(
        store.entity_config_path("Invoice"),
        json!({
            "name": "Invoice",
            "changelogDate": "20201228174246",
            "dto": "mapstruct",
            "clientRootFolder": "billing",
            "readOnly": false
        })
        .to_string(),
    )
    .unwrap();

    let updated = store.update_entity("Invoice", |config| config.module = Some("billing".to_string())).unwrap();
    assert_eq!(updated.dto, Dto::Mapstruct);

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.entity_config_path("Invoice")).unwrap()).unwrap();
    assert_eq!(saved["clientRootFolder"], json!("billing"));
    assert_eq!(saved["readOnly"], json!(false));
    assert_eq!(saved["module"], json!("billing"));
}

#[test]
fn records_are_pretty_printed() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path());
    store.save_project(&ProjectConfig::new("store", "com.mycompany.myapp")).unwrap();

    let content = fs::read_to_string(store.project_config_path()).unwrap();
    assert!(content.starts_with("{\n  \"baseName\": \"store\",\n"));
    assert!(content.ends_with("}\n"));
    assert_eq!(store.load_project().unwrap().unwrap().base_name, "store");
}

#[test]
fn missing_project_record_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path());
    assert!(store.load_project().unwrap().is_none());
    assert!(matches!(store.require_project(), Err(Error::ConfigError(_))));
    assert!(matches!(store.update_entity("Invoice", |_| {}), Err(Error::ConfigError(_))));
}

#[test]
fn stored_entities_are_listed() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path());
    assert!(store.list_entities().unwrap().is_empty());

    store.save_entity(&EntityConfig::new("Payment", "20210101000000")).unwrap();
    store.save_entity(&EntityConfig::new("Invoice", "20210101000001")).unwrap();
    fs::write(dir.path().join(".modulith/notes.txt"), "ignored").unwrap();

    assert_eq!(store.list_entities().unwrap(), vec!["Invoice", "Payment"]);
}
