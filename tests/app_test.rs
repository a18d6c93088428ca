mod common;

use std::collections::BTreeSet;

use common::{generate_app, read, relative, PACKAGE_FOLDER, TEST_FOLDER};
use modulith::config::{ConfigStore, DatabaseType};
use serde_json::json;
use tempfile::TempDir;

#[test_log::test]
fn application_file_set() {
    let dir = TempDir::new().unwrap();
    let written = generate_app(dir.path(), json!({}));

    let expected: BTreeSet<String> = [
        format!("{PACKAGE_FOLDER}/StoreApp.java"),
        format!("{PACKAGE_FOLDER}/config/DatabaseConfiguration.java"),
        format!("{PACKAGE_FOLDER}/config/CacheConfiguration.java"),
        format!("{PACKAGE_FOLDER}/domain/User.java"),
        format!("{PACKAGE_FOLDER}/repository/UserRepository.java"),
        "src/main/resources/config/application.yml".to_string(),
        "src/main/resources/config/liquibase/master.xml".to_string(),
        format!("{TEST_FOLDER}/web/rest/TestUtil.java"),
    ]
    .into_iter()
    .collect();
    assert_eq!(relative(dir.path(), &written).into_iter().collect::<BTreeSet<_>>(), expected);

    let master = read(dir.path(), "src/main/resources/config/liquibase/master.xml");
    assert!(master.contains("modulith-needle-liquibase-add-changelog"));
    assert!(master.contains("modulith-needle-liquibase-add-constraints-changelog"));
}

#[test]
fn answers_are_stored_in_project_record() {
    let dir = TempDir::new().unwrap();
    generate_app(dir.path(), json!({ "buildTool": "gradle" }));

    let project = ConfigStore::new(dir.path()).require_project().unwrap();
    assert_eq!(project.base_name, "store");
    assert_eq!(project.package_name, "com.mycompany.myapp");
    assert_eq!(project.database_type, DatabaseType::Sql);
    assert!(project.user_module().is_none());
}

#[test]
fn user_classes_can_live_in_a_module() {
    let dir = TempDir::new().unwrap();
    let written = generate_app(dir.path(), json!({ "useModuleForUser": true, "userModuleName": "Account" }));
    let written = relative(dir.path(), &written);

    assert!(written.contains(&format!("{PACKAGE_FOLDER}/modules/account/domain/User.java")));
    assert!(written.contains(&format!("{PACKAGE_FOLDER}/modules/account/repository/UserRepository.java")));
    assert!(!written.contains(&format!("{PACKAGE_FOLDER}/domain/User.java")));

    let user = read(dir.path(), &format!("{PACKAGE_FOLDER}/modules/account/domain/User.java"));
    assert!(user.starts_with("package com.mycompany.myapp.modules.account.domain;\n"));
}

#[test]
fn no_database_skips_persistence_files() {
    let dir = TempDir::new().unwrap();
    let written = relative(dir.path(), &generate_app(dir.path(), json!({ "databaseType": "no" })));

    assert!(written.iter().all(|path| !path.ends_with("master.xml")));
    assert!(written.iter().all(|path| !path.contains("User")));
    assert!(written.iter().all(|path| !path.ends_with("CacheConfiguration.java")));
}

#[test]
fn rerun_uses_stored_record() {
    let dir = TempDir::new().unwrap();
    generate_app(dir.path(), json!({ "baseName": "shop" }));
    let first = read(dir.path(), ".modulith.json");

    // Different answers are ignored once the record exists.
    generate_app(dir.path(), json!({ "baseName": "other" }));
    assert_eq!(read(dir.path(), ".modulith.json"), first);
    assert!(dir.path().join(format!("{PACKAGE_FOLDER}/ShopApp.java")).is_file());
    assert!(!dir.path().join(format!("{PACKAGE_FOLDER}/OtherApp.java")).exists());
}

#[test]
fn invalid_package_name_is_rejected() {
    use modulith::error::Error;
    use modulith::generators::{app::AppGenerator, GeneratorOptions};
    use modulith::prompt::AnswerPrompter;
    use modulith::renderer::MiniJinjaRenderer;

    let dir = TempDir::new().unwrap();
    let prompter = AnswerPrompter::new(common::answers(json!({
        "useModuleForUser": false,
        "packageName": "Com.Example"
    })));
    let renderer = MiniJinjaRenderer::new();
    let mut generator = AppGenerator::new(GeneratorOptions::new(dir.path()), &prompter, &renderer);

    assert!(matches!(generator.run(), Err(Error::ValidationError(_))));
    assert!(!dir.path().join(".modulith.json").exists());
}
