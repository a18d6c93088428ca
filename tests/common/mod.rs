#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use modulith::context::EntityContext;
use modulith::error::Result;
use modulith::generators::app::AppGenerator;
use modulith::generators::entity::{EntityGenerator, EntityOptions};
use modulith::generators::GeneratorOptions;
use modulith::prompt::AnswerPrompter;
use modulith::renderer::MiniJinjaRenderer;
use serde_json::{json, Value};
use walkdir::WalkDir;

pub const PACKAGE_FOLDER: &str = "src/main/java/com/mycompany/myapp";
pub const TEST_FOLDER: &str = "src/test/java/com/mycompany/myapp";

pub fn answers(value: Value) -> IndexMap<String, Value> {
    serde_json::from_value(value).unwrap()
}

/// Generates an SQL application with an entity cache into `dir`.
pub fn generate_app(dir: &Path, overrides: Value) -> Vec<PathBuf> {
    let mut preloaded = answers(json!({
        "useModuleForUser": false,
        "baseName": "store",
        "packageName": "com.mycompany.myapp",
        "databaseType": "sql",
        "cacheProvider": "ehcache",
        "enableHibernateCache": true,
        "buildTool": "maven",
        "gatlingTests": false
    }));
    preloaded.extend(answers(overrides));

    let prompter = AnswerPrompter::new(preloaded);
    let renderer = MiniJinjaRenderer::new();
    let mut generator = AppGenerator::new(GeneratorOptions::new(dir), &prompter, &renderer);
    generator.run().unwrap();
    generator.written().to_vec()
}

/// Result of an entity run: written paths relative to the project and the final context.
pub struct EntityRun {
    pub written: Vec<String>,
    pub context: Option<EntityContext>,
}

pub fn run_entity(dir: &Path, name: &str, preloaded: Value, regenerate: bool) -> Result<EntityRun> {
    let prompter = AnswerPrompter::new(answers(preloaded));
    let renderer = MiniJinjaRenderer::new();
    let options = EntityOptions { name: name.to_string(), regenerate, skip_server: false };
    let mut generator = EntityGenerator::new(GeneratorOptions::new(dir), options, &prompter, &renderer);
    generator.run()?;
    Ok(EntityRun {
        written: relative(dir, generator.written()),
        context: generator.context().cloned(),
    })
}

/// Answers for an Invoice with an amount, an enum status, a DTO and a service implementation.
pub fn invoice_answers(module: Option<&str>) -> Value {
    json!({
        "fields": [
            { "fieldName": "amount", "fieldType": "BigDecimal" },
            { "fieldName": "status", "fieldType": "InvoiceStatus", "fieldValues": "DRAFT,PAID" }
        ],
        "relationships": [],
        "dto": "mapstruct",
        "service": "serviceImpl",
        "pagination": "no",
        "controller": "yes",
        "useModule": module.is_some(),
        "moduleName": module.unwrap_or_default()
    })
}

pub fn relative(dir: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.strip_prefix(dir).unwrap_or(path).to_string_lossy().replace('\\', "/"))
        .collect()
}

pub fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative)).unwrap()
}

/// Copies a whole project tree.
pub fn copy_tree(from: &Path, to: &Path) {
    for entry in WalkDir::new(from) {
        let entry = entry.unwrap();
        let target = to.join(entry.path().strip_prefix(from).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}
