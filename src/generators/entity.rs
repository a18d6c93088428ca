//! Entity generator.
//!
//! The base steps ask for the entity content (fields, relationships, service
//! options). The module steps are spliced in after them: whether to generate
//! a REST controller and which module the entity belongs to. Both choices
//! are stored in the entity record, so regenerating reproduces them.

use std::path::PathBuf;

use cruet::Inflector;
use log::debug;
use serde_json::Value;

use crate::config::{
    ConfigStore, DatabaseType, Dto, EntityConfig, Field, Pagination, ProjectConfig, Relationship, Service,
};
use crate::constants::USER_ENTITY;
use crate::context::{EntityContext, FIELD_TYPES};
use crate::error::{Error, Result};
use crate::fake_data::{fake_header, fake_rows};
use crate::generators::entity_server;
use crate::generators::{report_written, run_install, GeneratorOptions};
use crate::lifecycle::{Lifecycle, Phase, Stage};
use crate::loader::{get_loader, TemplateLoader};
use crate::module::{check_relationship_modules, validate_module_name};
use crate::prompt::{prompt, Answers, Choice, Prompter, Question};
use crate::renderer::TemplateRenderer;

/// Options of an entity run, from the command line.
#[derive(Debug, Clone, Default)]
pub struct EntityOptions {
    pub name: String,
    /// Regenerate from the stored record without asking anything.
    pub regenerate: bool,
    /// Only update the record; no server files, no module.
    pub skip_server: bool,
}

/// What to do with an entity that already has a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateMode {
    Create,
    Regenerate,
    Add,
}

/// State of an entity generation run.
pub struct EntityGenerator<'a> {
    store: ConfigStore,
    prompter: &'a dyn Prompter,
    renderer: &'a dyn TemplateRenderer,
    loader: Box<dyn TemplateLoader>,
    options: GeneratorOptions,
    entity_options: EntityOptions,
    mode: UpdateMode,
    project: Option<ProjectConfig>,
    /// Record found on disk before the run.
    stored: Option<EntityConfig>,
    /// Record being built from the answers.
    config: Option<EntityConfig>,
    context: Option<EntityContext>,
    skip_rest: bool,
    module: Option<String>,
    written: Vec<PathBuf>,
}

impl<'a> EntityGenerator<'a> {
    pub fn new(
        options: GeneratorOptions,
        entity_options: EntityOptions,
        prompter: &'a dyn Prompter,
        renderer: &'a dyn TemplateRenderer,
    ) -> Self {
        Self {
            store: ConfigStore::new(&options.project_dir),
            loader: get_loader(&options.templates, "entity-server"),
            prompter,
            renderer,
            options,
            entity_options,
            mode: UpdateMode::Create,
            project: None,
            stored: None,
            config: None,
            context: None,
            skip_rest: false,
            module: None,
            written: Vec::new(),
        }
    }

    /// Runs the whole lifecycle.
    pub fn run(&mut self) -> Result<()> {
        lifecycle()?.run(self)
    }

    pub fn context(&self) -> Option<&EntityContext> {
        self.context.as_ref()
    }

    /// Files written by the run.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn entity_class(&self) -> String {
        self.entity_options.name.to_pascal_case()
    }

    fn config_mut(&mut self) -> Result<&mut EntityConfig> {
        self.config
            .as_mut()
            .ok_or_else(|| Error::ConfigError("entity record is not initialized".to_string()))
    }

    fn context_ref(&self) -> Result<&EntityContext> {
        self.context
            .as_ref()
            .ok_or_else(|| Error::ConfigError("entity is not configured".to_string()))
    }

    fn context_mut(&mut self) -> Result<&mut EntityContext> {
        self.context
            .as_mut()
            .ok_or_else(|| Error::ConfigError("entity is not configured".to_string()))
    }

    fn asks_content(&self) -> bool {
        self.mode != UpdateMode::Regenerate
    }

    fn asks_options(&self) -> bool {
        self.mode == UpdateMode::Create
    }
}

/// Steps of the base entity generator.
pub fn base_lifecycle<'a>() -> Lifecycle<EntityGenerator<'a>> {
    Lifecycle::new()
        .with_stage(
            Stage::new(Phase::Initializing)
                .step("validate_entity_name", validate_entity_name)
                .step("load_project_config", load_project_config)
                .step("load_entity_config", load_entity_config)
                .step("setup_naming", setup_naming),
        )
        .with_stage(
            Stage::new(Phase::Prompting)
                .step("ask_fields", ask_fields)
                .step("ask_relationships", ask_relationships)
                .step("ask_dto", ask_dto)
                .step("ask_service", ask_service)
                .step("ask_pagination", ask_pagination)
                .step("ask_filtering", ask_filtering),
        )
        .with_stage(
            Stage::new(Phase::Configuring)
                .step("configure_entity", configure_entity)
                .step("save_entity_config", save_entity_config),
        )
        .with_stage(Stage::new(Phase::Default).step("setup_reproducibility", setup_reproducibility))
        .with_stage(Stage::new(Phase::Writing).step("write_server_files", write_server_files))
        .with_stage(Stage::new(Phase::Install).step("install", install))
        .with_stage(Stage::new(Phase::End).step("report", report))
}

/// Base steps plus the REST and module steps.
pub fn lifecycle<'a>() -> Result<Lifecycle<EntityGenerator<'a>>> {
    let mut lifecycle = base_lifecycle();

    let prompting = lifecycle.stage_mut(Phase::Prompting);
    prompting.push("ask_skip_rest", ask_skip_rest)?;
    prompting.push("ask_module_name", ask_module_name)?;

    let configuring = lifecycle.stage_mut(Phase::Configuring);
    configuring.push("configure_module_data", configure_module_data)?;
    configuring.push("configure_skip_rest_data", configure_skip_rest_data)?;

    let writing = lifecycle.stage_mut(Phase::Writing);
    writing.insert_before("write_server_files", "write_module_config_files", write_module_config_files)?;
    writing.insert_after("write_server_files", "write_enum_files", write_enum_files)?;

    Ok(lifecycle)
}

fn is_identifier(input: &str) -> bool {
    input.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && input.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_entity_name(generator: &mut EntityGenerator) -> Result<()> {
    let name = &generator.entity_options.name;
    if !is_identifier(name) {
        return Err(Error::ValidationError(format!(
            "the entity name '{name}' must start with a letter and contain only letters, digits and '_'"
        )));
    }
    if name.to_pascal_case() == USER_ENTITY {
        return Err(Error::ValidationError(format!(
            "the entity name cannot be '{USER_ENTITY}', it is generated with the application"
        )));
    }
    Ok(())
}

fn load_project_config(generator: &mut EntityGenerator) -> Result<()> {
    generator.project = Some(generator.store.require_project()?);
    Ok(())
}

fn load_entity_config(generator: &mut EntityGenerator) -> Result<()> {
    let class = generator.entity_class();
    generator.stored = generator.store.load_entity(&class)?;

    generator.mode = match (&generator.stored, generator.entity_options.regenerate) {
        (None, true) => {
            return Err(Error::ConfigError(format!("cannot regenerate entity '{class}': it has no stored record")))
        }
        (None, false) => UpdateMode::Create,
        (Some(_), true) => UpdateMode::Regenerate,
        (Some(_), false) => {
            println!("Found the {} configuration file, entity can be automatically generated!", class);
            let question = Question::list(
                "updateEntity",
                "Do you want to update the entity? This will replace the existing files for this entity, all your custom code will be overwritten",
                vec![
                    Choice::new("regenerate", "Yes, re-generate the entity"),
                    Choice::new("add", "Yes, add more fields and relationships"),
                ],
                0,
            );
            let answers = prompt(generator.prompter, &[question])?;
            match answers.get("updateEntity").and_then(Value::as_str) {
                Some("add") => UpdateMode::Add,
                _ => UpdateMode::Regenerate,
            }
        }
    };
    debug!("Entity {} mode: {:?}", class, generator.mode);
    Ok(())
}

fn setup_naming(generator: &mut EntityGenerator) -> Result<()> {
    let class = generator.entity_class();
    let project = generator
        .project
        .as_ref()
        .ok_or_else(|| Error::ConfigError("project configuration is not loaded".to_string()))?;
    generator.context = Some(EntityContext::new(project, &class));
    generator.config = Some(match &generator.stored {
        Some(stored) => stored.clone(),
        None => EntityConfig::new(class, chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()),
    });
    Ok(())
}

fn answer_str(answers: &Answers, key: &str) -> String {
    answers.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn answer_bool(answers: &Answers, key: &str) -> bool {
    answers.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn validate_field_name(input: &str) -> std::result::Result<(), String> {
    if input.is_empty() {
        return Err("Your field name cannot be empty".to_string());
    }
    if !is_identifier(input) || !input.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err("Your field name cannot contain special characters and must start with a lower case letter".to_string());
    }
    Ok(())
}

fn validate_class_name(input: &str) -> std::result::Result<(), String> {
    if !is_identifier(input) || !input.starts_with(|c: char| c.is_ascii_uppercase()) {
        return Err("Your class name must start with an upper case letter and contain only letters and digits".to_string());
    }
    Ok(())
}

fn validate_entity_reference(input: &str) -> std::result::Result<(), String> {
    if !is_identifier(input) {
        return Err("Your other entity name cannot contain special characters".to_string());
    }
    Ok(())
}

fn field_questions() -> Vec<Question> {
    let mut types: Vec<Choice> = FIELD_TYPES.iter().map(|t| Choice::new(*t, *t)).collect();
    types.push(Choice::new("Enum", "Enumeration (Java enum type)"));
    vec![
        Question::confirm("fieldAdd", "Do you want to add a field to your entity?", false),
        Question::input("fieldName", "What is the name of your field?", "")
            .when(|answers| answer_bool(answers, "fieldAdd"))
            .validate(validate_field_name),
        Question::list("fieldType", "What is the type of your field?", types, 0)
            .when(|answers| answer_bool(answers, "fieldAdd")),
        Question::input("enumType", "What is the class name of your enumeration?", "")
            .when(|answers| answer_bool(answers, "fieldAdd") && answer_str(answers, "fieldType") == "Enum")
            .validate(validate_class_name),
        Question::input("fieldValues", "What are the values of your enumeration (separated by comma, no spaces)?", "")
            .when(|answers| answer_bool(answers, "fieldAdd") && answer_str(answers, "fieldType") == "Enum"),
    ]
}

fn push_field(fields: &mut Vec<Field>, field: Field) -> Result<()> {
    if fields.iter().any(|f| f.field_name == field.field_name) {
        return Err(Error::ValidationError(format!("field '{}' already exists", field.field_name)));
    }
    if field.field_values.is_none() && !FIELD_TYPES.contains(&field.field_type.as_str()) {
        return Err(Error::ValidationError(format!(
            "field '{}' has type '{}', which is neither a known type nor an enumeration",
            field.field_name, field.field_type
        )));
    }
    fields.push(field);
    Ok(())
}

fn ask_fields(generator: &mut EntityGenerator) -> Result<()> {
    if !generator.asks_content() {
        return Ok(());
    }
    let mut fields = generator.config_mut()?.fields.clone();

    if let Some(preset) = generator.prompter.preset("fields") {
        let preset: Vec<Field> = serde_json::from_value(preset)?;
        for field in preset {
            push_field(&mut fields, field)?;
        }
    } else {
        loop {
            println!("Generating field #{}", fields.len() + 1);
            let answers = prompt(generator.prompter, &field_questions())?;
            if !answer_bool(&answers, "fieldAdd") {
                break;
            }
            let field = match answer_str(&answers, "fieldType").as_str() {
                "Enum" => Field {
                    field_name: answer_str(&answers, "fieldName"),
                    field_type: answer_str(&answers, "enumType"),
                    field_values: Some(answer_str(&answers, "fieldValues")),
                },
                field_type => Field {
                    field_name: answer_str(&answers, "fieldName"),
                    field_type: field_type.to_string(),
                    field_values: None,
                },
            };
            push_field(&mut fields, field)?;
        }
    }

    generator.config_mut()?.fields = fields;
    Ok(())
}

fn relationship_questions() -> Vec<Question> {
    vec![
        Question::confirm("relationshipAdd", "Do you want to add a relationship to another entity?", false),
        Question::input("otherEntityName", "What is the name of the other entity?", "")
            .when(|answers| answer_bool(answers, "relationshipAdd"))
            .validate(validate_entity_reference),
        Question::input("relationshipName", "What is the name of the relationship? (empty for the other entity name)", "")
            .when(|answers| answer_bool(answers, "relationshipAdd")),
        Question::list(
            "relationshipType",
            "What is the type of the relationship?",
            vec![
                Choice::new("many-to-one", "many-to-one"),
                Choice::new("many-to-many", "many-to-many"),
                Choice::new("one-to-one", "one-to-one"),
                Choice::new("one-to-many", "one-to-many"),
            ],
            0,
        )
        .when(|answers| answer_bool(answers, "relationshipAdd")),
        Question::confirm("ownerSide", "Is this entity the owner of the relationship?", true).when(|answers| {
            answer_bool(answers, "relationshipAdd")
                && matches!(answer_str(answers, "relationshipType").as_str(), "many-to-many" | "one-to-one")
        }),
    ]
}

fn push_relationship(relationships: &mut Vec<Relationship>, relationship: Relationship) -> Result<()> {
    if relationships.iter().any(|r| r.relationship_name == relationship.relationship_name) {
        return Err(Error::ValidationError(format!(
            "relationship '{}' already exists",
            relationship.relationship_name
        )));
    }
    relationships.push(relationship);
    Ok(())
}

fn ask_relationships(generator: &mut EntityGenerator) -> Result<()> {
    if !generator.asks_content() {
        return Ok(());
    }
    let mut relationships = generator.config_mut()?.relationships.clone();

    if let Some(preset) = generator.prompter.preset("relationships") {
        let preset: Vec<Relationship> = serde_json::from_value(preset)?;
        for relationship in preset {
            push_relationship(&mut relationships, relationship)?;
        }
    } else {
        loop {
            let mut answers = prompt(generator.prompter, &relationship_questions())?;
            if !answer_bool(&answers, "relationshipAdd") {
                break;
            }
            let other_entity_name = answer_str(&answers, "otherEntityName");
            let mut relationship_name = answer_str(&answers, "relationshipName");
            if relationship_name.is_empty() {
                relationship_name = other_entity_name.to_camel_case();
            }
            answers.insert("relationshipName".to_string(), Value::String(relationship_name));
            answers.remove("relationshipAdd");
            let relationship: Relationship = serde_json::from_value(Value::Object(answers))?;
            push_relationship(&mut relationships, relationship)?;
        }
    }

    generator.config_mut()?.relationships = relationships;
    Ok(())
}

fn ask_dto(generator: &mut EntityGenerator) -> Result<()> {
    if !generator.asks_options() {
        return Ok(());
    }
    let question = Question::list(
        "dto",
        "Do you want to use a Data Transfer Object (DTO)?",
        vec![Choice::new("no", "No, use the entity directly"), Choice::new("mapstruct", "Yes, generate a DTO with MapStruct")],
        0,
    );
    let answers = prompt(generator.prompter, &[question])?;
    let dto: Dto = serde_json::from_value(answers.get("dto").cloned().unwrap_or_default())?;
    generator.config_mut()?.dto = dto;
    Ok(())
}

fn ask_service(generator: &mut EntityGenerator) -> Result<()> {
    if !generator.asks_options() {
        return Ok(());
    }
    let question = Question::list(
        "service",
        "Do you want to use separate service class for your business logic?",
        vec![
            Choice::new("no", "No, the REST controller should use the repository directly"),
            Choice::new("serviceClass", "Yes, generate a separate service class"),
            Choice::new("serviceImpl", "Yes, generate a separate service interface and implementation"),
        ],
        0,
    );
    let answers = prompt(generator.prompter, &[question])?;
    let service: Service = serde_json::from_value(answers.get("service").cloned().unwrap_or_default())?;
    generator.config_mut()?.service = service;
    Ok(())
}

fn ask_pagination(generator: &mut EntityGenerator) -> Result<()> {
    if !generator.asks_options() {
        return Ok(());
    }
    let question = Question::list(
        "pagination",
        "Do you want pagination on your entity?",
        vec![
            Choice::new("no", "No"),
            Choice::new("pagination", "Yes, with pagination links"),
            Choice::new("infinite-scroll", "Yes, with infinite scroll"),
        ],
        0,
    );
    let answers = prompt(generator.prompter, &[question])?;
    let pagination: Pagination = serde_json::from_value(answers.get("pagination").cloned().unwrap_or_default())?;
    generator.config_mut()?.pagination = pagination;
    Ok(())
}

fn ask_filtering(generator: &mut EntityGenerator) -> Result<()> {
    if !generator.asks_options() {
        return Ok(());
    }
    let sql = generator
        .project
        .as_ref()
        .is_some_and(|project| project.database_type == DatabaseType::Sql && !project.reactive);
    if !sql || generator.config_mut()?.service == Service::No {
        return Ok(());
    }
    let question = Question::confirm(
        "jpaMetamodelFiltering",
        "Do you want to add filtering?",
        false,
    );
    let answers = prompt(generator.prompter, &[question])?;
    generator.config_mut()?.jpa_metamodel_filtering = answer_bool(&answers, "jpaMetamodelFiltering");
    Ok(())
}

fn ask_skip_rest(generator: &mut EntityGenerator) -> Result<()> {
    if generator.entity_options.skip_server {
        generator.skip_rest = false;
        return Ok(());
    }
    if let Some(skip_rest) = generator.stored.as_ref().and_then(|stored| stored.skip_rest) {
        generator.skip_rest = skip_rest;
        return Ok(());
    }
    if !generator.asks_content() {
        generator.skip_rest = false;
        return Ok(());
    }
    let question = Question::list(
        "controller",
        "Do you want to generate a REST controller for this entity?",
        vec![Choice::new("yes", "Yes"), Choice::new("no", "No")],
        0,
    );
    let answers = prompt(generator.prompter, &[question])?;
    generator.skip_rest = answer_str(&answers, "controller") == "no";
    Ok(())
}

fn module_questions() -> Vec<Question> {
    vec![
        Question::confirm("useModule", "Do you want to place this entity in a module?", true),
        Question::input("moduleName", "What is the name of the module?", "")
            .when(|answers| answer_bool(answers, "useModule"))
            .validate(validate_module_name),
    ]
}

fn ask_module_name(generator: &mut EntityGenerator) -> Result<()> {
    if generator.entity_options.skip_server {
        generator.module = None;
        return Ok(());
    }
    if let Some(module) = generator.stored.as_ref().and_then(|stored| stored.module.clone()) {
        generator.module = Some(module).filter(|module| !module.is_empty());
        return Ok(());
    }
    if !generator.asks_content() {
        generator.module = None;
        return Ok(());
    }
    let answers = prompt(generator.prompter, &module_questions())?;
    generator.module = if answer_bool(&answers, "useModule") {
        Some(answer_str(&answers, "moduleName"))
    } else {
        None
    };
    Ok(())
}

fn configure_entity(generator: &mut EntityGenerator) -> Result<()> {
    let config = generator.config_mut()?.clone();
    generator.context_mut()?.apply_entity_config(&config);
    Ok(())
}

fn save_entity_config(generator: &mut EntityGenerator) -> Result<()> {
    let config = generator.config_mut()?.clone();
    generator.store.save_entity(&config)
}

fn configure_module_data(generator: &mut EntityGenerator) -> Result<()> {
    let class = generator.entity_class();
    match generator.module.clone() {
        None => {
            generator.store.update_entity(&class, |config| config.module = Some(String::new()))?;
            generator.context_mut()?.set_module(None);
        }
        Some(module) => {
            let relationships = generator.config_mut()?.relationships.clone();
            check_relationship_modules(&generator.store, &class, &module, &relationships)?;
            generator.context_mut()?.set_module(Some(&module));
            println!("Saving {} module", module);
            generator.store.update_entity(&class, |config| config.module = Some(module))?;
        }
    }
    Ok(())
}

fn configure_skip_rest_data(generator: &mut EntityGenerator) -> Result<()> {
    let class = generator.entity_class();
    let skip_rest = generator.skip_rest;
    generator.store.update_entity(&class, |config| config.skip_rest = Some(skip_rest))?;
    generator.context_mut()?.skip_rest = skip_rest;
    Ok(())
}

fn setup_reproducibility(generator: &mut EntityGenerator) -> Result<()> {
    let context = generator.context_mut()?;
    if context.skip_fake_data {
        return Ok(());
    }
    let blob_dir = format!("../fake-data/{}blob", context.module_dir());
    context.fake_data_header = fake_header(&context.fields);
    context.fake_data_rows = fake_rows(&context.entity_class, &context.fields, &blob_dir);
    Ok(())
}

fn write_module_config_files(generator: &mut EntityGenerator) -> Result<()> {
    if generator.entity_options.skip_server {
        return Ok(());
    }
    let written = entity_server::write_module_config_files(
        generator.context_ref()?,
        generator.loader.as_ref(),
        generator.renderer,
        &generator.options.project_dir,
    )?;
    generator.written.extend(written);
    Ok(())
}

fn write_server_files(generator: &mut EntityGenerator) -> Result<()> {
    if generator.entity_options.skip_server {
        return Ok(());
    }
    let written = entity_server::write_server_files(
        generator.context_ref()?,
        generator.loader.as_ref(),
        generator.renderer,
        &generator.options.project_dir,
    )?;
    generator.written.extend(written);
    Ok(())
}

fn write_enum_files(generator: &mut EntityGenerator) -> Result<()> {
    if generator.entity_options.skip_server {
        return Ok(());
    }
    let written = entity_server::write_enum_files(
        generator.context_ref()?,
        generator.loader.as_ref(),
        generator.renderer,
        &generator.options.project_dir,
    )?;
    generator.written.extend(written);
    Ok(())
}

fn install(generator: &mut EntityGenerator) -> Result<()> {
    if generator.options.skip_install || generator.entity_options.skip_server {
        return Ok(());
    }
    let build_tool = generator
        .project
        .as_ref()
        .map(|project| project.build_tool)
        .unwrap_or_default();
    run_install(&generator.options.project_dir, build_tool)
}

fn report(generator: &mut EntityGenerator) -> Result<()> {
    report_written(&generator.options.project_dir, &generator.written);
    println!("Entity {} generated successfully.", generator.entity_class());
    let entities = generator.store.list_entities()?;
    println!("Project entities: {}", entities.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_steps_are_spliced_after_base_steps() {
        let lifecycle = lifecycle().unwrap();
        assert_eq!(
            lifecycle.stage(Phase::Prompting).step_names(),
            vec![
                "ask_fields",
                "ask_relationships",
                "ask_dto",
                "ask_service",
                "ask_pagination",
                "ask_filtering",
                "ask_skip_rest",
                "ask_module_name",
            ]
        );
        assert_eq!(
            lifecycle.stage(Phase::Configuring).step_names(),
            vec!["configure_entity", "save_entity_config", "configure_module_data", "configure_skip_rest_data"]
        );
        assert_eq!(
            lifecycle.stage(Phase::Writing).step_names(),
            vec!["write_module_config_files", "write_server_files", "write_enum_files"]
        );
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let field = Field { field_name: "title".to_string(), field_type: "String".to_string(), field_values: None };
        let mut fields = Vec::new();
        push_field(&mut fields, field.clone()).unwrap();
        assert!(matches!(push_field(&mut fields, field), Err(Error::ValidationError(_))));
    }

    #[test]
    fn unknown_field_type_needs_values() {
        let mut fields = Vec::new();
        let field = Field { field_name: "status".to_string(), field_type: "Status".to_string(), field_values: None };
        assert!(push_field(&mut fields, field).is_err());
    }

    #[test]
    fn entity_and_field_names() {
        assert!(is_identifier("Invoice"));
        assert!(!is_identifier("1nvoice"));
        assert!(!is_identifier("in-voice"));
        assert!(validate_field_name("amount").is_ok());
        assert!(validate_field_name("Amount").is_err());
        assert!(validate_class_name("InvoiceStatus").is_ok());
    }
}
