//! Application generator.
//!
//! Asks the application-wide questions, stores them in the project record and
//! writes the application skeleton the entity generator builds upon. The user
//! classes can be placed in a module of their own.

use std::path::PathBuf;

use regex::Regex;
use serde_json::Value;

use crate::config::{ConfigStore, DatabaseType, ProjectConfig};
use crate::constants::{SERVER_MAIN_RES_DIR, SERVER_MAIN_SRC_DIR, SERVER_TEST_SRC_DIR};
use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::generators::{report_written, run_install, GeneratorOptions};
use crate::lifecycle::{Lifecycle, Phase, Stage};
use crate::loader::{get_loader, TemplateLoader};
use crate::manifest::{self, FileRule, ManifestGroup, TemplateEntry};
use crate::module::validate_module_name;
use crate::prompt::{prompt, Answers, Choice, Prompter, Question};
use crate::renderer::TemplateRenderer;

type Rule = FileRule<AppContext>;
type Entry = TemplateEntry<AppContext>;

/// State of an application generation run.
pub struct AppGenerator<'a> {
    store: ConfigStore,
    prompter: &'a dyn Prompter,
    renderer: &'a dyn TemplateRenderer,
    loader: Box<dyn TemplateLoader>,
    options: GeneratorOptions,
    /// Project record found on disk, if the application was generated before.
    existing: Option<ProjectConfig>,
    answers: Answers,
    context: Option<AppContext>,
    written: Vec<PathBuf>,
}

impl<'a> AppGenerator<'a> {
    pub fn new(
        options: GeneratorOptions,
        prompter: &'a dyn Prompter,
        renderer: &'a dyn TemplateRenderer,
    ) -> Self {
        Self {
            store: ConfigStore::new(&options.project_dir),
            loader: get_loader(&options.templates, "app"),
            prompter,
            renderer,
            options,
            existing: None,
            answers: Answers::new(),
            context: None,
            written: Vec::new(),
        }
    }

    /// Runs the whole lifecycle.
    pub fn run(&mut self) -> Result<()> {
        lifecycle()?.run(self)
    }

    /// Files written by the run.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn context(&self) -> Result<&AppContext> {
        self.context
            .as_ref()
            .ok_or_else(|| Error::ConfigError("application is not configured".to_string()))
    }
}

/// Steps every application run goes through.
pub fn base_lifecycle<'a>() -> Lifecycle<AppGenerator<'a>> {
    Lifecycle::new()
        .with_stage(Stage::new(Phase::Initializing).step("load_project_config", load_project_config))
        .with_stage(Stage::new(Phase::Prompting).step("ask_application", ask_application))
        .with_stage(Stage::new(Phase::Configuring).step("configure_application", configure_application))
        .with_stage(Stage::new(Phase::Writing).step("write_application_files", write_application_files))
        .with_stage(Stage::new(Phase::Install).step("install", install))
        .with_stage(Stage::new(Phase::End).step("report", report))
}

/// Base lifecycle with the user-module question asked first.
pub fn lifecycle<'a>() -> Result<Lifecycle<AppGenerator<'a>>> {
    let mut lifecycle = base_lifecycle();
    lifecycle.stage_mut(Phase::Prompting).prepend("ask_module_name", ask_module_name)?;
    Ok(lifecycle)
}

fn load_project_config(generator: &mut AppGenerator) -> Result<()> {
    generator.existing = generator.store.load_project()?;
    if generator.existing.is_some() {
        println!("Regenerating the application from {}", generator.store.project_config_path().display());
    }
    Ok(())
}

fn is_true(answers: &Answers, key: &str) -> bool {
    answers.get(key) == Some(&Value::Bool(true))
}

fn user_module_questions() -> Vec<Question> {
    vec![
        Question::confirm(
            "useModuleForUser",
            "Do you want to move user related classes to a module?",
            true,
        ),
        Question::input("userModuleName", "What's the module name for your user classes?", "")
            .when(|answers| is_true(answers, "useModuleForUser"))
            .validate(validate_module_name),
    ]
}

fn ask_module_name(generator: &mut AppGenerator) -> Result<()> {
    if generator.existing.is_some() {
        return Ok(());
    }
    let answers = prompt(generator.prompter, &user_module_questions())?;
    generator.answers.extend(answers);
    Ok(())
}

fn validate_base_name(input: &str) -> std::result::Result<(), String> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Your base name cannot contain special characters or a blank space".to_string());
    }
    if input.starts_with(|c: char| c.is_ascii_digit()) {
        return Err("Your base name cannot start with a number".to_string());
    }
    Ok(())
}

fn validate_package_name(input: &str) -> std::result::Result<(), String> {
    let pattern = Regex::new(r"^([a-z_][a-z0-9_]*)(\.[a-z_][a-z0-9_]*)*$").map_err(|e| e.to_string())?;
    if !pattern.is_match(input) {
        return Err("The package name you have provided is not a valid Java package name".to_string());
    }
    Ok(())
}

fn choices(values: &[(&str, &str)]) -> Vec<Choice> {
    values.iter().map(|(value, name)| Choice::new(*value, *name)).collect()
}

fn application_questions() -> Vec<Question> {
    vec![
        Question::input("baseName", "What is the base name of your application?", "myapp")
            .validate(validate_base_name),
        Question::input("packageName", "What is your default Java package name?", "com.mycompany.myapp")
            .validate(validate_package_name),
        Question::list(
            "databaseType",
            "Which type of database would you like to use?",
            choices(&[
                ("sql", "SQL (H2, PostgreSQL, MySQL, MariaDB, Oracle, MSSQL)"),
                ("mongodb", "MongoDB"),
                ("cassandra", "Cassandra"),
                ("couchbase", "Couchbase"),
                ("neo4j", "Neo4j"),
                ("no", "No database"),
            ]),
            0,
        ),
        Question::list(
            "searchEngine",
            "Which other technologies would you like to use for search?",
            choices(&[("no", "No search engine"), ("elasticsearch", "Elasticsearch"), ("couchbase", "Couchbase FTS")]),
            0,
        ),
        Question::confirm("reactive", "Do you want to make it reactive with Spring WebFlux?", false),
        Question::list(
            "cacheProvider",
            "Which cache do you want to use? (Spring cache abstraction)",
            choices(&[
                ("ehcache", "Ehcache (local cache, for a single node)"),
                ("caffeine", "Caffeine (local cache, for a single node)"),
                ("infinispan", "Infinispan (hybrid cache, for multiple nodes)"),
                ("redis", "Redis (distributed cache)"),
                ("hazelcast", "Hazelcast (distributed cache, for multiple nodes)"),
                ("memcached", "Memcached (distributed cache)"),
                ("no", "No cache"),
            ]),
            0,
        )
        .when(|answers| answers.get("databaseType").and_then(Value::as_str) == Some("sql")),
        Question::confirm("enableHibernateCache", "Do you want to use Hibernate 2nd level cache?", true)
            .when(|answers| {
                answers.get("databaseType").and_then(Value::as_str) == Some("sql")
                    && answers.get("cacheProvider").and_then(Value::as_str) != Some("no")
            }),
        Question::list(
            "buildTool",
            "Would you like to use Maven or Gradle for building the backend?",
            choices(&[("maven", "Maven"), ("gradle", "Gradle")]),
            0,
        ),
        Question::confirm("gatlingTests", "Do you want to generate Gatling performance tests?", false),
    ]
}

fn ask_application(generator: &mut AppGenerator) -> Result<()> {
    if generator.existing.is_some() {
        return Ok(());
    }
    let answers = prompt(generator.prompter, &application_questions())?;
    generator.answers.extend(answers);
    Ok(())
}

fn configure_application(generator: &mut AppGenerator) -> Result<()> {
    let config = match generator.existing.take() {
        Some(config) => config,
        None => serde_json::from_value(Value::Object(generator.answers.clone()))?,
    };
    generator.store.save_project(&config)?;
    generator.context = Some(AppContext::new(&config));
    Ok(())
}

/// Files of the application skeleton.
pub fn app_files() -> Vec<ManifestGroup<AppContext>> {
    vec![
        ManifestGroup::new(
            "server",
            vec![
                Rule::new(SERVER_MAIN_SRC_DIR).template(
                    Entry::render("package/Application.java")
                        .rename_to(|app| format!("{}/{}.java", app.package_folder, app.main_class)),
                ),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|app| !matches!(app.database_type, DatabaseType::Cassandra | DatabaseType::No))
                    .template(
                        Entry::render("package/config/DatabaseConfiguration.java")
                            .rename_to(|app| format!("{}/config/DatabaseConfiguration.java", app.package_folder)),
                    ),
                Rule::new(SERVER_MAIN_SRC_DIR).when(|app| app.uses_hibernate_cache()).template(
                    Entry::render("package/config/CacheConfiguration.java")
                        .rename_to(|app| format!("{}/config/CacheConfiguration.java", app.package_folder)),
                ),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|app| app.database_type != DatabaseType::No)
                    .template(
                        Entry::render("package/domain/User.java")
                            .rename_to(|app| format!("{}/domain/User.java", app.user_folder)),
                    )
                    .template(
                        Entry::render("package/repository/UserRepository.java")
                            .rename_to(|app| format!("{}/repository/UserRepository.java", app.user_folder)),
                    ),
            ],
        ),
        ManifestGroup::new(
            "resources",
            vec![
                Rule::new(SERVER_MAIN_RES_DIR).template(Entry::render("config/application.yml")),
                Rule::new(SERVER_MAIN_RES_DIR)
                    .when(|app| app.database_type == DatabaseType::Sql)
                    .template(Entry::render("config/liquibase/master.xml")),
            ],
        ),
        ManifestGroup::new(
            "test",
            vec![Rule::new(SERVER_TEST_SRC_DIR).template(
                Entry::render("package/web/rest/TestUtil.java")
                    .rename_to(|app| format!("{}/web/rest/TestUtil.java", app.package_folder)),
            )],
        ),
    ]
}

fn write_application_files(generator: &mut AppGenerator) -> Result<()> {
    let context = generator.context()?;
    let written = manifest::write(
        &app_files(),
        context,
        generator.loader.as_ref(),
        generator.renderer,
        &generator.options.project_dir,
    )?;
    generator.written.extend(written);
    Ok(())
}

fn install(generator: &mut AppGenerator) -> Result<()> {
    if generator.options.skip_install {
        return Ok(());
    }
    let build_tool = generator.store.require_project()?.build_tool;
    run_install(&generator.options.project_dir, build_tool)
}

fn report(generator: &mut AppGenerator) -> Result<()> {
    report_written(&generator.options.project_dir, &generator.written);
    println!(
        "Application {} generated successfully in {}.",
        generator.context()?.base_name,
        generator.options.project_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_validation() {
        assert!(validate_package_name("com.mycompany.myapp").is_ok());
        assert!(validate_package_name("com").is_ok());
        assert!(validate_package_name("com.MyCompany").is_err());
        assert!(validate_package_name("com..app").is_err());
        assert!(validate_package_name("").is_err());
    }

    #[test]
    fn base_name_validation() {
        assert!(validate_base_name("sampleMysql").is_ok());
        assert!(validate_base_name("my-app").is_err());
        assert!(validate_base_name("1app").is_err());
    }

    #[test]
    fn module_question_is_spliced_first() {
        let lifecycle = lifecycle().unwrap();
        assert_eq!(
            lifecycle.stage(Phase::Prompting).step_names(),
            vec!["ask_module_name", "ask_application"]
        );
    }
}
