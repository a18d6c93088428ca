//! Project configuration store.
//!
//! The project record lives in `.modulith.json` at the project root and every
//! generated entity has its own record in `.modulith/<Entity>.json`. Records
//! are read back on regeneration so that the same placement decisions (module,
//! skipped REST controller) are reproduced. Keys this crate does not know about
//! are preserved.

use crate::constants::{ENTITY_CONFIG_DIR, PROJECT_CONFIG_FILE};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Sql,
    Mongodb,
    Cassandra,
    Couchbase,
    Neo4j,
    No,
}

impl DatabaseType {
    /// Databases served by reactive-only repositories when the app is reactive.
    pub fn has_reactive_repository(&self) -> bool {
        matches!(
            self,
            DatabaseType::Mongodb | DatabaseType::Cassandra | DatabaseType::Couchbase | DatabaseType::Neo4j
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    No,
    Elasticsearch,
    Couchbase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheProvider {
    #[default]
    No,
    Ehcache,
    Caffeine,
    Infinispan,
    Redis,
    Hazelcast,
    Memcached,
}

impl CacheProvider {
    /// Providers whose configuration class registers one cache per entity.
    pub fn has_entity_caches(&self) -> bool {
        matches!(
            self,
            CacheProvider::Ehcache | CacheProvider::Caffeine | CacheProvider::Infinispan | CacheProvider::Redis
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildTool {
    #[default]
    Maven,
    Gradle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dto {
    #[default]
    No,
    Mapstruct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Service {
    #[default]
    No,
    ServiceClass,
    ServiceImpl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Pagination {
    #[default]
    No,
    Pagination,
    InfiniteScroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

/// Application-wide choices, stored in `.modulith.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub base_name: String,
    pub package_name: String,
    #[serde(default)]
    pub database_type: DatabaseType,
    #[serde(default)]
    pub search_engine: SearchEngine,
    #[serde(default)]
    pub reactive: bool,
    #[serde(default)]
    pub cache_provider: CacheProvider,
    #[serde(default)]
    pub enable_hibernate_cache: bool,
    #[serde(default)]
    pub build_tool: BuildTool,
    #[serde(default)]
    pub gatling_tests: bool,
    #[serde(default)]
    pub use_module_for_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_module_name: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ProjectConfig {
    pub fn new(base_name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            package_name: package_name.into(),
            database_type: DatabaseType::default(),
            search_engine: SearchEngine::default(),
            reactive: false,
            cache_provider: CacheProvider::default(),
            enable_hibernate_cache: false,
            build_tool: BuildTool::default(),
            gatling_tests: false,
            use_module_for_user: false,
            user_module_name: None,
            extra: IndexMap::new(),
        }
    }

    /// Package name as a directory path, e.g. `com/mycompany/myapp`.
    pub fn package_folder(&self) -> String {
        self.package_name.replace('.', "/")
    }

    /// Module holding the user classes, if one was chosen.
    pub fn user_module(&self) -> Option<&str> {
        self.user_module_name
            .as_deref()
            .filter(|name| self.use_module_for_user && !name.is_empty())
    }
}

/// A field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub field_name: String,
    /// Built-in type name, or the enum class name when `field_values` is set.
    pub field_type: String,
    /// Comma separated enum constants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_values: Option<String>,
}

/// A relationship from an entity to another one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub relationship_name: String,
    pub other_entity_name: String,
    pub relationship_type: RelationshipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_side: Option<bool>,
}

/// Stored choices of one entity, in `.modulith/<Entity>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityConfig {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    pub changelog_date: String,
    #[serde(default)]
    pub dto: Dto,
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub jpa_metamodel_filtering: bool,
    #[serde(default)]
    pub embedded: bool,
    #[serde(default)]
    pub skip_fake_data: bool,
    #[serde(default)]
    pub skip_db_changelog: bool,
    /// Module of the entity. `Some("")` records an explicit "no module".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_rest: Option<bool>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl EntityConfig {
    pub fn new(name: impl Into<String>, changelog_date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relationships: Vec::new(),
            changelog_date: changelog_date.into(),
            dto: Dto::default(),
            service: Service::default(),
            pagination: Pagination::default(),
            jpa_metamodel_filtering: false,
            embedded: false,
            skip_fake_data: false,
            skip_db_changelog: false,
            module: None,
            skip_rest: None,
            extra: IndexMap::new(),
        }
    }
}

/// Reads and writes configuration records under a project root.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn project_config_path(&self) -> PathBuf {
        self.root.join(PROJECT_CONFIG_FILE)
    }

    pub fn entity_config_path(&self, entity: &str) -> PathBuf {
        self.root.join(ENTITY_CONFIG_DIR).join(format!("{entity}.json"))
    }

    pub fn load_project(&self) -> Result<Option<ProjectConfig>> {
        read_record(&self.project_config_path())
    }

    /// Loads the project record, failing when the application was never generated.
    pub fn require_project(&self) -> Result<ProjectConfig> {
        self.load_project()?.ok_or_else(|| {
            Error::ConfigError(format!(
                "no project configuration found at '{}', generate the application first",
                self.project_config_path().display()
            ))
        })
    }

    pub fn save_project(&self, config: &ProjectConfig) -> Result<()> {
        write_record(&self.project_config_path(), config)
    }

    pub fn load_entity(&self, entity: &str) -> Result<Option<EntityConfig>> {
        read_record(&self.entity_config_path(entity))
    }

    pub fn save_entity(&self, config: &EntityConfig) -> Result<()> {
        write_record(&self.entity_config_path(&config.name), config)
    }

    /// Reads an entity record, applies `update` and writes it back.
    pub fn update_entity<F>(&self, entity: &str, update: F) -> Result<EntityConfig>
    where
        F: FnOnce(&mut EntityConfig),
    {
        let mut config = self.load_entity(entity)?.ok_or_else(|| {
            Error::ConfigError(format!("no configuration stored for entity '{entity}'"))
        })?;
        update(&mut config);
        self.save_entity(&config)?;
        Ok(config)
    }

    /// Names of all entities with a stored record, sorted.
    pub fn list_entities(&self) -> Result<Vec<String>> {
        let dir = self.root.join(ENTITY_CONFIG_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut entities = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::ConfigError(e.to_string()))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    entities.push(stem.to_string());
                }
            }
        }
        entities.sort();
        Ok(entities)
    }
}

fn read_record<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = serde_json::to_string_pretty(record)?;
    content.push('\n');
    debug!("Saving configuration to {}", path.display());
    fs::write(path, content).map_err(Error::IoError)
}
