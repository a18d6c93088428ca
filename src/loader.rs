//! Template loading for modulith.
//! Templates are compiled into the binary; a local directory can override any
//! of them by providing a file under the same identifier.
use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Represents where a template set is read from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Templates compiled into the binary
    Builtin,
    /// Local directory overriding the built-in templates
    FileSystem(PathBuf),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::Builtin => write!(f, "built-in templates"),
            TemplateSource::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
        }
    }
}

/// Trait for loading template files by identifier.
pub trait TemplateLoader {
    /// Loads the raw bytes of a template.
    ///
    /// # Arguments
    /// * `id` - Template identifier relative to the template namespace,
    ///   e.g. `src/main/java/package/domain/Entity.java.j2`
    ///
    /// # Errors
    /// * `Error::TemplateNotFoundError` if the template does not exist
    fn load(&self, id: &str) -> Result<Vec<u8>>;
}

macro_rules! builtin_templates {
    ($($path:literal),* $(,)?) => {
        &[$(($path, include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $path)) as &[u8])),*]
    };
}

static BUILTIN_TEMPLATES: &[(&str, &[u8])] = builtin_templates![
    "app/src/main/java/package/Application.java.j2",
    "app/src/main/java/package/config/DatabaseConfiguration.java.j2",
    "app/src/main/java/package/config/CacheConfiguration.java.j2",
    "app/src/main/java/package/domain/User.java.j2",
    "app/src/main/java/package/repository/UserRepository.java.j2",
    "app/src/main/resources/config/application.yml.j2",
    "app/src/main/resources/config/liquibase/master.xml.j2",
    "app/src/test/java/package/web/rest/TestUtil.java.j2",
    "entity-server/src/main/resources/config/liquibase/changelog/added_entity.xml.j2",
    "entity-server/src/main/resources/config/liquibase/changelog/added_entity_constraints.xml.j2",
    "entity-server/src/main/resources/config/cql/changelog/added_entity.cql.j2",
    "entity-server/src/main/resources/config/couchmove/changelog/entity.fts.j2",
    "entity-server/src/main/resources/config/liquibase/fake-data/table.csv.j2",
    "entity-server/src/main/resources/config/liquibase/fake-data/blob/hipster.png",
    "entity-server/src/main/resources/config/liquibase/fake-data/blob/hipster.txt",
    "entity-server/src/main/java/package/config/ModuleDatabaseConfiguration.java.j2",
    "entity-server/src/main/java/package/domain/Entity.java.j2",
    "entity-server/src/main/java/package/domain/enumeration/Enum.java.j2",
    "entity-server/src/main/java/package/web/rest/EntityResource.java.j2",
    "entity-server/src/main/java/package/service/dto/EntityCriteria.java.j2",
    "entity-server/src/main/java/package/service/EntityQueryService.java.j2",
    "entity-server/src/main/java/package/repository/search/EntitySearchRepository.java.j2",
    "entity-server/src/main/java/package/repository/EntityRepository.java.j2",
    "entity-server/src/main/java/package/repository/EntityReactiveRepository.java.j2",
    "entity-server/src/main/java/package/service/EntityService.java.j2",
    "entity-server/src/main/java/package/service/impl/EntityServiceImpl.java.j2",
    "entity-server/src/main/java/package/service/dto/EntityDTO.java.j2",
    "entity-server/src/main/java/package/service/mapper/BaseEntityMapper.java.j2",
    "entity-server/src/main/java/package/service/mapper/EntityMapper.java.j2",
    "entity-server/src/test/java/package/web/rest/EntityResourceIT.java.j2",
    "entity-server/src/test/java/package/repository/search/EntitySearchRepositoryMockConfiguration.java.j2",
    "entity-server/src/test/gatling/user-files/simulations/EntityGatlingTest.scala.j2",
    "entity-server/src/test/java/package/domain/EntityTest.java.j2",
    "entity-server/src/test/java/package/service/dto/EntityDTOTest.java.j2",
    "entity-server/src/test/java/package/service/mapper/EntityMapperTest.java.j2",
];

/// Loader for the templates compiled into the binary.
pub struct EmbeddedLoader {
    namespace: &'static str,
}

impl EmbeddedLoader {
    /// Creates a loader scoped to one generator namespace (`app`, `entity-server`).
    pub fn new(namespace: &'static str) -> Self {
        Self { namespace }
    }
}

impl TemplateLoader for EmbeddedLoader {
    fn load(&self, id: &str) -> Result<Vec<u8>> {
        let full_id = format!("{}/{}", self.namespace, id);
        BUILTIN_TEMPLATES
            .iter()
            .find(|(path, _)| *path == full_id)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or(Error::TemplateNotFoundError(full_id))
    }
}

/// Loader for templates from a local directory.
pub struct LocalLoader<P: AsRef<Path>> {
    root: P,
    namespace: &'static str,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    /// Creates a new LocalLoader reading `<root>/<namespace>/<id>`.
    pub fn new(root: P, namespace: &'static str) -> Self {
        Self { root, namespace }
    }

    fn path_of(&self, id: &str) -> PathBuf {
        self.root.as_ref().join(self.namespace).join(id)
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    fn load(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.path_of(id);
        if !path.is_file() {
            return Err(Error::TemplateNotFoundError(path.display().to_string()));
        }
        debug!("Loading template from '{}'.", path.display());
        Ok(fs::read(&path)?)
    }
}

/// Loader that prefers a local override and falls back to built-in templates.
pub struct OverlayLoader<P: AsRef<Path>> {
    local: LocalLoader<P>,
    builtin: EmbeddedLoader,
}

impl<P: AsRef<Path>> OverlayLoader<P> {
    pub fn new(root: P, namespace: &'static str) -> Self {
        Self { local: LocalLoader::new(root, namespace), builtin: EmbeddedLoader::new(namespace) }
    }
}

impl<P: AsRef<Path>> TemplateLoader for OverlayLoader<P> {
    fn load(&self, id: &str) -> Result<Vec<u8>> {
        match self.local.load(id) {
            Err(Error::TemplateNotFoundError(_)) => self.builtin.load(id),
            result => result,
        }
    }
}

/// Returns the loader for a generator namespace from the provided template source.
pub fn get_loader(source: &TemplateSource, namespace: &'static str) -> Box<dyn TemplateLoader> {
    debug!("Using {} for '{}'.", source, namespace);
    match source {
        TemplateSource::Builtin => Box::new(EmbeddedLoader::new(namespace)),
        TemplateSource::FileSystem(root) => Box::new(OverlayLoader::new(root.clone(), namespace)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_source_display() {
        assert_eq!(TemplateSource::Builtin.to_string(), "built-in templates");
        let fs_source = TemplateSource::FileSystem(PathBuf::from("/path/to/templates"));
        assert_eq!(format!("{}", fs_source), "local path: '/path/to/templates'");
    }

    #[test]
    fn every_builtin_template_is_namespaced() {
        for (path, bytes) in BUILTIN_TEMPLATES {
            assert!(path.starts_with("app/") || path.starts_with("entity-server/"), "{path}");
            assert!(!bytes.is_empty(), "{path}");
        }
    }

    #[test]
    fn embedded_loader_resolves_within_namespace() {
        let loader = EmbeddedLoader::new("entity-server");
        assert!(loader.load("src/main/java/package/domain/Entity.java.j2").is_ok());
        assert!(matches!(
            loader.load("src/main/java/package/Application.java.j2"),
            Err(Error::TemplateNotFoundError(_))
        ));
    }

    #[test]
    fn overlay_prefers_local_files() {
        let temp_dir = TempDir::new().unwrap();
        let override_path =
            temp_dir.path().join("entity-server/src/main/java/package/domain/Entity.java.j2");
        fs::create_dir_all(override_path.parent().unwrap()).unwrap();
        fs::write(&override_path, "custom").unwrap();

        let loader = OverlayLoader::new(temp_dir.path(), "entity-server");
        assert_eq!(loader.load("src/main/java/package/domain/Entity.java.j2").unwrap(), b"custom");
        assert!(loader.load("src/test/java/package/domain/EntityTest.java.j2").is_ok());
    }
}
