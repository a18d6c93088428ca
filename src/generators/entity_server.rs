//! Server-side files of an entity.
//!
//! The manifests place every artifact of a module entity under
//! `<package>/modules/<module>/` (sources) and `<kind>/<module>/` (changelogs,
//! fake data, simulations). Templates are written against the default package;
//! the substitution rules then move package and import statements to the
//! module package.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::config::{DatabaseType, Dto, SearchEngine, Service};
use crate::constants::{
    CACHE_NEEDLE, LIQUIBASE_CHANGELOG_NEEDLE, LIQUIBASE_CONSTRAINTS_NEEDLE, LIQUIBASE_MASTER_FILE,
    SERVER_MAIN_RES_DIR, SERVER_MAIN_SRC_DIR, SERVER_TEST_SRC_DIR, TEST_DIR,
};
use crate::context::EntityContext;
use crate::error::Result;
use crate::loader::TemplateLoader;
use crate::manifest::{self, FileRule, ManifestGroup, SubstitutionRule, TemplateEntry};
use crate::needle::add_to_file;
use crate::renderer::{Delimiters, TemplateRenderer};

type Rule = FileRule<EntityContext>;
type Entry = TemplateEntry<EntityContext>;

fn liquibase_entity(entity: &EntityContext) -> bool {
    entity.writes_liquibase() && !entity.embedded
}

fn rest_controller(entity: &EntityContext) -> bool {
    !entity.embedded && !entity.skip_rest
}

fn changelog_name(entity: &EntityContext, kind: &str) -> String {
    format!(
        "{}{}_{}_{}",
        entity.module_dir(),
        entity.changelog_date,
        kind,
        entity.entity_class
    )
}

fn fake_data_dir(entity: &EntityContext) -> String {
    format!("config/liquibase/fake-data/{}", entity.module_dir())
}

/// Manifest of the entity server files.
pub fn server_files() -> Vec<ManifestGroup<EntityContext>> {
    vec![
        ManifestGroup::new(
            "dbChangelog",
            vec![
                Rule::new(SERVER_MAIN_RES_DIR).when(liquibase_entity).template(
                    Entry::render("config/liquibase/changelog/added_entity.xml")
                        .rename_to(|e| {
                            format!("config/liquibase/changelog/{}.xml", changelog_name(e, "added_entity"))
                        })
                        .delimiters(Delimiters::SQUARE),
                ),
                Rule::new(SERVER_MAIN_RES_DIR)
                    .when(|e| liquibase_entity(e) && e.has_owned_constraints())
                    .template(
                        Entry::render("config/liquibase/changelog/added_entity_constraints.xml")
                            .rename_to(|e| {
                                format!(
                                    "config/liquibase/changelog/{}.xml",
                                    changelog_name(e, "added_entity_constraints")
                                )
                            })
                            .delimiters(Delimiters::SQUARE),
                    ),
                Rule::new(SERVER_MAIN_RES_DIR)
                    .when(|e| e.app.database_type == DatabaseType::Cassandra && !e.skip_db_changelog)
                    .template(
                        Entry::render("config/cql/changelog/added_entity.cql")
                            .rename_to(|e| format!("config/cql/changelog/{}.cql", changelog_name(e, "added_entity")))
                            .delimiters(Delimiters::SQUARE),
                    ),
                Rule::new(SERVER_MAIN_RES_DIR)
                    .when(|e| e.app.search_engine == SearchEngine::Couchbase && !e.skip_db_changelog)
                    .template(
                        Entry::render("config/couchmove/changelog/entity.fts")
                            .rename_to(|e| {
                                format!(
                                    "config/couchmove/changelog/{}V{}__{}.fts",
                                    e.module_dir(),
                                    e.changelog_date,
                                    e.entity_instance.to_lowercase()
                                )
                            })
                            .delimiters(Delimiters::SQUARE),
                    ),
            ],
        ),
        ManifestGroup::new(
            "fakeData",
            vec![
                Rule::new(SERVER_MAIN_RES_DIR)
                    .when(|e| liquibase_entity(e) && !e.skip_fake_data)
                    .template(
                        Entry::render("config/liquibase/fake-data/table.csv")
                            .rename_to(|e| format!("{}{}.csv", fake_data_dir(e), e.entity_table_name))
                            .delimiters(Delimiters::SQUARE),
                    ),
                Rule::new(SERVER_MAIN_RES_DIR)
                    .when(|e| liquibase_entity(e) && !e.skip_fake_data && e.fields_contain_blob)
                    .template(
                        Entry::copy("config/liquibase/fake-data/blob/hipster.png")
                            .rename_to(|e| format!("{}blob/hipster.png", fake_data_dir(e))),
                    ),
                Rule::new(SERVER_MAIN_RES_DIR)
                    .when(|e| liquibase_entity(e) && !e.skip_fake_data && e.fields_contain_text_blob)
                    .template(
                        Entry::copy("config/liquibase/fake-data/blob/hipster.txt")
                            .rename_to(|e| format!("{}blob/hipster.txt", fake_data_dir(e))),
                    ),
            ],
        ),
        ManifestGroup::new(
            "server",
            vec![
                Rule::new(SERVER_MAIN_SRC_DIR).template(
                    Entry::render("package/domain/Entity.java")
                        .rename_to(|e| format!("{}/domain/{}.java", e.module.module_folder, e.entity_class)),
                ),
                Rule::new(SERVER_MAIN_SRC_DIR).when(rest_controller).template(
                    Entry::render("package/web/rest/EntityResource.java").rename_to(|e| {
                        format!("{}/web/rest/{}Resource.java", e.module.module_folder, e.entity_class)
                    }),
                ),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|e| e.jpa_metamodel_filtering && !e.embedded)
                    .template(Entry::render("package/service/dto/EntityCriteria.java").rename_to(|e| {
                        format!("{}/service/dto/{}Criteria.java", e.module.module_folder, e.entity_class)
                    }))
                    .template(Entry::render("package/service/EntityQueryService.java").rename_to(|e| {
                        format!("{}/service/{}QueryService.java", e.module.module_folder, e.entity_class)
                    })),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|e| e.app.search_engine == SearchEngine::Elasticsearch && !e.embedded)
                    .template(
                        Entry::render("package/repository/search/EntitySearchRepository.java").rename_to(|e| {
                            format!(
                                "{}/repository/search/{}SearchRepository.java",
                                e.module.module_folder, e.entity_class
                            )
                        }),
                    ),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|e| !e.uses_reactive_repository() && !e.embedded)
                    .template(Entry::render("package/repository/EntityRepository.java").rename_to(|e| {
                        format!("{}/repository/{}Repository.java", e.module.module_folder, e.entity_class)
                    })),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|e| e.uses_reactive_repository() && !e.embedded)
                    .template(Entry::render("package/repository/EntityReactiveRepository.java").rename_to(|e| {
                        format!("{}/repository/{}Repository.java", e.module.module_folder, e.entity_class)
                    })),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|e| e.service == Service::ServiceImpl && !e.embedded)
                    .template(Entry::render("package/service/EntityService.java").rename_to(|e| {
                        format!("{}/service/{}Service.java", e.module.module_folder, e.entity_class)
                    }))
                    .template(Entry::render("package/service/impl/EntityServiceImpl.java").rename_to(|e| {
                        format!("{}/service/impl/{}ServiceImpl.java", e.module.module_folder, e.entity_class)
                    })),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|e| e.service == Service::ServiceClass && !e.embedded)
                    .template(Entry::render("package/service/impl/EntityServiceImpl.java").rename_to(|e| {
                        format!("{}/service/{}Service.java", e.module.module_folder, e.entity_class)
                    })),
                Rule::new(SERVER_MAIN_SRC_DIR)
                    .when(|e| e.dto == Dto::Mapstruct)
                    .template(Entry::render("package/service/dto/EntityDTO.java").rename_to(|e| {
                        format!("{}/service/dto/{}DTO.java", e.module.module_folder, e.entity_class)
                    }))
                    .template(Entry::render("package/service/mapper/BaseEntityMapper.java").rename_to(|e| {
                        format!("{}/service/mapper/EntityMapper.java", e.module.module_folder)
                    }))
                    .template(Entry::render("package/service/mapper/EntityMapper.java").rename_to(|e| {
                        format!("{}/service/mapper/{}Mapper.java", e.module.module_folder, e.entity_class)
                    })),
            ],
        ),
        ManifestGroup::new(
            "test",
            vec![
                Rule::new(SERVER_TEST_SRC_DIR).when(rest_controller).template(
                    Entry::render("package/web/rest/EntityResourceIT.java").rename_to(|e| {
                        format!("{}/web/rest/{}ResourceIT.java", e.module.module_folder, e.entity_class)
                    }),
                ),
                Rule::new(SERVER_TEST_SRC_DIR)
                    .when(|e| e.app.search_engine == SearchEngine::Elasticsearch && !e.embedded)
                    .template(
                        Entry::render("package/repository/search/EntitySearchRepositoryMockConfiguration.java")
                            .rename_to(|e| {
                                format!(
                                    "{}/repository/search/{}SearchRepositoryMockConfiguration.java",
                                    e.module.module_folder, e.entity_class
                                )
                            }),
                    ),
                Rule::new(TEST_DIR)
                    .when(|e| e.app.gatling_tests && rest_controller(e))
                    .template(
                        Entry::render("gatling/user-files/simulations/EntityGatlingTest.scala")
                            .rename_to(|e| {
                                format!(
                                    "gatling/user-files/simulations/{}{}GatlingTest.scala",
                                    e.module_dir(),
                                    e.entity_class
                                )
                            })
                            .delimiters(Delimiters::SQUARE),
                    ),
                Rule::new(SERVER_TEST_SRC_DIR).template(
                    Entry::render("package/domain/EntityTest.java")
                        .rename_to(|e| format!("{}/domain/{}Test.java", e.module.module_folder, e.entity_class)),
                ),
                Rule::new(SERVER_TEST_SRC_DIR)
                    .when(|e| e.dto == Dto::Mapstruct)
                    .template(Entry::render("package/service/dto/EntityDTOTest.java").rename_to(|e| {
                        format!("{}/service/dto/{}DTOTest.java", e.module.module_folder, e.entity_class)
                    }))
                    .template(Entry::render("package/service/mapper/EntityMapperTest.java").rename_to(|e| {
                        format!("{}/service/mapper/{}MapperTest.java", e.module.module_folder, e.entity_class)
                    })),
            ],
        ),
    ]
}

/// Module-level configuration classes, written only for module entities.
pub fn custom_server_files() -> Vec<ManifestGroup<EntityContext>> {
    vec![ManifestGroup::new(
        "dbConfiguration",
        vec![Rule::new(SERVER_MAIN_SRC_DIR)
            .when(|e| {
                e.use_module
                    && matches!(
                        e.app.database_type,
                        DatabaseType::Sql | DatabaseType::Mongodb | DatabaseType::Neo4j | DatabaseType::Couchbase
                    )
            })
            .template(Entry::render("package/config/ModuleDatabaseConfiguration.java").rename_to(|e| {
                format!(
                    "{}/config/{}DatabaseConfiguration.java",
                    e.module.module_folder, e.module.capitalized_module_name
                )
            }))],
    )]
}

/// Variables of an enum class template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumContext {
    pub enum_name: String,
    pub enum_values: Vec<String>,
    pub module_package_name: String,
    pub module_folder: String,
}

impl EnumContext {
    /// One context per enum field of the entity.
    pub fn for_entity(entity: &EntityContext) -> Vec<EnumContext> {
        entity
            .fields
            .iter()
            .filter(|field| field.field_is_enum)
            .map(|field| EnumContext {
                enum_name: field.field_type.clone(),
                enum_values: field.enum_values.clone(),
                module_package_name: entity.module.module_package_name.clone(),
                module_folder: entity.module.module_folder.clone(),
            })
            .collect()
    }
}

pub fn enum_files() -> Vec<ManifestGroup<EnumContext>> {
    vec![ManifestGroup::new(
        "enumeration",
        vec![FileRule::new(SERVER_MAIN_SRC_DIR).template(
            TemplateEntry::render("package/domain/enumeration/Enum.java").rename_to(|e: &EnumContext| {
                format!("{}/domain/enumeration/{}.java", e.module_folder, e.enum_name)
            }),
        )],
    )]
}

/// Rewrites applied to the freshly written server files of a module entity.
///
/// Several replacements contain their own pattern, so the rules must run once
/// per written file.
pub fn substitution_rules(entity: &EntityContext) -> Result<Vec<SubstitutionRule>> {
    if !entity.use_module {
        return Ok(Vec::new());
    }
    let package = &entity.app.package_name;
    let module_package = &entity.module.module_package_name;
    let module = &entity.module.lower_case_module_name;

    Ok(vec![
        SubstitutionRule::literal("*.xml", "fake-data", format!("fake-data/{module}"))?,
        SubstitutionRule::literal(
            "*.java",
            "import org.junit.jupiter.api.BeforeEach;",
            format!("import {package}.web.rest.TestUtil;\nimport org.junit.jupiter.api.BeforeEach;"),
        )?,
        SubstitutionRule::literal("*.java", &format!("package {package}"), format!("package {module_package}"))?,
        SubstitutionRule::literal(
            "*.java",
            &format!("import {package}.enumeration"),
            format!("import {module_package}.enumeration"),
        )?,
        SubstitutionRule::literal(
            "*.java",
            &format!("@link {package}.web.rest"),
            format!("@link {module_package}.web.rest"),
        )?,
        SubstitutionRule::literal(
            "*.java",
            &format!("import {package}.domain"),
            format!("import {module_package}.domain"),
        )?,
        SubstitutionRule::literal("*.java", &format!("@link {package}.domain"), format!("@link {module_package}.domain"))?,
        SubstitutionRule::literal(
            "*.java",
            &format!("import {package}.repository"),
            format!("import {module_package}.repository"),
        )?,
        SubstitutionRule::literal(
            "*.java",
            &format!("import {package}.service"),
            format!("import {module_package}.service"),
        )?,
    ])
}

/// Registers the entity in files owned by the application: the liquibase
/// master changelog and the hibernate cache configuration.
pub fn update_needles(entity: &EntityContext, project_dir: &Path) -> Result<()> {
    if liquibase_entity(entity) {
        let master = project_dir.join(SERVER_MAIN_RES_DIR).join(LIQUIBASE_MASTER_FILE);
        if entity.has_owned_constraints() {
            add_to_file(
                &master,
                LIQUIBASE_CONSTRAINTS_NEEDLE,
                &format!(
                    "<include file=\"config/liquibase/changelog/{}.xml\" relativeToChangelogFile=\"false\"/>",
                    changelog_name(entity, "added_entity_constraints")
                ),
            )?;
        }
        add_to_file(
            &master,
            LIQUIBASE_CHANGELOG_NEEDLE,
            &format!(
                "<include file=\"config/liquibase/changelog/{}.xml\" relativeToChangelogFile=\"false\"/>",
                changelog_name(entity, "added_entity")
            ),
        )?;
    }

    if entity.app.uses_hibernate_cache() && !entity.embedded {
        let cache_config = project_dir
            .join(SERVER_MAIN_SRC_DIR)
            .join(&entity.app.package_folder)
            .join("config/CacheConfiguration.java");
        let class = format!("{}.domain.{}", entity.module.module_package_name, entity.entity_class);
        add_to_file(&cache_config, CACHE_NEEDLE, &format!("createCache(cm, {class}.class.getName());"))?;
        for relationship in entity.relationships.iter().filter(|r| r.collection) {
            add_to_file(
                &cache_config,
                CACHE_NEEDLE,
                &format!(
                    "createCache(cm, {class}.class.getName() + \".{}\");",
                    relationship.relationship_name_plural
                ),
            )?;
        }
    }
    Ok(())
}

/// Writes the entity server files, moves them to the module package and
/// registers them with the application files.
pub fn write_server_files(
    entity: &EntityContext,
    loader: &dyn TemplateLoader,
    renderer: &dyn TemplateRenderer,
    project_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let written = manifest::write(&server_files(), entity, loader, renderer, project_dir)?;
    let changed = manifest::apply_substitutions(&written, &substitution_rules(entity)?)?;
    debug!("Moved {} files to module '{}'", changed.len(), entity.module.module_name);
    update_needles(entity, project_dir)?;
    Ok(written)
}

pub fn write_module_config_files(
    entity: &EntityContext,
    loader: &dyn TemplateLoader,
    renderer: &dyn TemplateRenderer,
    project_dir: &Path,
) -> Result<Vec<PathBuf>> {
    manifest::write(&custom_server_files(), entity, loader, renderer, project_dir)
}

/// Writes one enum class per enum field of the entity.
pub fn write_enum_files(
    entity: &EntityContext,
    loader: &dyn TemplateLoader,
    renderer: &dyn TemplateRenderer,
    project_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for context in EnumContext::for_entity(entity) {
        written.extend(manifest::write(&enum_files(), &context, loader, renderer, project_dir)?);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EntityConfig, ProjectConfig};
    use crate::manifest::plan;

    fn invoice(module: Option<&str>) -> EntityContext {
        let project = ProjectConfig::new("store", "com.mycompany.myapp");
        let mut config = EntityConfig::new("Invoice", "20201228174246");
        config.dto = Dto::Mapstruct;
        config.service = Service::ServiceImpl;
        let mut context = EntityContext::new(&project, "Invoice");
        context.apply_entity_config(&config);
        context.set_module(module);
        context
    }

    fn destinations(context: &EntityContext) -> Vec<String> {
        plan(&server_files(), context)
            .unwrap()
            .into_iter()
            .map(|file| file.destination.display().to_string())
            .collect()
    }

    #[test]
    fn module_entity_files_are_module_scoped() {
        let files = destinations(&invoice(Some("billing")));
        assert!(files.contains(&"src/main/java/com/mycompany/myapp/modules/billing/domain/Invoice.java".to_string()));
        assert!(files.contains(
            &"src/main/resources/config/liquibase/changelog/billing/20201228174246_added_entity_Invoice.xml"
                .to_string()
        ));
        assert!(files.contains(&"src/main/resources/config/liquibase/fake-data/billing/invoice.csv".to_string()));
        for file in files.iter().filter(|f| f.ends_with(".java")) {
            assert!(file.contains("/modules/billing/"), "{file} is not in the module");
        }
    }

    #[test]
    fn skip_rest_removes_resource_and_its_test() {
        let with_rest = destinations(&invoice(Some("billing")));
        let mut context = invoice(Some("billing"));
        context.skip_rest = true;
        let without_rest = destinations(&context);

        let removed: Vec<&String> = with_rest.iter().filter(|f| !without_rest.contains(f)).collect();
        assert_eq!(
            removed,
            vec![
                "src/main/java/com/mycompany/myapp/modules/billing/web/rest/InvoiceResource.java",
                "src/test/java/com/mycompany/myapp/modules/billing/web/rest/InvoiceResourceIT.java",
            ]
        );
        assert!(without_rest.iter().all(|f| with_rest.contains(f)));
    }

    #[test]
    fn database_configuration_only_for_module_entities() {
        assert_eq!(plan(&custom_server_files(), &invoice(None)).unwrap().len(), 0);
        let planned = plan(&custom_server_files(), &invoice(Some("Billing"))).unwrap();
        assert_eq!(
            planned[0].destination,
            PathBuf::from("src/main/java/com/mycompany/myapp/modules/billing/config/BillingDatabaseConfiguration.java")
        );
    }

    #[test]
    fn no_substitutions_without_module() {
        assert!(substitution_rules(&invoice(None)).unwrap().is_empty());
    }

    #[test]
    fn package_rules_rewrite_java_sources() {
        let rules = substitution_rules(&invoice(Some("billing"))).unwrap();
        let java = Path::new("InvoiceResource.java");
        let source = "package com.mycompany.myapp.web.rest;\n\nimport com.mycompany.myapp.domain.Invoice;\nimport org.junit.jupiter.api.BeforeEach;\n";
        let result = rules
            .iter()
            .filter(|rule| rule.matches_file(java))
            .fold(source.to_string(), |content, rule| rule.apply(&content));
        assert_eq!(
            result,
            "package com.mycompany.myapp.modules.billing.web.rest;\n\n\
             import com.mycompany.myapp.modules.billing.domain.Invoice;\n\
             import com.mycompany.myapp.web.rest.TestUtil;\n\
             import org.junit.jupiter.api.BeforeEach;\n"
        );
    }
}
