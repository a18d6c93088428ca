//! Typed generation contexts.
//!
//! Manifest predicates and rename functions read these records directly; the
//! renderer receives their JSON form (camelCase keys) as the template
//! namespace.

use crate::config::{
    CacheProvider, DatabaseType, Dto, EntityConfig, Field, Pagination, ProjectConfig, Relationship,
    RelationshipType, SearchEngine, Service,
};
use crate::constants::USER_ENTITY;
use crate::module::ModuleInfo;
use cruet::Inflector;
use serde::Serialize;

/// Field types with dedicated handling; any other type must be an enum.
pub const FIELD_TYPES: [&str; 13] = [
    "String",
    "Integer",
    "Long",
    "Float",
    "Double",
    "BigDecimal",
    "LocalDate",
    "Instant",
    "Boolean",
    "UUID",
    "Blob",
    "ImageBlob",
    "TextBlob",
];

/// Application settings shared by the app and entity contexts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppContext {
    pub base_name: String,
    pub main_class: String,
    pub package_name: String,
    pub package_folder: String,
    pub database_type: DatabaseType,
    pub search_engine: SearchEngine,
    pub reactive: bool,
    pub cache_provider: CacheProvider,
    pub enable_hibernate_cache: bool,
    pub gatling_tests: bool,
    /// Module of the user classes; empty when they stay in the default package.
    pub user_module_name: String,
    pub user_package_name: String,
    pub user_folder: String,
}

impl AppContext {
    pub fn new(config: &ProjectConfig) -> Self {
        let user_module = match config.user_module() {
            Some(name) => ModuleInfo::new(name, &config.package_name),
            None => ModuleInfo::none(&config.package_name),
        };
        Self {
            base_name: config.base_name.clone(),
            main_class: format!("{}App", config.base_name.to_pascal_case()),
            package_name: config.package_name.clone(),
            package_folder: config.package_folder(),
            database_type: config.database_type,
            search_engine: config.search_engine,
            reactive: config.reactive,
            cache_provider: config.cache_provider,
            enable_hibernate_cache: config.enable_hibernate_cache,
            gatling_tests: config.gatling_tests,
            user_module_name: user_module.lower_case_module_name,
            user_package_name: user_module.module_package_name,
            user_folder: user_module.module_folder,
        }
    }

    /// Whether the cache configuration registers hibernate caches.
    pub fn uses_hibernate_cache(&self) -> bool {
        self.database_type == DatabaseType::Sql
            && self.cache_provider.has_entity_caches()
            && self.enable_hibernate_cache
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContext {
    pub field_name: String,
    pub field_name_capitalized: String,
    pub field_name_underscored: String,
    pub field_type: String,
    pub java_type: String,
    pub field_is_enum: bool,
    pub enum_values: Vec<String>,
    pub blob_content: Option<String>,
}

impl FieldContext {
    pub fn new(field: &Field) -> Self {
        let enum_values: Vec<String> = field
            .field_values
            .as_deref()
            .map(|values| {
                values
                    .split(',')
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let field_is_enum = !enum_values.is_empty();
        let (java_type, blob_content) = match field.field_type.as_str() {
            "Blob" => ("byte[]".to_string(), Some("any".to_string())),
            "ImageBlob" => ("byte[]".to_string(), Some("image".to_string())),
            "TextBlob" => ("String".to_string(), Some("text".to_string())),
            other => (other.to_string(), None),
        };
        Self {
            field_name: field.field_name.to_camel_case(),
            field_name_capitalized: field.field_name.to_pascal_case(),
            field_name_underscored: field.field_name.to_snake_case(),
            field_type: field.field_type.clone(),
            java_type,
            field_is_enum,
            enum_values,
            blob_content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipContext {
    pub relationship_name: String,
    pub relationship_name_capitalized: String,
    pub relationship_name_plural: String,
    pub relationship_name_underscored: String,
    pub relationship_type: RelationshipType,
    pub owner_side: bool,
    pub other_entity_name: String,
    pub other_entity_name_capitalized: String,
    /// Java type of the related entity. The user class is fully qualified.
    pub other_entity_type: String,
    pub other_entity_table_name: String,
    pub collection: bool,
}

impl RelationshipContext {
    pub fn new(relationship: &Relationship, user_package_name: &str) -> Self {
        let other = relationship.other_entity_name.to_pascal_case();
        let other_entity_type = if other == USER_ENTITY {
            format!("{user_package_name}.domain.{other}")
        } else {
            other.clone()
        };
        let owner_side = match relationship.relationship_type {
            RelationshipType::ManyToOne => true,
            RelationshipType::OneToMany => false,
            _ => relationship.owner_side.unwrap_or(false),
        };
        Self {
            relationship_name: relationship.relationship_name.to_camel_case(),
            relationship_name_capitalized: relationship.relationship_name.to_pascal_case(),
            relationship_name_plural: relationship.relationship_name.to_camel_case().to_plural(),
            relationship_name_underscored: relationship.relationship_name.to_snake_case(),
            relationship_type: relationship.relationship_type,
            owner_side,
            other_entity_table_name: other.to_snake_case(),
            other_entity_name: other.to_camel_case(),
            other_entity_name_capitalized: other,
            other_entity_type,
            collection: matches!(
                relationship.relationship_type,
                RelationshipType::OneToMany | RelationshipType::ManyToMany
            ),
        }
    }
}

/// Everything templates and manifest predicates know about an entity.
///
/// Populated in stages: project fields and naming during initializing,
/// answers during prompting, derived flags and module fields during
/// configuring, the fake data during the default phase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityContext {
    #[serde(flatten)]
    pub app: AppContext,

    pub name: String,
    pub entity_class: String,
    pub entity_instance: String,
    pub entity_instance_plural: String,
    pub entity_table_name: String,
    pub entity_api_url: String,

    pub fields: Vec<FieldContext>,
    pub relationships: Vec<RelationshipContext>,
    pub changelog_date: String,
    pub dto: Dto,
    pub service: Service,
    pub pagination: Pagination,
    pub jpa_metamodel_filtering: bool,
    pub embedded: bool,
    pub skip_rest: bool,
    pub skip_db_changelog: bool,
    pub skip_fake_data: bool,

    pub fields_contain_owner_many_to_many: bool,
    pub fields_contain_owner_one_to_one: bool,
    pub fields_contain_many_to_one: bool,
    pub fields_contain_one_to_many: bool,
    pub fields_contain_blob: bool,
    pub fields_contain_image_blob: bool,
    pub fields_contain_text_blob: bool,
    pub fields_contain_big_decimal: bool,
    pub fields_contain_instant: bool,
    pub fields_contain_local_date: bool,
    pub fields_contain_uuid: bool,

    pub use_module: bool,
    #[serde(flatten)]
    pub module: ModuleInfo,

    pub fake_data_header: Vec<String>,
    pub fake_data_rows: Vec<Vec<String>>,
}

impl EntityContext {
    /// Creates the context of a named entity before any answer is known.
    pub fn new(project: &ProjectConfig, name: &str) -> Self {
        let entity_class = name.to_pascal_case();
        let entity_instance = entity_class.to_camel_case();
        Self {
            app: AppContext::new(project),
            name: name.to_string(),
            entity_instance_plural: entity_instance.to_plural(),
            entity_table_name: entity_class.to_snake_case(),
            entity_api_url: entity_class.to_kebab_case().to_plural(),
            entity_instance,
            entity_class,
            fields: Vec::new(),
            relationships: Vec::new(),
            changelog_date: String::new(),
            dto: Dto::default(),
            service: Service::default(),
            pagination: Pagination::default(),
            jpa_metamodel_filtering: false,
            embedded: false,
            skip_rest: false,
            skip_db_changelog: false,
            skip_fake_data: false,
            fields_contain_owner_many_to_many: false,
            fields_contain_owner_one_to_one: false,
            fields_contain_many_to_one: false,
            fields_contain_one_to_many: false,
            fields_contain_blob: false,
            fields_contain_image_blob: false,
            fields_contain_text_blob: false,
            fields_contain_big_decimal: false,
            fields_contain_instant: false,
            fields_contain_local_date: false,
            fields_contain_uuid: false,
            use_module: false,
            module: ModuleInfo::none(&project.package_name),
            fake_data_header: Vec::new(),
            fake_data_rows: Vec::new(),
        }
    }

    /// Copies the entity record into the context and derives the content flags.
    pub fn apply_entity_config(&mut self, config: &EntityConfig) {
        self.fields = config.fields.iter().map(FieldContext::new).collect();
        self.relationships = config
            .relationships
            .iter()
            .map(|relationship| RelationshipContext::new(relationship, &self.app.user_package_name))
            .collect();
        self.changelog_date = config.changelog_date.clone();
        self.dto = config.dto;
        self.service = config.service;
        self.pagination = config.pagination;
        self.jpa_metamodel_filtering = config.jpa_metamodel_filtering;
        self.embedded = config.embedded;
        self.skip_db_changelog = config.skip_db_changelog;
        self.skip_fake_data = config.skip_fake_data;

        let has_field = |fields: &[FieldContext], field_type: &str| {
            fields.iter().any(|f| f.field_type == field_type)
        };
        self.fields_contain_blob = has_field(&self.fields, "Blob") || has_field(&self.fields, "ImageBlob");
        self.fields_contain_image_blob = has_field(&self.fields, "ImageBlob");
        self.fields_contain_text_blob = has_field(&self.fields, "TextBlob");
        self.fields_contain_big_decimal = has_field(&self.fields, "BigDecimal");
        self.fields_contain_instant = has_field(&self.fields, "Instant");
        self.fields_contain_local_date = has_field(&self.fields, "LocalDate");
        self.fields_contain_uuid = has_field(&self.fields, "UUID");

        let has_relationship = |relationships: &[RelationshipContext], kind: RelationshipType, owner: bool| {
            relationships.iter().any(|r| r.relationship_type == kind && (!owner || r.owner_side))
        };
        self.fields_contain_owner_many_to_many =
            has_relationship(&self.relationships, RelationshipType::ManyToMany, true);
        self.fields_contain_owner_one_to_one =
            has_relationship(&self.relationships, RelationshipType::OneToOne, true);
        self.fields_contain_many_to_one =
            has_relationship(&self.relationships, RelationshipType::ManyToOne, false);
        self.fields_contain_one_to_many =
            has_relationship(&self.relationships, RelationshipType::OneToMany, false);
    }

    /// Places the entity in a module, or in the default package with `None`.
    pub fn set_module(&mut self, module: Option<&str>) {
        match module {
            Some(name) => {
                self.use_module = true;
                self.module = ModuleInfo::new(name, &self.app.package_name);
            }
            None => {
                self.use_module = false;
                self.module = ModuleInfo::none(&self.app.package_name);
            }
        }
    }

    /// Directory segment for changelogs and fake data: `<module>/`, or empty.
    pub fn module_dir(&self) -> String {
        if self.use_module {
            format!("{}/", self.module.lower_case_module_name)
        } else {
            String::new()
        }
    }

    /// Whether the entity needs the liquibase changelog files.
    pub fn writes_liquibase(&self) -> bool {
        self.app.database_type == DatabaseType::Sql && !self.skip_db_changelog
    }

    pub fn has_owned_constraints(&self) -> bool {
        self.fields_contain_owner_many_to_many
            || self.fields_contain_owner_one_to_one
            || self.fields_contain_many_to_one
    }

    pub fn uses_reactive_repository(&self) -> bool {
        self.app.reactive && self.app.database_type.has_reactive_repository()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectConfig {
        ProjectConfig::new("sampleMysql", "com.mycompany.myapp")
    }

    #[test]
    fn naming_is_derived_from_the_entity_name() {
        let context = EntityContext::new(&project(), "invoice_line");
        assert_eq!(context.entity_class, "InvoiceLine");
        assert_eq!(context.entity_instance, "invoiceLine");
        assert_eq!(context.entity_table_name, "invoice_line");
        assert_eq!(context.entity_api_url, "invoice-lines");
        assert_eq!(context.app.main_class, "SampleMysqlApp");
    }

    #[test]
    fn content_flags_follow_fields_and_relationships() {
        let mut config = EntityConfig::new("Invoice", "20201228174246");
        config.fields.push(Field {
            field_name: "scan".to_string(),
            field_type: "ImageBlob".to_string(),
            field_values: None,
        });
        config.relationships.push(Relationship {
            relationship_name: "customer".to_string(),
            other_entity_name: "customer".to_string(),
            relationship_type: RelationshipType::ManyToOne,
            owner_side: None,
        });
        config.relationships.push(Relationship {
            relationship_name: "tag".to_string(),
            other_entity_name: "tag".to_string(),
            relationship_type: RelationshipType::ManyToMany,
            owner_side: Some(false),
        });

        let mut context = EntityContext::new(&project(), "Invoice");
        context.apply_entity_config(&config);

        assert!(context.fields_contain_blob);
        assert!(context.fields_contain_image_blob);
        assert!(!context.fields_contain_text_blob);
        assert!(context.fields_contain_many_to_one);
        assert!(!context.fields_contain_owner_many_to_many);
        assert!(context.has_owned_constraints());
        assert_eq!(context.fields[0].java_type, "byte[]");
    }

    #[test]
    fn user_relationship_uses_qualified_type() {
        let relationship = Relationship {
            relationship_name: "owner".to_string(),
            other_entity_name: "user".to_string(),
            relationship_type: RelationshipType::ManyToOne,
            owner_side: None,
        };
        let context = RelationshipContext::new(&relationship, "com.mycompany.myapp.modules.account");
        assert_eq!(context.other_entity_type, "com.mycompany.myapp.modules.account.domain.User");
    }

    #[test]
    fn enum_values_are_split_and_trimmed() {
        let field = FieldContext::new(&Field {
            field_name: "status".to_string(),
            field_type: "InvoiceStatus".to_string(),
            field_values: Some("DRAFT, SENT,PAID".to_string()),
        });
        assert!(field.field_is_enum);
        assert_eq!(field.enum_values, vec!["DRAFT", "SENT", "PAID"]);
    }
}
