//! Modules group the generated code of entities under
//! `<package>/modules/<module>/` instead of the default package layout.

use crate::config::{ConfigStore, Relationship};
use crate::constants::USER_ENTITY;
use crate::error::{Error, Result};
use cruet::Inflector;
use log::warn;
use serde::Serialize;

/// Validates a module name: non-empty, ASCII letters, digits and `_` only.
pub fn validate_module_name(input: &str) -> std::result::Result<(), String> {
    if !input.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Your module name cannot contain special characters".to_string());
    }
    if input.is_empty() {
        return Err("Please provide a module name".to_string());
    }
    Ok(())
}

/// First character upper case, the rest lower case.
pub fn capitalize(input: &str) -> String {
    let lower = input.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Names and locations derived from a module name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub module_name: String,
    pub lower_case_module_name: String,
    pub capitalized_module_name: String,
    pub module_package_name: String,
    pub module_folder: String,
}

impl ModuleInfo {
    /// Derives module locations from the application package.
    pub fn new(module_name: &str, package_name: &str) -> Self {
        let lower = module_name.to_lowercase();
        Self {
            module_name: module_name.to_string(),
            capitalized_module_name: capitalize(module_name),
            module_package_name: format!("{package_name}.modules.{lower}"),
            module_folder: format!("{}/modules/{}", package_name.replace('.', "/"), lower),
            lower_case_module_name: lower,
        }
    }

    /// Locations used when the entity has no module: the default package.
    pub fn none(package_name: &str) -> Self {
        Self {
            module_name: String::new(),
            lower_case_module_name: String::new(),
            capitalized_module_name: String::new(),
            module_package_name: package_name.to_string(),
            module_folder: package_name.replace('.', "/"),
        }
    }
}

/// Checks that every related entity (other than the user entity) belongs to
/// `module`.
///
/// A relationship from an entity to itself always passes. A related entity without a stored record has not been generated yet and is
/// skipped with a warning.
///
/// # Errors
/// * `Error::ModuleConflictError` naming both entities and both modules
pub fn check_relationship_modules(
    store: &ConfigStore,
    entity: &str,
    module: &str,
    relationships: &[Relationship],
) -> Result<()> {
    for relationship in relationships {
        let other = relationship.other_entity_name.to_pascal_case();
        if other == USER_ENTITY || other == entity {
            continue;
        }
        let Some(other_config) = store.load_entity(&other)? else {
            warn!(
                "Entity {} related from {} has no stored configuration, skipping module check",
                other, entity
            );
            continue;
        };
        let other_module = other_config.module.unwrap_or_default();
        if other_module != module {
            return Err(Error::ModuleConflictError {
                entity: entity.to_string(),
                other_entity: other,
                module: module.to_string(),
                other_module,
            });
        }
    }
    Ok(())
}
