//! Error handling for modulith.
//! Defines the error taxonomy and the result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// Errors that can occur while generating an application or an entity.
///
/// None of them are retried: every error aborts the current generation run and
/// leaves whatever was already written on disk in place.
#[derive(Error, Debug)]
pub enum Error {
    /// A file system operation failed (reading templates, writing output).
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// A template failed to compile or referenced data missing from the context.
    #[error("Template rendering error: {0}.")]
    RenderError(#[from] minijinja::Error),

    /// The template loader has no template under the requested identifier.
    #[error("Template '{0}' does not exist.")]
    TemplateNotFoundError(String),

    /// A user answer was rejected by its validator.
    #[error("Validation error: {0}.")]
    ValidationError(String),

    /// An entity relates to an entity assigned to another module.
    #[error(
        "Cannot relate entity {entity} to entity {other_entity}. they belong to different modules ('{module}' and '{other_module}')."
    )]
    ModuleConflictError {
        entity: String,
        other_entity: String,
        module: String,
        other_module: String,
    },

    /// Missing or inconsistent project/entity configuration.
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Failed to parse JSON: {0}.")]
    JSONParseError(#[from] serde_json::Error),

    #[error("Failed to parse YAML: {0}.")]
    YAMLParseError(#[from] serde_yaml::Error),

    /// A substitution rule has an invalid pattern.
    #[error("Invalid substitution pattern: {0}.")]
    PatternError(#[from] regex::Error),

    /// A substitution rule has an invalid file glob.
    #[error("Invalid file glob: {0}.")]
    GlobError(#[from] globset::Error),

    /// The terminal interaction itself failed (closed stdin, no tty).
    #[error("Prompt error: {0}.")]
    PromptError(String),

    /// Two manifest entries resolved to the same destination.
    #[error("Duplicate output path '{0}'.")]
    DuplicateOutputError(String),

    /// The build tool wrapper exited with a failure.
    #[error("Install error: {0}.")]
    InstallError(String),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
