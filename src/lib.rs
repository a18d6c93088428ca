//! Modulith generates Spring Boot applications organized as a modular monolith.
//! Entities are generated into named modules, each with its own package tree,
//! changelogs and configuration, while sharing one deployable application.

/// Command-line interface module for the modulith application
pub mod cli;

/// Project and entity records stored in the project directory
/// (`.modulith.json` and `.modulith/<Entity>.json`)
pub mod config;

/// Fixed paths, file names and needle markers
pub mod constants;

/// Typed template contexts derived from the records
pub mod context;

/// Error types and handling for the modulith application
pub mod error;

/// Deterministic sample rows for the fake-data changelogs
pub mod fake_data;

/// Application and entity generators
pub mod generators;

/// Ordered phases and named steps the generators run through
pub mod lifecycle;

/// Built-in and local template sources
pub mod loader;

/// Logger initialisation
pub mod logger;

/// Declarative file manifests and post-render substitutions
pub mod manifest;

/// Module naming and cross-module relationship checks
pub mod module;

/// Line insertion at marker comments of generated files
pub mod needle;

/// User input and interaction handling
pub mod prompt;

/// Template rendering functionality
pub mod renderer;
