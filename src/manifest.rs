//! Manifest-driven file writer.
//!
//! A manifest is a declarative list of groups of conditional file rules. Each
//! rule names a base output directory and the templates to render (or copy)
//! into it when its predicate holds for the generation context. Once the
//! manifest is written, an ordered list of text substitutions can be applied to
//! the produced files.
//!
//! Predicates and rename functions are plain functions over a typed context,
//! so which files a context selects can be checked with [`plan`] without
//! touching the file system.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use log::debug;
use regex::{NoExpand, Regex};
use serde::Serialize;

use crate::constants::TEMPLATE_SUFFIX;
use crate::error::{Error, Result};
use crate::loader::TemplateLoader;
use crate::renderer::{Delimiters, TemplateRenderer};

/// How a template entry reaches the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Interpolate the template with the context.
    Render,
    /// Copy the bytes verbatim.
    Copy,
}

/// A single template of a [`FileRule`].
pub struct TemplateEntry<C> {
    pub file: &'static str,
    pub method: Method,
    pub rename_to: Option<fn(&C) -> String>,
    pub delimiters: Option<Delimiters>,
}

impl<C> TemplateEntry<C> {
    /// An entry rendered with the default delimiters and kept at its own path.
    pub fn render(file: &'static str) -> Self {
        Self { file, method: Method::Render, rename_to: None, delimiters: None }
    }

    /// An entry copied without interpolation.
    pub fn copy(file: &'static str) -> Self {
        Self { file, method: Method::Copy, rename_to: None, delimiters: None }
    }

    pub fn rename_to(mut self, rename: fn(&C) -> String) -> Self {
        self.rename_to = Some(rename);
        self
    }

    pub fn delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = Some(delimiters);
        self
    }

    /// Identifier of the template in the loader.
    pub fn source_id(&self, base: &str) -> String {
        match self.method {
            Method::Render => format!("{}{}{}", base, self.file, TEMPLATE_SUFFIX),
            Method::Copy => format!("{}{}", base, self.file),
        }
    }
}

/// Conditional set of templates sharing a base output directory.
pub struct FileRule<C> {
    /// Absent means the rule always applies.
    pub condition: Option<fn(&C) -> bool>,
    pub path: &'static str,
    pub templates: Vec<TemplateEntry<C>>,
}

impl<C> FileRule<C> {
    pub fn new(path: &'static str) -> Self {
        Self { condition: None, path, templates: Vec::new() }
    }

    pub fn when(mut self, condition: fn(&C) -> bool) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn template(mut self, entry: TemplateEntry<C>) -> Self {
        self.templates.push(entry);
        self
    }

    /// Evaluates the rule predicate against the context.
    pub fn applies(&self, context: &C) -> bool {
        self.condition.map_or(true, |condition| condition(context))
    }
}

/// Named, ordered sequence of rules.
pub struct ManifestGroup<C> {
    pub name: &'static str,
    pub rules: Vec<FileRule<C>>,
}

impl<C> ManifestGroup<C> {
    pub fn new(name: &'static str, rules: Vec<FileRule<C>>) -> Self {
        Self { name, rules }
    }
}

/// A file the manifest will produce for a given context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub group: &'static str,
    /// Index of the rule inside its group.
    pub rule: usize,
    pub source: String,
    /// Destination relative to the output root.
    pub destination: PathBuf,
    pub method: Method,
    pub delimiters: Option<Delimiters>,
}

/// Computes the files a manifest produces for a context.
///
/// Every predicate is evaluated exactly once. Entries of a rule whose
/// predicate is false produce nothing.
///
/// # Errors
/// * `Error::DuplicateOutputError` if two entries resolve to the same destination
pub fn plan<C>(manifest: &[ManifestGroup<C>], context: &C) -> Result<Vec<PlannedFile>> {
    let mut planned = Vec::new();
    let mut seen = HashSet::new();

    for group in manifest {
        for (index, rule) in group.rules.iter().enumerate() {
            if !rule.applies(context) {
                debug!("Skipping rule {} of '{}': condition is false", index, group.name);
                continue;
            }
            for entry in &rule.templates {
                let relative = match entry.rename_to {
                    Some(rename) => rename(context),
                    None => entry.file.to_string(),
                };
                let destination = PathBuf::from(format!("{}{}", rule.path, relative));
                if !seen.insert(destination.clone()) {
                    return Err(Error::DuplicateOutputError(destination.display().to_string()));
                }
                planned.push(PlannedFile {
                    group: group.name,
                    rule: index,
                    source: entry.source_id(rule.path),
                    destination,
                    method: entry.method,
                    delimiters: entry.delimiters,
                });
            }
        }
    }

    Ok(planned)
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(Error::IoError)
}

/// Writes every file a manifest selects for the context.
///
/// All entries of a rule are produced in memory before any of them is written,
/// so a failing template never leaves a rule half-written. Existing files are
/// overwritten.
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - Written paths (joined with `output_root`), in manifest order
///
/// # Errors
/// * `Error::RenderError` if a template fails to render
/// * `Error::TemplateNotFoundError` if the loader has no such template
/// * `Error::IoError` if a destination cannot be written
pub fn write<C: Serialize>(
    manifest: &[ManifestGroup<C>],
    context: &C,
    loader: &dyn TemplateLoader,
    renderer: &dyn TemplateRenderer,
    output_root: &Path,
) -> Result<Vec<PathBuf>> {
    let planned = plan(manifest, context)?;
    let variables = serde_json::to_value(context)?;

    let mut written = Vec::with_capacity(planned.len());
    let mut pending: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    let mut current_rule = None;

    for file in planned {
        let rule_key = (file.group, file.rule);
        if current_rule != Some(rule_key) {
            flush(&mut pending, &mut written)?;
            current_rule = Some(rule_key);
        }

        let template = loader.load(&file.source)?;
        let content = match file.method {
            Method::Copy => template,
            Method::Render => {
                let source = String::from_utf8(template).map_err(|e| {
                    Error::ConfigError(format!("template '{}' is not UTF-8: {}", file.source, e))
                })?;
                renderer
                    .render(&file.source, &source, &variables, file.delimiters.as_ref())?
                    .into_bytes()
            }
        };
        pending.push((output_root.join(&file.destination), content));
    }
    flush(&mut pending, &mut written)?;

    Ok(written)
}

fn flush(pending: &mut Vec<(PathBuf, Vec<u8>)>, written: &mut Vec<PathBuf>) -> Result<()> {
    for (path, content) in pending.drain(..) {
        debug!("Writing file: {}", path.display());
        write_file(&path, &content)?;
        written.push(path);
    }
    Ok(())
}

/// Text replacement applied to written files whose name matches a glob.
#[derive(Debug, Clone)]
pub struct SubstitutionRule {
    files: GlobMatcher,
    pattern: Regex,
    replacement: String,
}

impl SubstitutionRule {
    /// A rule whose pattern is a regular expression. The replacement is literal.
    pub fn regex(files: &str, pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        Ok(Self {
            files: Glob::new(files)?.compile_matcher(),
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// A rule matching `pattern` literally.
    pub fn literal(files: &str, pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        Self::regex(files, &regex::escape(pattern), replacement)
    }

    pub fn matches_file(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.files.is_match(name))
    }

    /// Replaces every match of the pattern in `content`.
    pub fn apply(&self, content: &str) -> String {
        self.pattern.replace_all(content, NoExpand(&self.replacement)).into_owned()
    }
}

/// Applies substitution rules, in declaration order, to every matching file.
///
/// Each rule sees the output of the previous ones. A file is rewritten only
/// when its content changed. Nothing is rolled back if a write fails midway.
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - Files whose content changed
pub fn apply_substitutions(paths: &[PathBuf], rules: &[SubstitutionRule]) -> Result<Vec<PathBuf>> {
    let mut changed = Vec::new();

    for path in paths {
        let matching: Vec<&SubstitutionRule> =
            rules.iter().filter(|rule| rule.matches_file(path)).collect();
        if matching.is_empty() {
            continue;
        }

        let original = fs::read_to_string(path)?;
        let updated = matching.iter().fold(original.clone(), |content, rule| rule.apply(&content));
        if updated != original {
            debug!("Applying substitutions to {}", path.display());
            fs::write(path, updated)?;
            changed.push(path.clone());
        }
    }

    Ok(changed)
}
