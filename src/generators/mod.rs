//! Generators driven through the lifecycle.
//!
//! Each generator is a state struct plus a [`Lifecycle`](crate::lifecycle::Lifecycle)
//! of steps over that state. The base steps come first; the module-related
//! steps are spliced into them at declared positions.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::config::BuildTool;
use crate::error::{Error, Result};
use crate::loader::TemplateSource;

pub mod app;
pub mod entity;
pub mod entity_server;

/// Options shared by all generators.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Root of the generated project.
    pub project_dir: PathBuf,
    pub templates: TemplateSource,
    pub skip_install: bool,
}

impl GeneratorOptions {
    pub fn new<P: AsRef<Path>>(project_dir: P) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            templates: TemplateSource::Builtin,
            skip_install: true,
        }
    }
}

/// Compiles the project with the build tool wrapper, when the project has one.
///
/// # Errors
/// * `Error::InstallError` if the wrapper exits with a failure
pub fn run_install(project_dir: &Path, build_tool: BuildTool) -> Result<()> {
    let (wrapper, task) = match build_tool {
        BuildTool::Maven => ("mvnw", "compile"),
        BuildTool::Gradle => ("gradlew", "compileJava"),
    };
    let wrapper_path = project_dir.join(wrapper);
    if !wrapper_path.is_file() {
        debug!("No {} in {}, skipping install", wrapper, project_dir.display());
        return Ok(());
    }

    println!("Running ./{wrapper} {task}");
    let status = Command::new(&wrapper_path)
        .arg(task)
        .current_dir(project_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        return Err(Error::InstallError(format!("./{wrapper} {task} failed with status: {status}")));
    }
    Ok(())
}

/// Prints the files written during a run, relative to the project root.
pub fn report_written(project_dir: &Path, written: &[PathBuf]) {
    for path in written {
        let shown = path.strip_prefix(project_dir).unwrap_or(path);
        println!("create: '{}'", shown.display());
    }
}
