//! Command-line interface implementation for modulith.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for modulith.
#[derive(Parser, Debug)]
#[command(author, version, about = "modulith: modular monolith scaffolding for Spring Boot", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Root directory of the generated project
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".", global = true)]
    pub project_dir: PathBuf,

    /// Directory whose templates override the built-in ones
    #[arg(long, value_name = "DIR", global = true)]
    pub templates: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Get answers from stdin (JSON or YAML); missing answers take their defaults
    #[arg(short, long, global = true)]
    pub stdin: bool,

    /// Get answers from a JSON or YAML file; missing answers are asked
    #[arg(long, value_name = "FILE", global = true, conflicts_with = "stdin")]
    pub answers: Option<PathBuf>,

    /// Do not compile the project after generation
    #[arg(long, global = true)]
    pub skip_install: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate the application skeleton
    App,
    /// Create, update or regenerate an entity
    Entity {
        /// Name of the entity
        #[arg(value_name = "NAME")]
        name: String,

        /// Regenerate from the stored record without asking anything
        #[arg(long)]
        regenerate: bool,

        /// Only update the entity record, without writing server files
        #[arg(long)]
        skip_server: bool,
    },
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::MissingSubcommand
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entity_subcommand() {
        let args = Args::try_parse_from([
            "modulith",
            "entity",
            "Invoice",
            "--regenerate",
            "-d",
            "/tmp/shop",
            "--skip-install",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Entity { name: "Invoice".to_string(), regenerate: true, skip_server: false }
        );
        assert_eq!(args.project_dir, PathBuf::from("/tmp/shop"));
        assert!(args.skip_install);
        assert!(!args.stdin);
    }

    #[test]
    fn defaults_to_current_directory() {
        let args = Args::try_parse_from(["modulith", "app"]).unwrap();
        assert_eq!(args.command, Command::App);
        assert_eq!(args.project_dir, PathBuf::from("."));
        assert!(args.templates.is_none());
    }

    #[test]
    fn stdin_and_answers_file_conflict() {
        let result = Args::try_parse_from(["modulith", "app", "--stdin", "--answers", "a.yml"]);
        assert!(result.is_err());
    }

    #[test]
    fn entity_requires_a_name() {
        let err = Args::try_parse_from(["modulith", "entity"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
