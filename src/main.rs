//! modulith's main application entry point.
//! Parses the command line and hands over to the requested generator.

use modulith::{
    cli::{get_args, Args, Command},
    error::{default_error_handler, Result},
    generators::{
        app::AppGenerator,
        entity::{EntityGenerator, EntityOptions},
        GeneratorOptions,
    },
    loader::TemplateSource,
    logger::init_logger,
    prompt::get_prompter,
    renderer::MiniJinjaRenderer,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let renderer = MiniJinjaRenderer::new();
    let prompter = get_prompter(args.stdin, args.answers.as_deref())?;

    let options = GeneratorOptions {
        project_dir: args.project_dir,
        templates: match args.templates {
            Some(dir) => TemplateSource::FileSystem(dir),
            None => TemplateSource::Builtin,
        },
        skip_install: args.skip_install,
    };
    log::debug!("Generating into {}", options.project_dir.display());

    match args.command {
        Command::App => AppGenerator::new(options, prompter.as_ref(), &renderer).run(),
        Command::Entity { name, regenerate, skip_server } => {
            let entity_options = EntityOptions { name, regenerate, skip_server };
            EntityGenerator::new(options, entity_options, prompter.as_ref(), &renderer).run()
        }
    }
}
