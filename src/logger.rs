/// Initializes the global logger.
///
/// Verbose runs log everything down to `Debug`; otherwise only warnings and
/// errors are shown, since progress is reported on stdout.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_target(false)
        .init();
}
