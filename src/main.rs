//! `devprep` command-line entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use devprep::cli::Cli;
use devprep::commands::bootstrap;
use devprep::error::{BootstrapError, FATAL_EXIT_CODE};
use devprep::logging::{self, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber(args.verbose, bootstrap::COMMAND);
    let log = Arc::new(Logger::new(bootstrap::COMMAND));

    let handler_log = Arc::clone(&log);
    if let Err(e) = ctrlc::set_handler(move || {
        std::process::exit(bootstrap::interrupted(&*handler_log));
    }) {
        log.warn(&format!("could not install interrupt handler: {e}"));
    }

    match bootstrap::run(&args, &log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = BootstrapError::find(&e).map_or(FATAL_EXIT_CODE, BootstrapError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
