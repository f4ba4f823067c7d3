use postmirror_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Log file when possible, stderr otherwise; never abort over logging.
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }

    match CliCommand::run_from_args() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("postmirror error: {:#}", err);
            std::process::exit(1);
        }
    }
}
