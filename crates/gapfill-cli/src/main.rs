use gapfill_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // File logging first; a read-only state dir must not stop the CLI.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("gapfill error: {:#}", err);
        std::process::exit(1);
    }
}
