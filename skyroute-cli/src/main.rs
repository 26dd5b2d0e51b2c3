//! Entry point for the `skyroute` command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use skyroute_cli::CliError;

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on stderr"
)]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match skyroute_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("skyroute: {err}");
            ExitCode::FAILURE
        }
    }
}
