use std::io::{self, IsTerminal};
use std::process::ExitCode;

mod cli;
mod commands;
mod display;
mod util;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = cli::parse();
    // Tables and spinners go to stderr; only the energy command reports stages.
    let interactive = io::stderr().is_terminal()
        && match &cli.command {
            cli::Command::Energy(args) => !args.io.quiet,
            cli::Command::Functionals(_) => false,
        };

    if interactive {
        display::print_banner();
    }

    match commands::dispatch(cli.command, interactive) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
