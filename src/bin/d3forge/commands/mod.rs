mod energy;
mod functionals;

use energy::run_energy;
use functionals::run_functionals;

use anyhow::Result;

use crate::cli::Command;

pub fn dispatch(command: Command, interactive: bool) -> Result<()> {
    match command {
        Command::Energy(args) => run_energy(args, interactive),
        Command::Functionals(args) => run_functionals(args),
    }
}
