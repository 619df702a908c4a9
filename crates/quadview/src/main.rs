mod bootstrap;
mod cli;
mod paths;
mod run;
mod state;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Where) => run::print_paths(&cli.run),
        None => run::run(cli.run),
    }
}
