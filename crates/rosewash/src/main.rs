mod bindings;
mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Preview(args)) => run::preview(&cli.run, args),
        Some(Command::Settings) => run::print_settings(&cli.run),
        None => run::run(cli.run),
    }
}
