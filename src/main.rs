use clap::Parser;
use profit_analyzer::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
