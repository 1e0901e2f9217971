use clap::Parser;
use stratbench::cli::{Cli, init_tracing, run};

fn main() -> std::process::ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("error: {err}");
        return std::process::ExitCode::from(2);
    }
    run(Cli::parse())
}
