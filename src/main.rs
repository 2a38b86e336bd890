use anyhow::Result;

use lol_coplay::cli::Command;
use lol_coplay::{handle_graph, handle_rebuild, handle_serve, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Rebuild => handle_rebuild(),
        Command::Graph {
            min_weight,
            connected_only,
            output,
        } => handle_graph(*min_weight, *connected_only, output),
    }
}
