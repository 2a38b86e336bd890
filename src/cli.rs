use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "league co-play network backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3001)
        #[arg(short, long, default_value_t = 3001)]
        port: u16,
    },
    /// Rebuild every player aggregate from the match corpus
    Rebuild,
    /// Build the co-play graph and write it as JSON
    Graph {
        /// Minimum co-occurrence count an edge needs to survive
        #[arg(long, default_value_t = 2)]
        min_weight: u32,
        /// Drop players left without any co-play edge
        #[arg(long)]
        connected_only: bool,
        /// Output path for the graph document
        #[arg(short, long, default_value = "graph.json")]
        output: String,
    },
}
