pub mod aggregate;
pub mod api;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod database;
pub mod domain;
pub mod graph;
pub mod scoring;
pub mod services;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::graph::GraphFilter;
use crate::services::graphing::GraphService;
use crate::services::pipeline::PipelineService;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_rebuild() -> Result<()> {
    let config = AppConfig::new();
    let service = PipelineService::new(config)?;
    let summary = service.run_full_rebuild()?;
    log::info!(
        "Rebuild summary: {} matches, {} players, {} documents skipped, {} participants skipped",
        summary.matches_processed,
        summary.unique_players,
        summary.documents_skipped,
        summary.participants_skipped
    );
    Ok(())
}

pub fn handle_graph(min_weight: u32, connected_only: bool, output: &str) -> Result<()> {
    let config = AppConfig::new();
    let service = GraphService::new(config)?;
    let document = service.build(GraphFilter {
        min_weight,
        connected_only,
    })?;

    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(output, json).with_context(|| format!("Failed to write {output}"))?;
    log::info!(
        "Wrote {} nodes, {} edges, {} clusters to {output}",
        document.stats.total_nodes,
        document.stats.total_edges,
        document.stats.num_clusters
    );
    Ok(())
}
