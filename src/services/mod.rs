pub mod graphing;
pub mod pipeline;
pub mod server;

pub use graphing::GraphService;
pub use pipeline::{PipelineService, RunSummary, UpsertSummary};
