//! replayscope library
//!
//! Exposes the sampling pipeline and CLI for integration testing

pub mod cli;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod stack;

pub use config::Config;
pub use errors::{PipelineError, PipelineResult};
pub use metrics::RunStats;
pub use pipeline::{CorpusBuild, RunOptions, RunOutcome, SamplingPipeline};
pub use source::{load_all, FsSessionSource};
