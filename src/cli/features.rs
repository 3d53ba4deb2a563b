use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::pipeline::{RunOptions, SamplingPipeline};
use crate::source::FsSessionSource;

#[derive(Args, Clone, Debug, Default)]
pub struct FeaturesArgs {
    /// Directory of recorded sessions
    #[arg(long, value_name = "DIR")]
    pub sessions: Option<PathBuf>,

    /// Consider at most this many sessions
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FeatureRow {
    pub index: usize,
    pub tag: String,
    pub class: String,
    pub src: String,
    pub occurrences: u64,
}

pub async fn cmd_features(args: FeaturesArgs, ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let dir = args
        .sessions
        .clone()
        .unwrap_or_else(|| config.source.dir.clone());

    // Every session is considered; no sample-rate draw.
    let options = RunOptions {
        session_sample_rate: 1.0,
        max_sessions: args.limit.unwrap_or(config.sampler.max_sessions),
        ..RunOptions::from_config(config)
    };
    options.validate()?;
    let pipeline = SamplingPipeline::new(Arc::new(FsSessionSource::new(dir.clone())), options);
    let mut rng = StdRng::seed_from_u64(0);
    let build = pipeline
        .build_corpus(&mut rng)
        .await
        .with_context(|| format!("vectorizing sessions from {}", dir.display()))?;

    let occurrences = build.feature_occurrences();
    let rows: Vec<FeatureRow> = build
        .dictionary
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| FeatureRow {
            index,
            tag: entry.key.tag.clone(),
            class: entry.key.class.clone(),
            src: entry.key.src.clone(),
            occurrences: occurrences.get(index).copied().unwrap_or(0),
        })
        .collect();

    if ctx.output().emit(&rows)? {
        return Ok(());
    }

    println!(
        "{} features from {} backdrops ({} sessions)",
        rows.len(),
        build.stats.backdrops,
        build.stats.loaded
    );
    println!("{:>6}  {:>10}  {:<12} {:<24} SRC", "INDEX", "COUNT", "TAG", "CLASS");
    for row in &rows {
        println!(
            "{:>6}  {:>10}  {:<12} {:<24} {}",
            row.index, row.occurrences, row.tag, row.class, row.src
        );
    }
    Ok(())
}
