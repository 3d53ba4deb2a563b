use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::cli::context::CliContext;
use crate::config::Config;
use crate::output::{manifest, write_outputs, RunManifest};
use crate::pipeline::{RunOptions, SamplingPipeline};
use crate::source::FsSessionSource;

#[derive(Args, Clone, Debug, Default)]
pub struct SampleArgs {
    /// Directory of recorded sessions (`<id>.json` / `<id>.json.zst`)
    #[arg(long, value_name = "DIR")]
    pub sessions: Option<PathBuf>,

    /// Directory receiving `<i>.json` snapshots and `summary.json`
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Number of clusters
    #[arg(short = 'k', long = "clusters")]
    pub clusters: Option<usize>,

    /// Seed for session sampling, clustering and representative choice
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability of keeping each listed session
    #[arg(long)]
    pub sample_rate: Option<f64>,

    /// Print the result without writing any files
    #[arg(long)]
    pub no_write: bool,
}

impl SampleArgs {
    /// Layers the flags over the loaded configuration.
    pub fn apply(&self, config: &Config) -> Config {
        let mut config = config.clone();
        if let Some(dir) = &self.sessions {
            config.source.dir = dir.clone();
        }
        if let Some(dir) = &self.out {
            config.output.dir = dir.clone();
        }
        if let Some(clusters) = self.clusters {
            config.sampler.clusters = clusters;
        }
        if let Some(seed) = self.seed {
            config.sampler.seed = Some(seed);
        }
        if let Some(rate) = self.sample_rate {
            config.sampler.session_sample_rate = rate;
        }
        config
    }
}

#[derive(Serialize)]
struct SampleReport<'a> {
    #[serde(flatten)]
    manifest: &'a RunManifest,
    written: Vec<PathBuf>,
}

pub async fn cmd_sample(args: SampleArgs, ctx: &CliContext) -> Result<()> {
    let config = args.apply(ctx.config());
    config.validate().context("invalid sampling configuration")?;

    let source = Arc::new(FsSessionSource::new(config.source.dir.clone()));
    let pipeline = SamplingPipeline::new(source, RunOptions::from_config(&config));
    let outcome = pipeline.run().await.with_context(|| {
        format!(
            "sampling sessions from {}",
            config.source.dir.display()
        )
    })?;
    let manifest = manifest(&outcome, &config.output.viewer_base_url)?;

    let written = if args.no_write {
        Vec::new()
    } else {
        let summary = config.output.write_summary.then_some(&manifest);
        let written = write_outputs(&config.output.dir, &outcome.representatives, summary)
            .with_context(|| format!("writing outputs to {}", config.output.dir.display()))?;
        info!(run = %outcome.run_id, dir = %config.output.dir.display(), "representatives saved");
        written.snapshots.into_iter().chain(written.summary).collect()
    };

    let report = SampleReport {
        manifest: &manifest,
        written,
    };
    if ctx.output().emit(&report)? {
        return Ok(());
    }

    let stats = &manifest.stats;
    println!("Run {} (seed {})", manifest.run_id, manifest.seed);
    println!(
        "Sessions: listed={} sampled={} loaded={} failed={} without-url={}",
        stats.listed, stats.sampled, stats.loaded, stats.failed, stats.sessions_without_url
    );
    println!(
        "Corpus: backdrops={} features={} clusters={} iterations={} converged={}",
        stats.backdrops, stats.dimension, stats.clusters, stats.iterations, stats.converged
    );
    if manifest.representatives.is_empty() {
        println!("No backdrops found; nothing to sample.");
        return Ok(());
    }
    println!();
    println!("Representatives:");
    for entry in &manifest.representatives {
        println!(
            "- {} cluster={} size={} session={} t={} {}",
            entry.file, entry.cluster, entry.cluster_size, entry.session, entry.timestamp, entry.url
        );
    }
    if !report.written.is_empty() {
        println!();
        println!("Written to {}", config.output.dir.display());
    }
    println!();
    println!("Viewer: {}", manifest.viewer_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_configuration() {
        let args = SampleArgs {
            sessions: Some(PathBuf::from("/data/sessions")),
            clusters: Some(9),
            sample_rate: Some(1.0),
            ..SampleArgs::default()
        };
        let config = args.apply(&Config::default());
        assert_eq!(config.source.dir, PathBuf::from("/data/sessions"));
        assert_eq!(config.sampler.clusters, 9);
        assert_eq!(config.sampler.session_sample_rate, 1.0);
        assert_eq!(config.output.dir, PathBuf::from("./blobs"));
        assert_eq!(config.sampler.seed, None);
    }
}
