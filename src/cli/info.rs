use anyhow::Result;
use serde::Serialize;

use crate::cli::context::CliContext;

#[derive(Serialize)]
struct BuildInfo<'a> {
    version: &'a str,
    build_date: &'a str,
    git_hash: &'a str,
    git_branch: &'a str,
    config_path: String,
    sessions_dir: String,
    output_dir: String,
    clusters: usize,
}

pub fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let info = BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        git_branch: option_env!("GIT_BRANCH").unwrap_or("unknown"),
        config_path: ctx.config_path().display().to_string(),
        sessions_dir: config.source.dir.display().to_string(),
        output_dir: config.output.dir.display().to_string(),
        clusters: config.sampler.clusters,
    };
    if ctx.output().emit(&info)? {
        return Ok(());
    }

    println!("replayscope Information");
    println!("=======================");
    println!("Version: {}", info.version);
    println!("Build Date: {}", info.build_date);
    println!("Git Commit: {} ({})", info.git_hash, info.git_branch);
    println!();
    println!("Configuration:");
    println!("- Config File: {}", info.config_path);
    println!("- Sessions Directory: {}", info.sessions_dir);
    println!("- Output Directory: {}", info.output_dir);
    println!("- Clusters: {}", info.clusters);
    Ok(())
}
