use super::config::cmd_config;
use super::env::CliArgs;
use super::features::cmd_features;
use super::info::cmd_info;
use super::sample::cmd_sample;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Sample(args) => cmd_sample(args, ctx).await,
        Commands::Features(args) => cmd_features(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
        Commands::Info => cmd_info(ctx),
    }
}
