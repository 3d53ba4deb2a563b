use clap::Subcommand;

use super::config::ConfigArgs;
use super::features::FeaturesArgs;
use super::sample::SampleArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Cluster recorded sessions and write one representative per cluster
    Sample(SampleArgs),

    /// Vectorize sessions and list the discovered feature dictionary
    Features(FeaturesArgs),

    /// Inspect replayscope configuration
    Config(ConfigArgs),

    /// Show version and build information
    Info,
}
