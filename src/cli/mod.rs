pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod features;
pub mod info;
pub mod output;
pub mod runtime;
pub mod sample;

pub use config::{cmd_config, ConfigArgs};
pub use features::{cmd_features, FeaturesArgs};
pub use sample::{cmd_sample, SampleArgs};
