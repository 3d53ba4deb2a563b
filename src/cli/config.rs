use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value as JsonValue;

use crate::cli::context::CliContext;
use crate::cli::output::OutputFormat;

use super::runtime::read_config_file;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Get one configuration value by dotted key (e.g. `sampler.clusters`)
    Get {
        /// Configuration key
        key: String,
    },

    /// Validate configuration
    Validate,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    let path = ctx.config_path().to_path_buf();
    match args.action {
        ConfigAction::Show => {
            if !ctx.output().emit(ctx.config())? {
                println!("Effective configuration ({}):", path.display());
                print!("{}", serde_yaml::to_string(ctx.config())?);
            }
        }
        ConfigAction::Get { key } => {
            let json = serde_json::to_value(ctx.config())?;
            let segments = split_key(&key)?;
            let Some(value) = get_json_value(&json, &segments) else {
                bail!("{} not found in configuration", key);
            };
            match ctx.output() {
                OutputFormat::Human => match value {
                    JsonValue::String(text) => println!("{text}"),
                    other => print!("{}", serde_yaml::to_string(other)?),
                },
                format => {
                    format.emit(value)?;
                }
            }
        }
        ConfigAction::Validate => {
            match read_config_file(&path).await? {
                Some(file) => {
                    file.validate()
                        .with_context(|| format!("validating {}", path.display()))?;
                    println!("Configuration file {} is valid", path.display());
                }
                None => println!(
                    "No configuration file at {}; defaults are valid",
                    path.display()
                ),
            }
            ctx.config()
                .validate()
                .context("environment overrides produce an invalid configuration")?;
        }
    }

    Ok(())
}

fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        bail!("configuration key cannot be empty");
    }
    Ok(segments)
}

fn get_json_value<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let mut current = value;
    for segment in path {
        match current {
            JsonValue::Object(map) => {
                current = map.get(*segment)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn dotted_keys_resolve_into_sections() {
        let doc = serde_json::to_value(Config::default()).unwrap();
        let segments = split_key("sampler.clusters").unwrap();
        assert_eq!(get_json_value(&doc, &segments), Some(&JsonValue::from(5)));
        let segments = split_key("output.viewer_base_url").unwrap();
        assert_eq!(
            get_json_value(&doc, &segments),
            Some(&JsonValue::from("http://localhost:3000"))
        );
        assert!(get_json_value(&doc, &["sampler", "missing"]).is_none());
        assert!(split_key("..").is_err());
    }
}
