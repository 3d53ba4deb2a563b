use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Prints `payload` in the machine-readable formats. Returns `false` for
    /// `Human`, leaving the rendering to the caller.
    pub fn emit<T: Serialize>(self, payload: &T) -> Result<bool> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(payload)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(payload)?),
            OutputFormat::Human => return Ok(false),
        }
        Ok(true)
    }
}
