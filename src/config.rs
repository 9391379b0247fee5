//! CLI configuration and runtime settings for a template walk.

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

use crate::render::RenderContext;

/// Mirror a directory tree, rendering template files along the way
#[derive(Parser, Debug)]
#[command(name = "tplwalker")]
#[command(version)]
#[command(about = "Mirror a directory tree, rendering template files along the way")]
pub struct Cli {
    /// Source directory
    pub source: PathBuf,

    /// Destination directory (created if missing, existing files are overwritten)
    pub destination: PathBuf,

    /// File name suffix marking templates; stripped from the output name
    #[arg(short, long, default_value = ".tpl")]
    pub suffix: String,

    /// Directory names to skip entirely (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// JSON file providing the template data
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Extra string values for the template data, applied over --data
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runtime configuration parsed from CLI
#[derive(Debug, Clone)]
pub struct Config {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub suffix: String,
    /// Ignored directory names, blanks dropped
    pub ignore: Vec<String>,
    /// Data passed to every template
    pub context: RenderContext,
    pub verbose: bool,
}

impl Config {
    /// Create Config from CLI arguments, loading the template data
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let mut context = match &cli.data {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read data file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid JSON in data file {}", path.display()))?
            }
            None => Value::Object(Map::new()),
        };

        if !cli.set.is_empty() {
            let Some(object) = context.as_object_mut() else {
                bail!("--set requires the data file to hold a JSON object");
            };
            for pair in &cli.set {
                let Some((key, value)) = pair.split_once('=') else {
                    bail!("Invalid --set value {pair:?}, expected KEY=VALUE");
                };
                if key.is_empty() {
                    bail!("Invalid --set value {pair:?}, key is empty");
                }
                object.insert(key.to_string(), Value::String(value.to_string()));
            }
        }

        let ignore = cli
            .ignore
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            source: cli.source,
            destination: cli.destination,
            suffix: cli.suffix,
            ignore,
            context,
            verbose: cli.verbose,
        })
    }
}
