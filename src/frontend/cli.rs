use anyhow::Context;
use clap::{ArgAction, Parser};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::analysis::read_api_definition;
use crate::api::ApiDefinition;
use crate::frontend::config::{Config, OutputConfig};
use crate::infrastructure::logging::{self, init_logging, LogFormat};
use crate::model::{ClassCollection, JavaModel};

/// Infers the HTTP API of a Spring application from its class facts.
#[derive(Debug, Parser)]
#[command(name = "apinfer", version)]
pub struct Cli {
    /// Class facts: a JSON file or a directory of them
    #[arg(long, short = 'c')]
    pub classes: PathBuf,

    /// Configuration file; apinfer.toml is looked up from the working directory otherwise
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the API definition here instead of stdout
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Additional class to translate even if no endpoint uses it
    #[arg(long = "root", value_name = "CLASS")]
    pub roots: Vec<String>,

    /// Regular expression of classes to leave opaque
    #[arg(long = "black-box", value_name = "REGEX")]
    pub black_box: Vec<String>,

    /// Regular expression of controller classes to process
    #[arg(long = "controller", value_name = "REGEX")]
    pub controllers: Vec<String>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// More output per occurrence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// What gets written: the API and the representation choices for generators.
#[derive(Serialize)]
struct ApiDocument<'a> {
    output: OutputConfig,
    api: &'a ApiDefinition,
}

impl Cli {
    /// The configuration file merged with command-line additions.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let path = match &self.config {
            Some(path) => Some(path.clone()),
            None => Config::discover(&std::env::current_dir()?),
        };
        let mut config = match &path {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?,
            None => Config::default(),
        };

        let translation = &mut config.translation;
        translation.roots.extend(self.roots.iter().cloned());
        translation.black_box.extend(self.black_box.iter().cloned());
        translation.controllers.extend(self.controllers.iter().cloned());
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        Ok(config)
    }

    pub fn run(&self, config: &Config) -> anyhow::Result<()> {
        let settings = config.to_settings().context("invalid translation settings")?;

        let classes = ClassCollection::from_path(&self.classes)
            .with_context(|| format!("failed to read class facts from {}", self.classes.display()))?;
        let model = JavaModel::new(classes);
        debug!(classes = model.class_count(), "Class model ready");

        let api = read_api_definition(&model, &settings).context("failed to translate API")?;

        let document = ApiDocument {
            output: config.output,
            api: &api,
        };
        let json = serde_json::to_string_pretty(&document)?;
        match &self.out {
            Some(path) => {
                fs::write(path, json + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "Wrote API definition");
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}

pub fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    let mut log_config = config.logging.to_log_config();
    if cli.verbose > 0 {
        log_config = log_config.with_level(logging::level_for_verbosity(cli.verbose));
    }
    let _guard = init_logging(log_config);

    info!("apinfer starting");
    cli.run(&config)
}
