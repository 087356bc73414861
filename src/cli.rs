use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use ontrack_bridge::{BridgeConfig, TrackerClient, TriggerEngine, TriggerSet};

use crate::output;

#[derive(Parser)]
#[command(name = "ontrack-bridge")]
#[command(author, version, about = "Ontrack bridge for CI pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ontrack base URL, overrides the configuration file
    #[arg(short, long, global = true, env = "ONTRACK_URL")]
    url: Option<String>,

    /// Ontrack API token, overrides the configuration file
    #[arg(short, long, global = true, env = "ONTRACK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the Ontrack resource of a branch as JSON
    Branch {
        #[arg(short = 'P', long)]
        project: String,

        #[arg(short, long)]
        branch: String,
    },

    /// Shows the build each configured trigger would pass to the job
    Candidates,
}

impl Cli {
    fn load_config(&self) -> Result<BridgeConfig> {
        let mut config = BridgeConfig::load(self.config.as_deref())?;
        if let Some(url) = &self.url {
            config.ontrack.ontrack_url.clone_from(url);
        }
        if let Some(token) = &self.token {
            config.ontrack.token = Some(token.as_str().into());
        }
        config.validate()?;
        Ok(config)
    }

    async fn execute_branch(&self, config: &BridgeConfig, project: &str, branch: &str) -> Result<()> {
        info!("Getting Ontrack branch {project}/{branch}");

        let client = TrackerClient::new(&config.ontrack)?;
        let resource = client.for_branch(project, branch).await?;

        let json_output = if self.pretty {
            serde_json::to_string_pretty(resource.as_value())?
        } else {
            serde_json::to_string(resource.as_value())?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)?;
            info!("Branch written to: {}", output_path.display());
        } else {
            println!("{json_output}");
        }

        Ok(())
    }

    async fn execute_candidates(&self, config: &BridgeConfig) -> Result<()> {
        let triggers = TriggerSet::new(config.triggers.clone())?;
        if triggers.is_empty() {
            info!("No trigger configured");
            return Ok(());
        }

        let client = TrackerClient::new(&config.ontrack)?;
        let engine = TriggerEngine::new(&client);

        let mut candidates = Vec::with_capacity(triggers.len());
        for trigger in &triggers {
            let candidate = engine.candidate(trigger).await?;
            candidates.push((trigger.clone(), candidate));
        }

        output::print_candidates(&candidates);
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.command {
            Commands::Branch { project, branch } => {
                self.execute_branch(&config, project, branch).await
            }
            Commands::Candidates => self.execute_candidates(&config).await,
        }
    }
}
