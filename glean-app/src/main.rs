use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use glean_common::init_logging;
use glean_config::{GleanConfig, GleanConfigLoader};
use tracing::debug;

mod cli;
mod harvest_cmd;
mod note_cmd;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Config: optional file, then GLEAN__* env, then CLI flags per command.
    let cfg: GleanConfig = GleanConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    let mut log_cfg = cfg.logging.to_log_config("glean");
    if cli.verbose {
        log_cfg.default_filter = "debug".into();
    }
    let log_path = init_logging(log_cfg)?;
    debug!(log = %log_path.display(), config = %cli.config.display(), "logging initialised");

    match cli.command {
        Command::Harvest(args) => harvest_cmd::run(args, &cfg).await,
        Command::Publish(args) => note_cmd::publish(args, &cfg).await,
        Command::Login(args) => note_cmd::login(args, &cfg).await,
        Command::ConvertCookies(args) => note_cmd::convert_cookies(args),
    }
}
