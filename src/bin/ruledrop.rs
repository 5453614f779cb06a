// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use ruledrop::{
    config::Config,
    engine::{Engine, EngineError, InstallRequest},
    install::{FsCopier, PromptConfirm},
    path::default_config_path,
    report::Report,
    source::{Git2Fetcher, SourcePreference},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::{fs::read_to_string, path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "ruledrop [options] <ruledrop-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = load_config(self.config)?;
        match self.command {
            Command::Install(opts) => run_install(config, opts),
            Command::List => run_list(config),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Install rule set into current project.
    #[command(override_usage = "ruledrop install [options] <rule_set>")]
    Install(InstallOptions),

    /// List recognized rule sets.
    #[command(override_usage = "ruledrop list")]
    List,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InstallOptions {
    /// Identifier of rule set to install.
    #[arg(required = true, value_name = "rule_set")]
    pub rule_set: String,

    /// Overwrite existing rules without asking.
    #[arg(short, long)]
    pub force: bool,

    /// Only use local checkouts of the template repository.
    #[arg(short, long, group = "source")]
    pub local: bool,

    /// Always fetch the template repository, even if a local checkout exists.
    #[arg(short, long, group = "source")]
    pub remote: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        let code = error
            .downcast_ref::<EngineError>()
            .map(EngineError::exit_code)
            .unwrap_or(1);
        exit(code);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (default_config_path()?, false),
    };

    // INVARIANT: Only a missing default configuration falls back to defaults.
    if !explicit && !path.exists() {
        return Ok(Config::default());
    }

    let data = read_to_string(&path)
        .with_context(|| format!("failed to read configuration file {:?}", path.display()))?;
    let config = data
        .parse::<Config>()
        .with_context(|| format!("invalid configuration file {:?}", path.display()))?;

    Ok(config)
}

fn run_install(config: Config, opts: InstallOptions) -> Result<()> {
    let preference = if opts.local {
        SourcePreference::Local
    } else if opts.remote {
        SourcePreference::Remote
    } else {
        SourcePreference::Auto
    };
    let request = InstallRequest {
        rule_set: opts.rule_set,
        force: opts.force,
        preference,
    };

    let engine = Engine::new(config, Git2Fetcher::new(ProgressBar::new(0)), FsCopier)
        .context("invalid rule set listing in configuration")?;
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let result = engine.install(cwd, &request, &PromptConfirm)?;

    print!("{}", Report::new(result).with_installed_modes());

    Ok(())
}

fn run_list(config: Config) -> Result<()> {
    let engine = Engine::new(config, Git2Fetcher::new(ProgressBar::hidden()), FsCopier)
        .context("invalid rule set listing in configuration")?;
    for id in engine.catalog().iter() {
        println!("{id}");
    }

    Ok(())
}
