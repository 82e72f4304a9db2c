//! fzup - Flipper SDK deployment tool
//!
//! Usage:
//!   fzup update               # deploy or refresh the SDK
//!   fzup update -c dev -t f7  # switch channel / hardware target
//!   fzup status [--json]      # show the deployed SDK
//!   fzup clean [--purge]      # remove deployed state

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fzup_core::deploy::{DeployOutcome, SdkDeployer};
use fzup_core::paths::default_state_dir;
use fzup_core::source::Mode;
use fzup_core::status::collect_status;
use fzup_core::task::{reconcile, DeployTask};

#[derive(Parser)]
#[command(name = "fzup")]
#[command(about = "Flipper SDK deployment tool", version)]
struct Cli {
    /// State directory (default: $FZUP_HOME or ~/.fzup)
    #[arg(short = 'd', long = "fzup-dir", global = true, value_name = "DIR")]
    fzup_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the SDK, or bring the current deployment up to date
    Update {
        /// Hardware target (e.g. f7, f18)
        #[arg(short = 't', long)]
        hw_target: Option<String>,

        /// Redeploy even if the SDK is up-to-date
        #[arg(short, long)]
        force: bool,

        /// Use a firmware branch
        #[arg(short, long, group = "mode")]
        branch: Option<String>,

        /// Use a release channel
        #[arg(short, long, group = "mode", value_enum)]
        channel: Option<ChannelArg>,

        /// Use a static archive URL
        #[arg(short, long, group = "mode")]
        url: Option<String>,

        /// Use a local archive file
        #[arg(long, group = "mode", value_name = "PATH")]
        local: Option<PathBuf>,

        /// Override the index URL for branch or channel mode
        #[arg(long)]
        index_url: Option<String>,
    },

    /// Remove deployed SDK state
    Clean {
        /// Remove only the download cache
        #[arg(long)]
        downloads: bool,

        /// Remove the whole state directory
        #[arg(long)]
        purge: bool,
    },

    /// Show the deployed SDK state
    Status {
        /// Machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Dev,
    Rc,
    Release,
}

impl ChannelArg {
    fn as_str(&self) -> &'static str {
        match self {
            ChannelArg::Dev => "dev",
            ChannelArg::Rc => "rc",
            ChannelArg::Release => "release",
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .init();

    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("failed to run operation: {err:#}");
            2
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let state_dir = cli.fzup_dir.unwrap_or_else(default_state_dir);
    let deployer = SdkDeployer::new(state_dir);

    match cli.command {
        Commands::Update {
            hw_target,
            force,
            branch,
            channel,
            url,
            local,
            index_url,
        } => run_update(
            &deployer, hw_target, force, branch, channel, url, local, index_url,
        ),
        Commands::Clean { downloads, purge } => run_clean(&deployer, downloads, purge),
        Commands::Status { json } => run_status(&deployer, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_update(
    deployer: &SdkDeployer,
    hw_target: Option<String>,
    force: bool,
    branch: Option<String>,
    channel: Option<ChannelArg>,
    url: Option<String>,
    local: Option<PathBuf>,
    index_url: Option<String>,
) -> Result<i32> {
    let mut params = BTreeMap::new();
    let mode = if let Some(branch) = branch {
        params.insert("branch".to_string(), branch);
        if let Some(index_url) = index_url {
            params.insert("branch_root_url".to_string(), index_url);
        }
        Some(Mode::Branch)
    } else if let Some(channel) = channel {
        params.insert("channel".to_string(), channel.as_str().to_string());
        if let Some(index_url) = index_url {
            params.insert("index_url".to_string(), index_url);
        }
        Some(Mode::Channel)
    } else if let Some(url) = url {
        params.insert("url".to_string(), url);
        Some(Mode::Url)
    } else if let Some(local) = local {
        params.insert("path".to_string(), local.display().to_string());
        Some(Mode::Local)
    } else {
        None
    };

    let request = DeployTask {
        hw_target,
        force,
        mode,
        params,
    };

    let previous = deployer.previous_state()?;
    if previous.is_none() && request.mode.is_none() {
        warn!("no previous SDK state was found, deploying the latest release");
        warn!("specify a mode explicitly to pick another source, see `fzup update -h`");
    }

    let task = reconcile(previous.as_ref(), &request);
    match deployer.deploy(&task) {
        Ok(DeployOutcome::UpToDate { version }) => {
            info!("SDK {version} is up-to-date");
            Ok(0)
        }
        Ok(DeployOutcome::Deployed { version }) => {
            info!("SDK {version} deployed for {}", task.hw_target);
            Ok(0)
        }
        Err(err) => {
            error!("failed to deploy SDK for {}: {err}", task.hw_target);
            Ok(1)
        }
    }
}

fn run_clean(deployer: &SdkDeployer, downloads: bool, purge: bool) -> Result<i32> {
    if purge {
        deployer.purge()?;
    } else if downloads {
        deployer.clean_downloads()?;
    } else {
        deployer.clean_sdk()?;
    }
    info!("done");
    Ok(0)
}

fn run_status(deployer: &SdkDeployer, json: bool) -> Result<i32> {
    let report = collect_status(deployer)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(if report.is_deployed() { 0 } else { 1 });
    }

    if !report.is_deployed() {
        error!("SDK is not deployed");
        return Ok(1);
    }

    println!("State dir:     {}", report.state_dir.display());
    println!("SDK dir:       {}", report.sdk_dir.display());
    println!("Download dir:  {}", report.download_dir.display());
    if let Some(target) = &report.target {
        println!("Target:        {target}");
    }
    if let Some(mode) = &report.mode {
        println!("Mode:          {mode}");
    }
    if let Some(version) = &report.version {
        println!("Version:       {version}");
    }
    if let Some(deployed_at) = &report.deployed_at {
        println!("Deployed at:   {deployed_at}");
    }
    for (key, value) in &report.details {
        println!("  {key}: {value}");
    }
    Ok(0)
}
