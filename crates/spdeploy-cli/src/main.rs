//! spdeploy - SharePoint app catalog deployment
//!
//! Usage:
//!   spdeploy deploy --tenant contoso --site sites/apps --filename app.sppkg
//!   spdeploy deploy --profile staging
//!   spdeploy profiles     # List profiles in spdeploy.toml
//!   spdeploy template     # Print the built-in ProcessQuery template

mod prompt;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::{Term, style};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spdeploy_core::auth::OnlineAuthenticator;
use spdeploy_core::config::profile::DEFAULT_PROFILE;
use spdeploy_core::config::{DeployOptions, DeploymentConfig, ProfileStore};
use spdeploy_core::http::ReqwestTransport;
use spdeploy_core::payload::DEFAULT_TEMPLATE;
use spdeploy_core::pipeline::DeployPipeline;
use spdeploy_core::site::resolve_site_url;

use crate::prompt::{CredentialPrompt, MissingCredentials};

#[derive(Parser)]
#[command(name = "spdeploy")]
#[command(about = "Deploy packages in a SharePoint app catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a package that is already uploaded to the app catalog
    Deploy(Box<DeployArgs>),

    /// List profiles in the resolved spdeploy.toml
    Profiles {
        /// Profile file (defaults to ./spdeploy.toml, then the user config dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the built-in ProcessQuery template
    Template,
}

#[derive(Args)]
struct DeployArgs {
    /// Profile to load from spdeploy.toml
    #[arg(long, short)]
    profile: Option<String>,
    /// Profile file (defaults to ./spdeploy.toml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Account used to sign in
    #[arg(long, short, env = "SPDEPLOY_USERNAME")]
    username: Option<String>,
    /// Password (prompted for when missing and the terminal is interactive)
    #[arg(long, env = "SPDEPLOY_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Tenant name, e.g. "contoso" for https://contoso.sharepoint.com
    #[arg(long, short, env = "SPDEPLOY_TENANT")]
    tenant: Option<String>,
    /// Full hostname including scheme; takes precedence over --tenant
    #[arg(long, env = "SPDEPLOY_HOSTNAME")]
    hostname: Option<String>,
    /// Site path that holds the app catalog, e.g. "sites/apps"
    #[arg(long, short)]
    site: Option<String>,
    /// Package file name in the app catalog
    #[arg(long, short)]
    filename: Option<String>,
    /// Make the solution available to all sites without feature activation
    #[arg(long, value_name = "BOOL")]
    skip_feature_deployment: Option<bool>,
    /// Replace the built-in ProcessQuery template
    #[arg(long, value_name = "PATH")]
    template: Option<PathBuf>,
    /// Log each pipeline stage
    #[arg(short, long)]
    verbose: bool,
    /// Never prompt for credentials
    #[arg(long)]
    no_prompt: bool,
}

impl DeployArgs {
    fn options(&self) -> DeployOptions {
        DeployOptions {
            username: self.username.clone(),
            password: self.password.clone(),
            tenant: self.tenant.clone(),
            hostname: self.hostname.clone(),
            site: self.site.clone(),
            filename: self.filename.clone(),
            skip_feature_deployment: self.skip_feature_deployment,
            verbose: self.verbose.then_some(true),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Deploy(args) if args.verbose);
    let default_filter = if verbose {
        "warn,spdeploy=debug,spdeploy_core=debug"
    } else {
        "warn,spdeploy=info,spdeploy_core=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Deploy(args) => run_deploy(*args),
        Commands::Profiles { config } => run_profiles(config),
        Commands::Template => {
            print!("{}", DEFAULT_TEMPLATE);
            Ok(())
        }
    }
}

fn profile_store(config: Option<PathBuf>) -> Result<ProfileStore> {
    match config {
        Some(path) => Ok(ProfileStore::from_file(path)),
        None => ProfileStore::discover(),
    }
}

fn run_deploy(args: DeployArgs) -> Result<()> {
    let store = profile_store(args.config.clone())?;
    debug!(path = ?store.path(), profile = ?args.profile, "loading deployment profile");
    let mut options = args.options().or(store.options(args.profile.as_deref())?);

    if !args.no_prompt && MissingCredentials::of(&options).any() && Term::stderr().is_term() {
        options = CredentialPrompt::new().complete(options)?;
    }

    let config = DeploymentConfig::new(options)?;

    let template = match &args.template {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template: {}", path.display()))?,
        ),
        None => None,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        let authenticator = OnlineAuthenticator::new()?;
        let transport = ReqwestTransport::new()?;

        let mut pipeline = DeployPipeline::new(&authenticator, &transport);
        if let Some(template) = template {
            pipeline = pipeline.with_template(template);
        }
        pipeline.deploy(&config).await?;

        println!(
            "{} Deployed '{}' to {}",
            style("✓").green(),
            config.filename(),
            resolve_site_url(&config)
        );
        Ok::<(), anyhow::Error>(())
    })
}

fn run_profiles(config: Option<PathBuf>) -> Result<()> {
    let store = profile_store(config)?;
    let Some(path) = store.path() else {
        println!("No spdeploy.toml found");
        return Ok(());
    };

    let file = store.load()?;
    println!("{}", style(path.display()).bold());
    if file.profile.is_empty() {
        println!("  (no profiles)");
    }
    for name in file.names() {
        let marker = if name == DEFAULT_PROFILE { " (default)" } else { "" };
        println!("  {}{}", name, marker);
    }
    Ok(())
}
