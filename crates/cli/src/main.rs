//! Kubernetes Bundle Inspector CLI
//!
//! A command-line tool for inspecting captured Kubernetes support bundles
//! offline: environment summary, nodes, pods and their logs, volume claims
//! and any other resource type the bundle recorded.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{env, nodes, pods, pvc, resource, BundleContext};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kubernetes Bundle Inspector CLI
#[derive(Parser)]
#[command(name = "kbi")]
#[command(author, version, about = "Offline inspector for Kubernetes support bundles", long_about = None)]
pub struct Cli {
    /// Support bundle to inspect (can also be set via KBI_ARCHIVE env var)
    #[arg(long, short, env = "KBI_ARCHIVE", global = true)]
    pub archive: Option<PathBuf>,

    /// Directory holding the OS logo images
    #[arg(long, env = "KBI_ASSETS_DIR", global = true)]
    pub assets_dir: Option<PathBuf>,

    /// Output format (defaults to the config file setting, then table)
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the environment summary recorded by the collector
    Env,

    /// Inspect cluster nodes
    #[command(subcommand)]
    Nodes(NodeCommands),

    /// Inspect pods in the environment namespace
    #[command(subcommand)]
    Pods(PodCommands),

    /// Inspect persistent volume claims
    #[command(subcommand)]
    Pvc(PvcCommands),

    /// Inspect any resource type by name or abbreviation
    #[command(subcommand)]
    Resource(ResourceCommands),

    /// List resource types present in the bundle
    Types {
        /// List cluster-wide types instead of namespaced ones
        #[arg(long)]
        clusterwide: bool,
    },
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Show the merged node status
    Status,

    /// List node names
    Names,

    /// Show describe output
    Describe {
        /// Only this node
        name: Option<String>,
    },

    /// Show the `kubectl get nodes` table
    Get,
}

#[derive(Subcommand)]
pub enum PodCommands {
    /// Show container statuses per pod
    Containers,

    /// Group pods by workload class
    Classes,

    /// Show a container's log
    Logs {
        /// Pod name
        pod: String,

        /// Container name
        container: String,

        /// Comma-separated fields to keep (e.g. level,message)
        #[arg(long)]
        fields: Option<String>,

        /// Minimum level (debug, info, warn, error, fatal)
        #[arg(long)]
        level: Option<String>,
    },

    /// List pod names
    Names,

    /// Show the `kubectl get pods` table
    Get,
}

#[derive(Subcommand)]
pub enum PvcCommands {
    /// Show the claim to volume mapping
    Volumes,

    /// Show the bound volume's describe output per claim
    Describe,
}

#[derive(Subcommand)]
pub enum ResourceCommands {
    /// Show the `kubectl get` table
    Status {
        /// Resource type, abbreviation or close spelling
        resource_type: String,

        /// Look the type up among cluster-wide resources
        #[arg(long)]
        clusterwide: bool,
    },

    /// List resource names
    Names {
        /// Resource type, abbreviation or close spelling
        resource_type: String,

        /// Look the type up among cluster-wide resources
        #[arg(long)]
        clusterwide: bool,
    },

    /// Show describe output
    Describe {
        /// Resource type, abbreviation or close spelling
        resource_type: String,

        /// Look the type up among cluster-wide resources
        #[arg(long)]
        clusterwide: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| output::OutputFormat::from_config(config.default_format.as_deref()));

    let archive = cli
        .archive
        .or_else(|| config.archive.as_ref().map(PathBuf::from))
        .context("no bundle given; pass --archive or set KBI_ARCHIVE")?;
    let assets_dir = cli
        .assets_dir
        .or_else(|| config.assets_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("assets"));

    let ctx = BundleContext::open(&archive, assets_dir, format)?;

    match cli.command {
        Commands::Env => env::show_env(&ctx)?,
        Commands::Nodes(node_cmd) => match node_cmd {
            NodeCommands::Status => nodes::show_status(&ctx)?,
            NodeCommands::Names => nodes::list_names(&ctx)?,
            NodeCommands::Describe { name } => nodes::describe(&ctx, name.as_deref())?,
            NodeCommands::Get => nodes::show_table(&ctx)?,
        },
        Commands::Pods(pod_cmd) => match pod_cmd {
            PodCommands::Containers => pods::show_containers(&ctx)?,
            PodCommands::Classes => pods::show_classes(&ctx)?,
            PodCommands::Logs {
                pod,
                container,
                fields,
                level,
            } => pods::show_logs(&ctx, &pod, &container, fields.as_deref(), level.as_deref())?,
            PodCommands::Names => pods::list_names(&ctx)?,
            PodCommands::Get => pods::show_table(&ctx)?,
        },
        Commands::Pvc(pvc_cmd) => match pvc_cmd {
            PvcCommands::Volumes => pvc::show_volumes(&ctx)?,
            PvcCommands::Describe => pvc::describe_volumes(&ctx)?,
        },
        Commands::Resource(resource_cmd) => match resource_cmd {
            ResourceCommands::Status {
                resource_type,
                clusterwide,
            } => resource::show_status(&ctx, &resource_type, clusterwide)?,
            ResourceCommands::Names {
                resource_type,
                clusterwide,
            } => resource::list_names(&ctx, &resource_type, clusterwide)?,
            ResourceCommands::Describe {
                resource_type,
                clusterwide,
            } => resource::describe(&ctx, &resource_type, clusterwide)?,
        },
        Commands::Types { clusterwide } => resource::list_types(&ctx, clusterwide)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}
