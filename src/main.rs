//! kompose - Convert Docker Compose projects into Kubernetes manifests
//!
//! This is the main CLI entry point for kompose.

use clap::{ArgAction, Args, Parser, Subcommand};
use kompose::cluster::{commands, ClusterConfig, ClusterOverrides, HttpClusterClient, Uploader};
use kompose::compose::{ComposeConfig, ComposeParser};
use kompose::convert::{ConvertOptions, Converter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// kompose - Docker Compose to Kubernetes
#[derive(Parser)]
#[command(name = "kompose")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Convert Docker Compose projects into Kubernetes manifests", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Compose file
    #[arg(short, long, global = true, env = "COMPOSE_FILE")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Cluster connection settings
#[derive(Args, Clone, Default)]
struct ClusterArgs {
    /// Path to the kubeconfig file
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use
    #[arg(long)]
    context: Option<String>,
    /// API server URL
    #[arg(long)]
    server: Option<String>,
    /// Bearer token
    #[arg(long)]
    token: Option<String>,
    /// Namespace
    #[arg(long)]
    namespace: Option<String>,
    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,
}

impl From<ClusterArgs> for ClusterOverrides {
    fn from(args: ClusterArgs) -> Self {
        Self {
            kubeconfig: args.kubeconfig,
            context: args.context,
            server: args.server,
            token: args.token,
            namespace: args.namespace,
            insecure: args.insecure,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a compose file into Kubernetes manifests
    Convert {
        /// Write every manifest to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print manifests to stdout
        #[arg(long)]
        stdout: bool,
        /// Generate YAML instead of JSON
        #[arg(short, long)]
        yaml: bool,
        /// Generate a Deployment for each service
        #[arg(short, long)]
        deployment: bool,
        /// Generate a DaemonSet for each service
        #[arg(long)]
        daemonset: bool,
        /// Generate a ReplicaSet for each service
        #[arg(long)]
        replicaset: bool,
        /// Generate a chart
        #[arg(short, long)]
        chart: bool,
    },

    /// Submit converted manifests to the cluster
    Up {
        /// Directory holding the manifests
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// List the project's services and replication controllers
    Ps {
        /// List services
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        svc: bool,
        /// List replication controllers
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        rc: bool,
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Delete the project's services and replication controllers
    Delete {
        /// Only delete this service
        #[arg(long)]
        name: Option<String>,
        /// Delete services
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        svc: bool,
        /// Delete replication controllers
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        rc: bool,
        #[command(flatten)]
        cluster: ClusterArgs,
    },

    /// Set the replica count of the project's replication controllers
    Scale {
        /// Desired replica count
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        scale: i64,
        /// Only scale this replication controller
        #[arg(long)]
        rc: Option<String>,
        #[command(flatten)]
        cluster: ClusterArgs,
    },
}

/// Load the compose project from `--file` or the default file names
fn load_project(file: Option<PathBuf>) -> anyhow::Result<ComposeConfig> {
    let working_dir = std::env::current_dir()?;
    let compose_file = file.unwrap_or_else(|| {
        ComposeParser::find_compose_file(&working_dir)
            .unwrap_or_else(|| working_dir.join("docker-compose.yml"))
    });

    tracing::debug!("Reading compose file {}", compose_file.display());
    Ok(ComposeParser::parse_file(&compose_file)?)
}

fn connect(args: ClusterArgs) -> anyhow::Result<HttpClusterClient> {
    let config = ClusterConfig::resolve(&args.into())?;
    tracing::debug!("Using cluster {} namespace {}", config.server, config.namespace);
    Ok(HttpClusterClient::new(config)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            out,
            stdout,
            yaml,
            deployment,
            daemonset,
            replicaset,
            chart,
        } => {
            let options = ConvertOptions {
                out,
                stdout,
                yaml,
                deployment,
                daemonset,
                replicaset,
                chart,
                ..Default::default()
            };
            // Conflicting flags fail before the compose file is read
            let converter = Converter::new(options)?;
            let project = load_project(cli.file)?;
            converter.convert(&project)?;
        }

        Commands::Up { dir, cluster } => {
            let client = connect(cluster)?;
            let summary = Uploader::new(&client, dir).upload().await?;
            tracing::info!(
                "Submitted {} objects, {} failed",
                summary.submitted,
                summary.failed
            );
        }

        Commands::Ps { svc, rc, cluster } => {
            let names = service_names(&load_project(cli.file)?);
            let client = connect(cluster)?;
            let mut stdout = std::io::stdout().lock();
            commands::ps(&client, &names, svc, rc, &mut stdout).await?;
        }

        Commands::Delete {
            name,
            svc,
            rc,
            cluster,
        } => {
            let names = service_names(&load_project(cli.file)?);
            let client = connect(cluster)?;
            commands::delete(&client, &names, name.as_deref(), svc, rc).await?;
        }

        Commands::Scale { scale, rc, cluster } => {
            let names = service_names(&load_project(cli.file)?);
            let client = connect(cluster)?;
            let mut stdout = std::io::stdout().lock();
            commands::scale(&client, &names, scale, rc.as_deref(), &mut stdout).await?;
        }
    }

    Ok(())
}

fn service_names(project: &ComposeConfig) -> Vec<String> {
    project.services.keys().cloned().collect()
}
