use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ovnr")]
#[command(about = "OVN flow drift hunter and duplicate lflow cleanup", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (later files override earlier ones)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report duplicated ARP-resolve logical flows of a datapath (optionally delete their ports)
    FindDuplicates {
        /// Datapath as understood by `ovn-sbctl lflow-list` (typically a router)
        #[arg(long, value_name = "NAME")]
        datapath: String,

        /// Delete the down ports behind duplicated flows
        #[arg(long, default_value_t = false)]
        delete: bool,

        /// Print the delete commands instead of running them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Tail ovn-controller's log and report expected flows missing from the bridge
    HuntMissingFlows,

    /// Compute layered config hash + print canonical JSON
    ConfigHash,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    let loaded = commands::load_config(&cli.config_paths)?;

    match cli.cmd {
        Commands::FindDuplicates {
            datapath,
            delete,
            dry_run,
        } => commands::dups::find_duplicates(&loaded.settings, &datapath, delete, dry_run),

        Commands::HuntMissingFlows => {
            commands::hunt::hunt_missing_flows(&loaded.settings.hunt).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::ConfigHash => {
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(ExitCode::SUCCESS)
        }
    }
}
