use std::path::PathBuf;

use clap::{Parser, Subcommand};
use echohub_cli::cli::{apply_overrides, run, CliCommand, Overrides};
use echohub_core::tracing_setup::init_tracing;
use echohub_core::HubConfig;

#[derive(Parser)]
#[command(name = "echohub")]
#[command(about = "Aggregate echo feeds from a federation of hubs")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Path to JSON config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Hub directory URL (overrides config and environment)
    #[arg(long, short = 'd')]
    directory: Option<String>,

    /// Echoes requested from each hub per page
    #[arg(long)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the hub directory and probe every hub
    Hubs,

    /// Fetch one page from every live hub
    Page {
        /// Page index
        page: u32,
    },

    /// Load the merged feed page by page until exhausted
    Feed {
        /// Stop after this many pages
        #[arg(long, short = 'm')]
        max_pages: Option<u32>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match HubConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let config = apply_overrides(
        config,
        &Overrides {
            directory: cli.directory,
            page_size: cli.page_size,
        },
    );

    let command = match cli.command {
        Commands::Hubs => CliCommand::Hubs,
        Commands::Page { page } => CliCommand::Page { page },
        Commands::Feed { max_pages } => CliCommand::Feed { max_pages },
    };

    if let Err(e) = run(command, config, cli.pretty).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
