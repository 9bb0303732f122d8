//! Dashgate CLI — inspect navigation and authorization decisions.
//!
//! ```bash
//! dashgate routes
//! dashgate menu -p Users -p Dashboard
//! dashgate check /users-management/42 -p Users
//! dashgate landing -m settings
//! DG_API_BASE_URL=https://api.example.com dashgate resolve --token "$TOKEN"
//! ```
//!
//! Every command reads `dashgate.toml` (or `--config <path>`) and the `DG_*`
//! environment variables.

mod commands;

use clap::{Parser, Subcommand};
use commands::GrantArgs;
use dashgate_core::logging::{init_logging, LogOutput};
use dashgate_core::DashgateConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dashgate", about = "Dashgate navigation and authorization inspector", version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = dashgate_core::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the route registry, marking routes the permissions open
    Routes {
        #[command(flatten)]
        grant: GrantArgs,
    },

    /// Show the navigation menu for a permission set
    Menu {
        #[command(flatten)]
        grant: GrantArgs,

        /// Highlight the entry active for this pathname
        #[arg(long)]
        active: Option<String>,
    },

    /// Evaluate the route guard for a pathname
    Check {
        /// Pathname to navigate to
        path: String,

        #[command(flatten)]
        grant: GrantArgs,

        /// Evaluate as a signed-out visitor
        #[arg(long, conflicts_with = "loading")]
        signed_out: bool,

        /// Evaluate while the identity is still resolving
        #[arg(long)]
        loading: bool,
    },

    /// Show where a freshly signed-in user lands
    Landing {
        #[command(flatten)]
        grant: GrantArgs,
    },

    /// Resolve the identity through the configured API and show its menu
    Resolve {
        /// Bearer token (overrides DG_API_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let output = execute(cli).await?;
    println!("{}", output);
    Ok(())
}

async fn execute(cli: Cli) -> anyhow::Result<String> {
    let config = DashgateConfig::load_from(&cli.config)?;
    config.validate()?;

    let logging = config.logging.to_logging_config_with(LogOutput::Stderr { format: None })?;
    init_logging(&logging)?;

    let output = match cli.command {
        Commands::Routes { grant } => commands::inspect::routes(&config, &grant, cli.json)?,
        Commands::Menu { grant, active } => {
            commands::inspect::menu(&config, &grant, active.as_deref(), cli.json)?
        }
        Commands::Check { path, grant, signed_out, loading } => {
            commands::inspect::check(&config, &path, &grant, signed_out, loading, cli.json)?
        }
        Commands::Landing { grant } => commands::inspect::landing(&config, &grant, cli.json)?,
        Commands::Resolve { token } => {
            commands::resolve::run(config, token, cli.json).await?
        }
    };

    Ok(output)
}
