use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use thicket::app::AppContext;
use thicket::cli::{commands, Cli, Commands};
use thicket::config::Config;

/// Logs go to `log_file` when given. Otherwise they go to stderr, except in
/// the TUI where stderr would draw over the screen.
fn init_tracing(log_file: Option<&Path>, is_tui: bool) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };
    let stderr_layer = (log_file.is_none() && !is_tui)
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(EnvFilter::from_default_env())
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let is_tui = matches!(cli.command, Commands::Tui { .. });
    init_tracing(cli.log_file.as_deref(), is_tui)?;

    let mut config = Config::load()?;
    if let Some(workers) = cli.workers {
        config.api.workers = workers;
    }
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    let ctx = AppContext::new(&config.api)?;

    match cli.command {
        Commands::Stories { feed, pages } => {
            commands::list_stories(&ctx, feed, pages).await?;
        }
        Commands::Thread { id } => {
            commands::show_thread(&ctx, id).await?;
        }
        Commands::Item { ids } => {
            commands::show_items(&ctx, &ids).await?;
        }
        Commands::Tui { feed } => {
            thicket::tui::run(Arc::new(ctx), Arc::new(config), feed).await?;
        }
    }

    Ok(())
}
