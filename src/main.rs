//! quakemap - Interactive earthquake maps from live USGS data.
//!
//! Fetches the USGS earthquake feed and the PB2002 plate boundaries, styles
//! each event by magnitude and depth, and renders a Leaflet map with a
//! layer switcher and depth legend.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

mod cli;
mod client;
mod errors;
mod layers;
mod legend;
mod map;
mod models;
mod orchestrator;
mod output;
mod server;
mod style;

use cli::{Cli, Command};
use client::HttpFeedClient;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // One event queue for both fetches
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    match cli.command {
        Command::Render(args) => runtime.block_on(cmd_render(args)),
        Command::Serve(args) => runtime.block_on(cmd_serve(args)),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `render` command - fetch, compose, write once.
async fn cmd_render(args: cli::RenderArgs) -> Result<()> {
    let client =
        HttpFeedClient::new(args.source.feed_config()).context("failed to create feed client")?;

    let loaded = orchestrator::load_map(Arc::new(client), &args.source.map_settings())
        .await
        .context("failed to fetch earthquake feed")?;

    // Wait for plate boundaries so the document is complete
    let view = loaded.settle().await;
    let view = view.read().await;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_map(&mut writer, &view, args.format)?;
            writer.flush()?;
            tracing::info!("wrote map to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            output::write_map(&mut handle, &view, args.format)?;
        }
    }

    Ok(())
}

/// Execute the `serve` command - start web server.
async fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        feeds: args.source.feed_config(),
        map: args.source.map_settings(),
    };

    // Bind before announcing the URL; the feeds are fetched after this
    let listener = server::bind(&config).await?;
    let url = format!("http://{}", listener.local_addr()?);

    println!("\x1b[1m🌍 quakemap\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Feed:    {}", args.source.feed.as_str());
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    let client = HttpFeedClient::new(config.feeds).context("failed to create feed client")?;
    server::serve(listener, Arc::new(client), config.map).await
}
