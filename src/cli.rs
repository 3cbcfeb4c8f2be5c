//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::client::{FeedConfig, FeedType, PLATE_BOUNDARIES_URL, USGS_BASE_URL};
use crate::map::MapSettings;
use crate::output::Format;

/// Interactive earthquake and plate-boundary maps from live USGS data.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch both feeds and write the map once
    Render(RenderArgs),

    /// Fetch both feeds and serve the map over HTTP
    Serve(ServeArgs),
}

/// Data source and credential options shared by all commands.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// USGS summary feed to map
    #[arg(long, default_value = "all_week", value_parser = parse_feed_type)]
    pub feed: FeedType,

    /// USGS base URL
    #[arg(long, default_value = USGS_BASE_URL)]
    pub usgs_url: String,

    /// Plate boundary GeoJSON URL
    #[arg(long, default_value = PLATE_BOUNDARIES_URL)]
    pub plate_url: String,

    /// Mapbox access token for the base map tiles
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    pub mapbox_token: Option<String>,
}

impl SourceArgs {
    /// Feed locations.
    #[must_use]
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            feed_type: self.feed,
            base_url: self.usgs_url.clone(),
            plate_url: self.plate_url.clone(),
        }
    }

    /// Map settings. A missing token is passed on as empty.
    #[must_use]
    pub fn map_settings(&self) -> MapSettings {
        if self.mapbox_token.is_none() {
            tracing::warn!("no Mapbox access token set, base map tiles will not load");
        }
        MapSettings {
            access_token: self.mapbox_token.clone().unwrap_or_default(),
        }
    }
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "html", value_parser = parse_format)]
    pub format: Format,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse a feed type from string.
fn parse_feed_type(s: &str) -> Result<FeedType, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}
