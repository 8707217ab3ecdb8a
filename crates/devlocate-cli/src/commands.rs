//! Subcommand handlers.
//!
//! `main.rs` parses arguments and dispatches here. Each handler writes its
//! result to the supplied writer and reports failures through `anyhow`.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use devlocate_lib::{
    nearby_users, Coordinate, OsrmClient, OsrmConfig, UserStore, DEFAULT_OSRM_BASE_URL,
};

use crate::output::{render_nearby, render_route, render_users, OutputFormat};
use crate::terminal::ColorPalette;

/// Arguments for `nearby`.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub k: i64,
}

/// Arguments for `route`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteArgs {
    pub from: Coordinate,
    pub to: Coordinate,
    pub osrm_url: Option<String>,
    pub timeout: Option<Duration>,
}

/// Load the built-in users, or the JSON dataset at `path`.
pub fn load_users(path: Option<&Path>) -> Result<UserStore> {
    match path {
        Some(path) => UserStore::from_json_path(path)
            .with_context(|| format!("failed to load users from {}", path.display())),
        None => Ok(UserStore::builtin()),
    }
}

/// Rank users around a location and print the closest `k`.
pub fn handle_nearby<W: Write>(
    out: &mut W,
    store: &UserStore,
    args: &NearbyArgs,
    format: OutputFormat,
    palette: ColorPalette,
) -> Result<()> {
    let query = Coordinate::new(args.latitude, args.longitude);
    let nearby = nearby_users(store, query, args.k)?;
    tracing::debug!(count = nearby.count, "nearby users found");
    render_nearby(out, &nearby, format, palette).context("failed to write output")
}

/// Fetch a driving route and print it.
pub async fn handle_route<W: Write>(
    out: &mut W,
    args: &RouteArgs,
    format: OutputFormat,
    palette: ColorPalette,
) -> Result<()> {
    let mut config = OsrmConfig::default()
        .with_base_url(args.osrm_url.as_deref().unwrap_or(DEFAULT_OSRM_BASE_URL));
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }

    let client = OsrmClient::new(config)?;
    let route = client.get_route(args.from, args.to).await?;
    render_route(out, &route, format, palette).context("failed to write output")
}

/// Print every loaded user.
pub fn handle_users<W: Write>(
    out: &mut W,
    store: &UserStore,
    format: OutputFormat,
    palette: ColorPalette,
) -> Result<()> {
    render_users(out, store.all(), format, palette).context("failed to write output")
}
