use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use devlocate_cli::commands::{
    handle_nearby, handle_route, handle_users, load_users, NearbyArgs, RouteArgs,
};
use devlocate_cli::output::OutputFormat;
use devlocate_cli::terminal::ColorPalette;
use devlocate_lib::{Coordinate, DEFAULT_K};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find nearby users and driving routes")]
struct Cli {
    /// JSON user dataset to use instead of the built-in users.
    #[arg(long, global = true)]
    users: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the users closest to a location.
    Nearby {
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Number of users to return.
        #[arg(short, default_value_t = DEFAULT_K, allow_negative_numbers = true)]
        k: i64,
    },
    /// Fetch a driving route from an OSRM server.
    Route {
        #[arg(long, allow_negative_numbers = true)]
        from_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        from_lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        to_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        to_lon: f64,
        /// OSRM route API base URL.
        #[arg(long, env = "OSRM_BASE_URL")]
        osrm_url: Option<String>,
        /// Upstream timeout in seconds.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
    },
    /// List every loaded user.
    Users,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let palette = ColorPalette::detect();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Nearby { lat, lon, k } => {
            let store = load_users(cli.users.as_deref())?;
            let args = NearbyArgs {
                latitude: lat,
                longitude: lon,
                k,
            };
            handle_nearby(&mut stdout, &store, &args, cli.format, palette)
        }
        Command::Route {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
            osrm_url,
            timeout_secs,
        } => {
            let args = RouteArgs {
                from: Coordinate::new(from_lat, from_lon),
                to: Coordinate::new(to_lat, to_lon),
                osrm_url,
                timeout: timeout_secs.map(Duration::from_secs),
            };
            handle_route(&mut stdout, &args, cli.format, palette).await
        }
        Command::Users => {
            let store = load_users(cli.users.as_deref())?;
            handle_users(&mut stdout, &store, cli.format, palette)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
