use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use birdlg::{BgpMap, BgpMapQuery, Config};

#[derive(Parser)]
#[command(name = "birdlg")]
#[command(about = "Draw the AS paths BIRD backends see towards a target", long_about = None)]
struct Cli {
    /// Config file (defaults to ./bird-lg.toml, then the user and system config dirs).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backends to query, comma separated. Defaults to every configured server.
    #[arg(short, long, value_delimiter = ',')]
    servers: Vec<String>,

    /// Treat the target as a prefix filter (`show route where net ~ [ ... ]`).
    #[arg(long = "where")]
    route_where: bool,

    /// Print the digraph base64 encoded.
    #[arg(long)]
    base64: bool,

    /// IP address, prefix or filter expression to look up.
    target: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::discover()?,
    };

    let servers = if cli.servers.is_empty() {
        config.backends()?.into_iter().map(|backend| backend.host).collect()
    } else {
        cli.servers.clone()
    };
    if servers.is_empty() {
        return Err("no servers configured or given with --servers".into());
    }

    let query = if cli.route_where {
        BgpMapQuery::RouteWhere
    } else {
        BgpMapQuery::RouteFor
    };

    let bgpmap = BgpMap::from_config(&config)?;
    let output = if cli.base64 {
        bgpmap.render_base64(&servers, &cli.target, query) + "\n"
    } else {
        bgpmap.render(&servers, &cli.target, query)
    };
    print!("{}", output);

    Ok(())
}
