use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use zoneroute_cli::output::{
    render_connections, render_reachability, render_route, render_window, render_zones,
    OutputFormat,
};
use zoneroute_lib::{
    plan_route, reachable_zones, seed_from_json, zones_within, GraphSnapshot, RouteRequest,
    SqliteZoneStore, ZoneStore,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Zoneroute delivery network utilities")]
struct Cli {
    /// Path to the zone database.
    #[arg(long, env = "ZONEROUTE_DB_PATH", default_value = "data/zones.db", global = true)]
    db: PathBuf,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the zone database, optionally loading a JSON seed document.
    Init {
        /// Seed document with `zones` and `connections` arrays.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// List every zone in the network.
    Zones,
    /// List stored streets, optionally only those with a given traffic level.
    Connections {
        /// Traffic level to match, e.g. `heavy`. Case-insensitive.
        #[arg(long)]
        traffic: Option<String>,
    },
    /// Compute the fastest route between two zones.
    Route {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
    },
    /// Split zones into accessible and inaccessible from a source.
    Reach {
        #[arg(long = "from")]
        from: String,
    },
    /// List zones reachable in strictly less than a travel-time budget.
    Within {
        #[arg(long = "from")]
        from: String,
        /// Budget in minutes.
        #[arg(long)]
        budget: f64,
    },
    /// Mark a connection as closed.
    Close {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
    },
    /// Reopen a closed connection.
    Open {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
    },
    /// Change the travel time of a connection.
    SetTime {
        #[arg(long = "from")]
        from: String,
        #[arg(long = "to")]
        to: String,
        #[arg(long)]
        minutes: f64,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);
    debug!(db = %cli.db.display(), command = ?cli.command, "running command");

    match cli.command {
        Command::Init { seed } => handle_init(&cli.db, seed.as_deref(), format),
        Command::Zones => handle_zones(&cli.db, format),
        Command::Connections { traffic } => {
            handle_connections(&cli.db, traffic.as_deref(), format)
        }
        Command::Route { from, to } => handle_route(&cli.db, &from, &to, format),
        Command::Reach { from } => handle_reach(&cli.db, &from, format),
        Command::Within { from, budget } => handle_within(&cli.db, &from, budget, format),
        Command::Close { from, to } => handle_accessibility(&cli.db, &from, &to, false, format),
        Command::Open { from, to } => handle_accessibility(&cli.db, &from, &to, true, format),
        Command::SetTime { from, to, minutes } => {
            handle_set_time(&cli.db, &from, &to, minutes, format)
        }
    }
}

fn handle_init(db: &Path, seed: Option<&Path>, format: OutputFormat) -> Result<()> {
    let store = SqliteZoneStore::create(db)
        .with_context(|| format!("failed to create zone store at {}", db.display()))?;
    if let Some(seed) = seed {
        seed_from_json(&store, seed)
            .with_context(|| format!("failed to load seed document {}", seed.display()))?;
    }
    let zones = store.zone_count().context("failed to count zones")?;
    print_message(
        &format!("Zone store ready at {} ({} zones)", db.display(), zones),
        format,
    )
}

fn handle_zones(db: &Path, format: OutputFormat) -> Result<()> {
    let zones = open_store(db)?.list_zones().context("failed to list zones")?;
    println!("{}", render_zones(&zones, format)?);
    Ok(())
}

fn handle_connections(db: &Path, traffic: Option<&str>, format: OutputFormat) -> Result<()> {
    let store = open_store(db)?;
    let connections = match traffic {
        Some(level) => store
            .list_connections_by_traffic(level)
            .with_context(|| format!("failed to list connections with {} traffic", level))?,
        None => store
            .list_connections()
            .context("failed to list connections")?,
    };
    println!("{}", render_connections(&connections, format)?);
    Ok(())
}

fn handle_route(db: &Path, from: &str, to: &str, format: OutputFormat) -> Result<()> {
    let graph = load_snapshot(db)?;
    let plan = plan_route(&graph, &RouteRequest::new(from, to))
        .with_context(|| format!("no route from {} to {}", from, to))?;
    println!("{}", render_route(&plan, format)?);
    Ok(())
}

fn handle_reach(db: &Path, from: &str, format: OutputFormat) -> Result<()> {
    let graph = load_snapshot(db)?;
    let report = reachable_zones(&graph, from);
    println!("{}", render_reachability(&report, format)?);
    Ok(())
}

fn handle_within(db: &Path, from: &str, budget: f64, format: OutputFormat) -> Result<()> {
    let graph = load_snapshot(db)?;
    let plans = zones_within(&graph, from, budget)
        .with_context(|| format!("failed to list zones within {} min of {}", budget, from))?;
    println!("{}", render_window(from, budget, &plans, format)?);
    Ok(())
}

fn handle_accessibility(
    db: &Path,
    from: &str,
    to: &str,
    accessible: bool,
    format: OutputFormat,
) -> Result<()> {
    let (verb, done) = if accessible {
        ("open", "opened")
    } else {
        ("close", "closed")
    };
    open_store(db)?
        .set_connection_accessible(from, to, accessible)
        .with_context(|| format!("failed to {} connection {} -> {}", verb, from, to))?;
    print_message(&format!("Connection {} -> {} {}", from, to, done), format)
}

fn handle_set_time(
    db: &Path,
    from: &str,
    to: &str,
    minutes: f64,
    format: OutputFormat,
) -> Result<()> {
    open_store(db)?
        .update_travel_time(from, to, minutes)
        .with_context(|| format!("failed to update travel time {} -> {}", from, to))?;
    print_message(
        &format!("Travel time {} -> {} set to {} min", from, to, minutes),
        format,
    )
}

fn open_store(db: &Path) -> Result<SqliteZoneStore> {
    SqliteZoneStore::open(db).with_context(|| {
        format!(
            "failed to open zone store at {}; run `zoneroute-cli init` first",
            db.display()
        )
    })
}

fn load_snapshot(db: &Path) -> Result<GraphSnapshot> {
    open_store(db)?
        .fetch_snapshot()
        .context("failed to read the zone network")
}

fn print_message(message: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "message": message }))?
        ),
        OutputFormat::Text => println!("{}", message),
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
