use anyhow::{Context, Result};
use clap::Parser;
use fms_cli::{report, Config};
use fms_core::{
    format_icao, resolve_waypoint, FlightPlan, InMemoryFacilities, SegmentType, TimeoutLoader,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build a flight plan from a facility database and print it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Origin airport (ident or full 12 character ICAO)
    #[arg(long)]
    origin: String,

    /// Destination airport (ident or full 12 character ICAO)
    #[arg(long)]
    destination: String,

    /// Enroute fixes by full ICAO, in order
    #[arg(long)]
    via: Vec<String>,

    /// Departure index in the origin's catalog
    #[arg(long)]
    departure: Option<usize>,

    #[arg(long)]
    departure_runway: Option<usize>,

    #[arg(long)]
    departure_transition: Option<usize>,

    /// Arrival index in the destination's catalog
    #[arg(long)]
    arrival: Option<usize>,

    #[arg(long)]
    arrival_transition: Option<usize>,

    #[arg(long)]
    arrival_runway: Option<usize>,

    /// Approach index in the destination's catalog
    #[arg(long)]
    approach: Option<usize>,

    #[arg(long)]
    approach_transition: Option<usize>,

    /// Facility database JSON (overrides FMS_FACILITIES)
    #[arg(long)]
    facilities: Option<PathBuf>,

    /// Facility lookup timeout (overrides FMS_LOOKUP_TIMEOUT_MS)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the sanitized plan as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// Bare airport idents are expanded to the airport ICAO layout.
fn airport_icao(input: &str) -> String {
    if input.len() == 12 {
        input.to_string()
    } else {
        format_icao('A', "", "", &input.to_uppercase())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("fms_core=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.lookup_timeout());
    let path = args.facilities.unwrap_or(config.facilities_path);

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("reading facility database {}", path.display()))?;
    let facilities = InMemoryFacilities::from_json(&json)
        .with_context(|| format!("parsing facility database {}", path.display()))?;
    tracing::info!(facilities = facilities.len(), path = %path.display(), "facility database loaded");
    let loader = TimeoutLoader::new(facilities, timeout);

    let mut plan = FlightPlan::new();
    plan.cruise_altitude = config.cruise_altitude_ft;

    plan.set_origin_by_icao(&loader, &airport_icao(&args.origin))
        .await
        .context("setting origin")?;
    plan.set_destination_by_icao(&loader, &airport_icao(&args.destination))
        .await
        .context("setting destination")?;

    for icao in &args.via {
        let waypoint = resolve_waypoint(&loader, icao)
            .await
            .with_context(|| format!("resolving enroute fix {icao:?}"))?;
        let at = plan.arrival_start();
        plan.add_waypoint_to_segment(SegmentType::Enroute, waypoint, at);
    }

    plan.update_procedure_details(|d| {
        d.departure_index = args.departure;
        d.departure_runway_index = args.departure_runway;
        d.departure_transition_index = args.departure_transition;
        d.arrival_index = args.arrival;
        d.arrival_transition_index = args.arrival_transition;
        d.arrival_runway_index = args.arrival_runway;
        d.approach_index = args.approach;
        d.approach_transition_index = args.approach_transition;
    });

    if args.departure.is_some() {
        plan.build_departure(&loader).await.context("building departure")?;
    }
    if args.arrival.is_some() {
        plan.build_arrival(&loader).await.context("building arrival")?;
    }
    if args.approach.is_some() {
        plan.build_approach(&loader).await.context("building approach")?;
    }

    if args.json {
        println!("{}", report::render_json(&plan)?);
    } else {
        print!("{}", report::render_table(&plan));
    }
    Ok(())
}
