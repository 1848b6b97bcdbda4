//! Route Navigator CLI
//!
//! Headless driver for the bus route lookup: list locations, search buses,
//! list stops near a point, and render a selected bus as a GeoJSON scene.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use application::services::{
    GeolocationProvider, MapLifecycleManager, NavigatorService, NavigatorSession,
    NearbyStopService,
};
use clap::{Parser, Subcommand};
use domain::{BusDirectory, GeoLocation, MatchMode, RouteId};
use infrastructure::{
    AppConfig, FixedLocationAdapter, GeoJsonMapAdapter, OverpassStopAdapter, init_telemetry,
};
use tracing::{info, warn};

/// Route Navigator CLI
#[derive(Parser)]
#[command(name = "route-navigator")]
#[command(author, version, about = "Bus route lookup and map rendering", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./route-navigator.toml if present)
    #[arg(short, long, env = "ROUTE_NAVIGATOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every origin and destination in the bus directory
    Locations,

    /// Find buses between two locations
    Search {
        /// Origin location
        #[arg(short, long)]
        from: String,

        /// Destination location
        #[arg(short, long)]
        to: String,

        /// Match names as case-insensitive substrings instead of exactly
        #[arg(long)]
        fuzzy: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List bus stops near a coordinate
    Stops {
        /// Latitude of the search centre
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude of the search centre
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the map scene for a bus as GeoJSON
    ///
    /// Example: route-navigator map --bus 1 --lat 9.95 --lon 76.28
    Map {
        /// ID of the bus to select
        #[arg(short, long)]
        bus: u32,

        /// Latitude of the user (uses the configured position if omitted)
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the user
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Draw only the route, without looking up nearby stops
        #[arg(long)]
        no_stops: bool,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Load and validate configuration
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load config")?,
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    Ok(config)
}

/// Parse a user-supplied coordinate pair
fn parse_location(lat: f64, lon: f64) -> anyhow::Result<GeoLocation> {
    GeoLocation::new(lat, lon).map_err(|e| anyhow::anyhow!("{e}"))
}

/// Format a stop as one listing line
fn stop_line(stop: &domain::BusStop, from: &GeoLocation) -> String {
    format!(
        "🚏 {} ({:.2} km) · {}",
        stop.name,
        stop.distance_km_from(from),
        stop.routes_label()
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let telemetry = if cli.verbose > 0 {
        config
            .telemetry
            .clone()
            .with_filter(log_filter_from_verbosity(cli.verbose))
    } else {
        config.telemetry.clone()
    };
    init_telemetry(&telemetry)?;

    let directory = Arc::new(BusDirectory::sample());

    match cli.command {
        Commands::Locations => {
            for location in directory.locations() {
                println!("{location}");
            }
        },

        Commands::Search {
            from,
            to,
            fuzzy,
            json,
        } => {
            let mode = if fuzzy {
                MatchMode::CaseInsensitiveSubstring
            } else {
                config.directory.match_mode
            };
            let mut session = NavigatorSession::new(directory, mode);
            session.set_origin(from);
            session.set_destination(to);
            let results = session.search()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No buses found for this route.");
            } else {
                for route in results {
                    println!("[{}] {}", route.id, route.format_summary());
                }
            }
        },

        Commands::Stops { lat, lon, json } => {
            let center = parse_location(lat, lon)?;
            let service =
                NearbyStopService::new(Arc::new(OverpassStopAdapter::from_config(&config.overpass)?));
            let outcome = service.fetch(&center).await;

            if let Some(error) = &outcome.error {
                warn!("{error}");
            }
            if outcome.capped {
                warn!("{}", application::services::TOO_MANY_STOPS);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.stops)?);
            } else {
                println!("Nearby Bus Stops ({})", outcome.stops.len());
                for stop in &outcome.stops {
                    println!("{}", stop_line(stop, &center));
                }
            }
        },

        Commands::Map {
            bus,
            lat,
            lon,
            no_stops,
        } => {
            let fixed = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(parse_location(lat, lon)?),
                _ => config
                    .geolocation
                    .fixed_position()
                    .map_err(anyhow::Error::msg)?,
            };
            let fallback = config
                .geolocation
                .fallback_location()
                .map_err(anyhow::Error::msg)?;

            let location = GeolocationProvider::start(
                Arc::new(FixedLocationAdapter::new(fixed)),
                config.geolocation.watch_options(),
                fallback,
            );
            let stops =
                NearbyStopService::new(Arc::new(OverpassStopAdapter::from_config(&config.overpass)?));
            let map = MapLifecycleManager::new(
                GeoJsonMapAdapter::new([config.map.container_id.clone()]),
                config.map.clone(),
                config.route.interpolator(),
            );
            let session = NavigatorSession::new(directory, config.directory.match_mode);
            let mut navigator = NavigatorService::new(session, location, stops, map);

            if fixed.is_some() {
                navigator.next_location_update().await;
            }
            navigator.render();

            let id = RouteId::new(bus);
            if no_stops {
                navigator.begin_selection(id)?;
            } else {
                navigator.select(id).await?;
            }

            for advisory in navigator.session().advisories() {
                warn!(kind = ?advisory.kind, "{advisory}");
            }
            info!(
                stops = navigator.map().stop_marker_count(),
                phase = ?navigator.map().phase(),
                "Scene rendered"
            );

            println!("{}", navigator.map().port().to_geojson_string()?);
            navigator.shutdown();
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn log_filter_verbosity_zero() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
    }

    #[test]
    fn log_filter_verbosity_one() {
        assert_eq!(log_filter_from_verbosity(1), "info");
    }

    #[test]
    fn log_filter_verbosity_two() {
        assert_eq!(log_filter_from_verbosity(2), "debug");
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), "trace");
        assert_eq!(log_filter_from_verbosity(10), "trace");
    }

    #[test]
    fn parses_locations() {
        let cli = parse(&["route-navigator", "locations"]).unwrap();
        assert!(matches!(cli.command, Commands::Locations));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_search() {
        let cli = parse(&[
            "route-navigator",
            "-vv",
            "search",
            "--from",
            "Ernakulam",
            "--to",
            "Kozhikode",
            "--fuzzy",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search {
                from,
                to,
                fuzzy,
                json,
            } => {
                assert_eq!(from, "Ernakulam");
                assert_eq!(to, "Kozhikode");
                assert!(fuzzy);
                assert!(!json);
            },
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn search_requires_both_locations() {
        assert!(parse(&["route-navigator", "search", "--from", "Ernakulam"]).is_err());
    }

    #[test]
    fn parses_stops_with_negative_coordinates() {
        let cli = parse(&["route-navigator", "stops", "--lat", "-33.86", "--lon", "151.2"]).unwrap();
        match cli.command {
            Commands::Stops { lat, lon, .. } => {
                assert!((lat + 33.86).abs() < f64::EPSILON);
                assert!((lon - 151.2).abs() < f64::EPSILON);
            },
            _ => panic!("expected stops command"),
        }
    }

    #[test]
    fn parses_map_with_position() {
        let cli = parse(&[
            "route-navigator",
            "map",
            "--bus",
            "3",
            "--lat",
            "9.95",
            "--lon",
            "76.28",
        ])
        .unwrap();
        match cli.command {
            Commands::Map {
                bus,
                lat,
                lon,
                no_stops,
            } => {
                assert_eq!(bus, 3);
                assert_eq!(lat, Some(9.95));
                assert_eq!(lon, Some(76.28));
                assert!(!no_stops);
            },
            _ => panic!("expected map command"),
        }
    }

    #[test]
    fn map_latitude_requires_longitude() {
        assert!(parse(&["route-navigator", "map", "--bus", "1", "--lat", "9.95"]).is_err());
    }

    #[test]
    fn map_without_position_uses_config() {
        let cli = parse(&["route-navigator", "map", "--bus", "1", "--no-stops"]).unwrap();
        match cli.command {
            Commands::Map {
                lat, lon, no_stops, ..
            } => {
                assert!(lat.is_none());
                assert!(lon.is_none());
                assert!(no_stops);
            },
            _ => panic!("expected map command"),
        }
    }

    #[test]
    fn config_path_is_global() {
        let cli = parse(&["route-navigator", "--config", "nav.toml", "locations"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("nav.toml")));
    }

    #[test]
    fn parse_location_rejects_out_of_range() {
        assert!(parse_location(91.0, 0.0).is_err());
        assert_eq!(parse_location(9.9312, 76.2673).unwrap(), GeoLocation::kochi());
    }

    #[test]
    fn stop_line_shows_distance_and_routes() {
        let stop = domain::BusStop::new("1", "Kaloor", GeoLocation::kochi())
            .with_routes(vec!["12".to_string()]);
        let line = stop_line(&stop, &GeoLocation::kochi());
        assert_eq!(line, "🚏 Kaloor (0.00 km) · Routes: 12");
    }
}
