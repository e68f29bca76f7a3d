/* 3rd party libraries */
use clap::{Arg, ArgMatches, Command};
use log::{info, warn};
use std::path::Path;
use std::thread::Builder;
use std::time::Duration;

/* Custom libraries */
use elevator_dispatch::config::{self, Config};
use elevator_dispatch::{unwrap_or_exit, ElevatorSystem, ProgressEvent};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn cli() -> Command<'static> {
    Command::new("elevator_dispatch")
        .about("Simulates a group of elevators serving ride requests")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .takes_value(true)
                .value_name("PATH")
                .help("TOML configuration file (defaults to ./config.toml if present)"),
        )
        .arg(
            Arg::new("elevators")
                .long("elevators")
                .takes_value(true)
                .help("Number of elevators"),
        )
        .arg(
            Arg::new("capacity")
                .long("capacity")
                .takes_value(true)
                .help("Queued requests each elevator accepts"),
        )
        .arg(
            Arg::new("min-floor")
                .long("min-floor")
                .takes_value(true)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("max-floor")
                .long("max-floor")
                .takes_value(true)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("travel-ms")
                .long("travel-ms")
                .takes_value(true)
                .help("Milliseconds to move one floor"),
        )
        .arg(
            Arg::new("ride")
                .long("ride")
                .short('r')
                .takes_value(true)
                .multiple_occurrences(true)
                .value_name("SRC:DEST")
                .help("Ride to request, may be repeated"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Log progress events and statuses as JSON"),
        )
}

fn parse_ride(ride: &str) -> Result<(i32, i32), String> {
    let (source, destination) = ride
        .split_once(':')
        .ok_or_else(|| format!("ride '{}' is not SRC:DEST", ride))?;
    let source = source
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("ride '{}': {}", ride, e))?;
    let destination = destination
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("ride '{}': {}", ride, e))?;
    Ok((source, destination))
}

fn parse_override<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match matches.value_of(name) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("--{} {}: {}", name, value, e)),
        None => Ok(None),
    }
}

fn load(matches: &ArgMatches) -> Result<Config, String> {
    let mut config = match matches.value_of("config") {
        Some(path) => config::load_config(path).map_err(|e| e.to_string())?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            config::load_config(DEFAULT_CONFIG_PATH).map_err(|e| e.to_string())?
        }
        None => Config::default(),
    };

    if let Some(n) = parse_override(matches, "elevators")? {
        config.system.n_elevators = n;
    }
    if let Some(capacity) = parse_override(matches, "capacity")? {
        config.system.capacity = capacity;
    }
    if let Some(floor) = parse_override(matches, "min-floor")? {
        config.system.min_floor = floor;
    }
    if let Some(floor) = parse_override(matches, "max-floor")? {
        config.system.max_floor = floor;
    }
    if let Some(millis) = parse_override(matches, "travel-ms")? {
        config.system.floor_travel_time = millis;
    }
    if let Some(rides) = matches.values_of("ride") {
        config.demo.rides = rides.map(parse_ride).collect::<Result<Vec<_>, _>>()?;
    }

    config.system.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn log_event(event: &ProgressEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => info!("{}", line),
            Err(e) => warn!("failed to serialize progress event: {}", e),
        }
    } else {
        info!(
            "elevator {} {:?} at floor {} ({:?}, request {})",
            event.elevator_id, event.kind, event.floor, event.direction, event.request_id
        );
    }
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    let json = matches.is_present("json");
    let config = unwrap_or_exit!(load(&matches));

    let mut system = unwrap_or_exit!(ElevatorSystem::new(config.system.clone()));

    // Progress observer, runs until every event sender is gone
    let events = system.events();
    let observer = unwrap_or_exit!(Builder::new()
        .name("progress_log".into())
        .spawn(move || {
            for event in events.iter() {
                log_event(&event, json);
            }
        }));

    unwrap_or_exit!(system.start());

    for (source, destination) in &config.demo.rides {
        match system.request_ride(*source, *destination) {
            Ok(id) => info!("ride {} -> {} served by elevator {}", source, destination, id),
            Err(e) => warn!("ride {} -> {} not accepted: {}", source, destination, e),
        }
    }

    // Every ride may cross the building twice
    let span = u64::from(config.system.max_floor.abs_diff(config.system.min_floor)) * 2;
    let timeout = Duration::from_millis(
        config
            .system
            .floor_travel_time
            .saturating_mul(span)
            .saturating_mul(config.demo.rides.len() as u64 + 1),
    )
    .saturating_add(Duration::from_secs(1));
    if !unwrap_or_exit!(system.wait_until_idle(timeout)) {
        warn!("rides still in progress after {:?}", timeout);
    }

    let unserved = system.stop();
    for request in &unserved {
        warn!(
            "request {} ({} -> {}) was not served",
            request.id, request.source, request.destination
        );
    }

    for status in unwrap_or_exit!(system.statuses()) {
        if json {
            match serde_json::to_string(&status) {
                Ok(line) => info!("{}", line),
                Err(e) => warn!("failed to serialize status: {}", e),
            }
        } else {
            info!(
                "elevator {}: floor {}, {:?}, {} queued",
                status.id, status.floor, status.direction, status.queue_length
            );
        }
    }

    drop(system);
    if observer.join().is_err() {
        warn!("progress observer panicked");
    }
}
