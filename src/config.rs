/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

/**
 * Static layout of the simulated building and its cars.
 *
 * `floor_travel_time` is given in milliseconds and is the simulated time it takes
 * a car to move one floor. `event_buffer` bounds the progress events held for an
 * observer; events published while it is full are dropped.
 */
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SystemConfig {
    pub n_elevators: usize,
    pub capacity: usize,
    pub min_floor: i32,
    pub max_floor: i32,
    pub start_floor: i32,
    pub floor_travel_time: u64,
    pub event_buffer: usize,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    pub rides: Vec<(i32, i32)>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

/***************************************/
/*             Public API              */
/***************************************/
impl Default for SystemConfig {
    fn default() -> SystemConfig {
        SystemConfig {
            n_elevators: 5,
            capacity: 5,
            min_floor: 0,
            max_floor: 10,
            start_floor: 0,
            floor_travel_time: 1000,
            event_buffer: 1024,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> DemoConfig {
        DemoConfig {
            rides: vec![(5, 10), (2, 8), (4, 2)],
        }
    }
}

impl SystemConfig {
    pub fn travel_time(&self) -> Duration {
        Duration::from_millis(self.floor_travel_time)
    }

    /// Checks the invariants the rest of the system relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".into()));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::Invalid("event_buffer must be at least 1".into()));
        }
        if self.min_floor > self.max_floor {
            return Err(ConfigError::Invalid(format!(
                "min_floor {} is above max_floor {}",
                self.min_floor, self.max_floor
            )));
        }
        if !(self.min_floor..=self.max_floor).contains(&self.start_floor) {
            return Err(ConfigError::Invalid(format!(
                "start_floor {} is outside [{}, {}]",
                self.start_floor, self.min_floor, self.max_floor
            )));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str).map_err(ConfigError::Parse)?;
    config.system.validate()?;
    Ok(config)
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read configuration file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse configuration file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        // Arrange, Act
        let config = parse_config("").unwrap();

        // Assert
        assert_eq!(config.system, SystemConfig::default());
        assert_eq!(config.demo.rides, vec![(5, 10), (2, 8), (4, 2)]);
        assert_eq!(config.system.travel_time(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_system_table_overrides() {
        // Arrange
        let toml_str = "[system]\nn_elevators = 2\nmax_floor = 20\nfloor_travel_time = 5\n\n[demo]\nrides = [[1, 3]]\n";

        // Act
        let config = parse_config(toml_str).unwrap();

        // Assert
        assert_eq!(config.system.n_elevators, 2);
        assert_eq!(config.system.max_floor, 20);
        assert_eq!(config.system.capacity, 5);
        assert_eq!(config.system.travel_time(), Duration::from_millis(5));
        assert_eq!(config.demo.rides, vec![(1, 3)]);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let zero_capacity = SystemConfig {
            capacity: 0,
            ..SystemConfig::default()
        };
        let inverted = SystemConfig {
            min_floor: 4,
            max_floor: 2,
            start_floor: 3,
            ..SystemConfig::default()
        };
        let bad_start = SystemConfig {
            start_floor: 11,
            ..SystemConfig::default()
        };
        let no_event_buffer = SystemConfig {
            event_buffer: 0,
            ..SystemConfig::default()
        };

        assert!(matches!(zero_capacity.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(inverted.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(bad_start.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(no_event_buffer.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(
            parse_config("[system]\ncapacity = \"five\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
