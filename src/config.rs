use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub standings_mode: StandingsMode,
    pub season_files: Option<SeasonFiles>,
}

/// CSV files loaded into the season at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonFiles {
    pub events: String,
    pub candidates: String,
}

/// Which standings source reads are served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandingsMode {
    /// Fold scored commitments on every read.
    #[default]
    Live,
    /// Read the table maintained by result recording.
    Incremental,
}

impl fmt::Display for StandingsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandingsMode::Live => write!(f, "live"),
            StandingsMode::Incremental => write!(f, "incremental"),
        }
    }
}

impl FromStr for StandingsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(StandingsMode::Live),
            "incremental" => Ok(StandingsMode::Incremental),
            other => Err(format!("must be live or incremental, got {}", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let standings_mode = env_map
            .get("STANDINGS_MODE")
            .map(|s| s.as_str())
            .unwrap_or("live")
            .parse::<StandingsMode>()
            .map_err(|e| ConfigError::InvalidValue("STANDINGS_MODE".to_string(), e))?;

        let season_files = parse_season_files_from_map(&env_map)?;

        Ok(Config {
            port,
            database_path,
            standings_mode,
            season_files,
        })
    }
}

fn parse_season_files_from_map(
    env_map: &HashMap<String, String>,
) -> Result<Option<SeasonFiles>, ConfigError> {
    let non_empty = |key: &str| {
        env_map
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match (
        non_empty("SEASON_EVENTS_FILE"),
        non_empty("SEASON_CANDIDATES_FILE"),
    ) {
        (Some(events), Some(candidates)) => Ok(Some(SeasonFiles { events, candidates })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnv(
            "SEASON_CANDIDATES_FILE".to_string(),
        )),
        (None, Some(_)) => Err(ConfigError::MissingEnv("SEASON_EVENTS_FILE".to_string())),
    }
}
