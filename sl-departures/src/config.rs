//! Application configuration.
//!
//! The configuration is a single JSON document, loaded once at start-up
//! and immutable afterwards. Field names follow the display module's
//! configuration (`apikey`, `SSL`, `updateInterval`, ...).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{ClockTime, DayClass, Direction, LineId};

/// Poll interval when none is configured: five minutes.
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Environment variable that overrides `apikey`.
pub const API_KEY_ENV: &str = "SL_API_KEY";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON of the expected shape
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// No `stations` entry at all
    #[error("config.stations is not defined")]
    StationsNotDefined,

    /// A station's `lines` is present but is not a list of line rules
    #[error("station id={station_id} lines is defined but not as array")]
    LinesNotAList { station_id: String },

    /// `highUpdateInterval.times` is present but is not a list of rules
    #[error("highUpdateInterval.times is not an array")]
    TimesNotAList,

    /// A poll interval of zero milliseconds
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: String },

    /// One element of a rule list could not be read as a rule
    #[error("{field}[{index}] is not a valid rule: {reason}")]
    InvalidRule {
        field: String,
        index: usize,
        reason: String,
    },
}

/// A configuration value that must be a list of rules.
///
/// A value that is not a list is kept so the mistake can be reported where
/// the rules are used. A list with an unreadable element is rejected when
/// the configuration is loaded.
#[derive(Debug, Clone)]
pub enum RuleList<T> {
    List(Vec<T>),
    /// The element at `index` is not a rule.
    BadRule { index: usize, reason: String },
    NotAList(Value),
}

/// Why a [`RuleList`] has no usable rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleListError {
    NotAList,
    BadRule { index: usize, reason: String },
}

impl<T> RuleList<T> {
    /// The rules, or `None` if there is no usable list.
    pub fn as_slice(&self) -> Option<&[T]> {
        self.rules().ok()
    }

    pub fn rules(&self) -> Result<&[T], RuleListError> {
        match self {
            RuleList::List(rules) => Ok(rules),
            RuleList::BadRule { index, reason } => Err(RuleListError::BadRule {
                index: *index,
                reason: reason.clone(),
            }),
            RuleList::NotAList(_) => Err(RuleListError::NotAList),
        }
    }
}

impl RuleListError {
    /// The configuration error for the list at `field`; `not_a_list` is
    /// used when the value was not a list at all.
    pub fn into_config_error(self, field: impl Into<String>, not_a_list: ConfigError) -> ConfigError {
        match self {
            RuleListError::NotAList => not_a_list,
            RuleListError::BadRule { index, reason } => ConfigError::InvalidRule {
                field: field.into(),
                index,
                reason,
            },
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for RuleList<T> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let items = match Value::deserialize(d)? {
            Value::Array(items) => items,
            other => return Ok(RuleList::NotAList(other)),
        };

        let mut rules = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value(item) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    return Ok(RuleList::BadRule {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(RuleList::List(rules))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub apikey: String,

    /// Use https for upstream requests.
    #[serde(rename = "SSL", default)]
    pub ssl: bool,

    /// Proxy URL for all upstream requests.
    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default)]
    pub stations: Option<Vec<StationConfig>>,

    /// Only keep departures in this direction, at every station.
    #[serde(default, deserialize_with = "deserialize_direction")]
    pub direction: Option<Direction>,

    /// Flat poll interval in milliseconds.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    #[serde(default)]
    pub high_update_interval: Option<HighUpdateInterval>,

    /// Verbose logging for this crate.
    #[serde(default)]
    pub debug: bool,
}

/// One station to poll.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationConfig {
    #[serde(deserialize_with = "deserialize_station_id")]
    pub station_id: String,

    #[serde(default)]
    pub station_name: Option<String>,

    /// Category query parameters to disable, e.g. `buses`.
    #[serde(default)]
    pub exclude_transport_types: Vec<String>,

    /// Absent means every line in every direction.
    #[serde(default)]
    pub lines: Option<RuleList<LineRule>>,
}

/// Per-line selection and direction fix-up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRule {
    pub line: LineId,

    #[serde(default, deserialize_with = "deserialize_direction")]
    pub direction: Option<Direction>,

    /// Exchange directions 1 and 2 for this line.
    #[serde(default)]
    pub swap_dir: bool,
}

/// Time windows with their own poll interval.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighUpdateInterval {
    /// Interval for windows that don't set their own, in milliseconds.
    #[serde(default)]
    pub update_interval: Option<u64>,

    #[serde(default)]
    pub times: Option<RuleList<UpdateIntervalRule>>,
}

/// A day class and time-of-day window.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIntervalRule {
    pub days: DayClass,
    pub start: ClockTime,
    pub stop: ClockTime,

    /// Overrides the shared high interval, in milliseconds.
    #[serde(default)]
    pub update_interval: Option<u64>,
}

impl Config {
    /// Parse a configuration document.
    ///
    /// Rule lists containing an element that is not a rule, and zero poll
    /// intervals, are rejected here. Values that are not lists at all are
    /// reported where they are used.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        nonzero(Some(self.update_interval), "updateInterval")?;
        for station in self.stations.iter().flatten() {
            if let Some(lines) = &station.lines
                && let Err(e @ RuleListError::BadRule { .. }) = lines.rules()
            {
                return Err(e.into_config_error(
                    format!("station id={} lines", station.station_id),
                    ConfigError::LinesNotAList {
                        station_id: station.station_id.clone(),
                    },
                ));
            }
        }

        if let Some(times) = self
            .high_update_interval
            .as_ref()
            .and_then(|high| high.times.as_ref())
            && let Err(e @ RuleListError::BadRule { .. }) = times.rules()
        {
            return Err(e.into_config_error("highUpdateInterval.times", ConfigError::TimesNotAList));
        }

        if let Some(high) = &self.high_update_interval {
            nonzero(high.update_interval, "highUpdateInterval.updateInterval")?;
            let rules = high.times.as_ref().and_then(|t| t.as_slice()).unwrap_or_default();
            for (index, rule) in rules.iter().enumerate() {
                nonzero(
                    rule.update_interval,
                    &format!("highUpdateInterval.times[{index}].updateInterval"),
                )?;
            }
        }

        Ok(())
    }

    /// Replace the API key if `SL_API_KEY` is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            self.apikey = key;
        }
        self
    }

    /// Configured stations, in configuration order.
    pub fn stations(&self) -> Result<&[StationConfig], ConfigError> {
        self.stations
            .as_deref()
            .ok_or(ConfigError::StationsNotDefined)
    }

    /// The flat poll interval.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval)
    }
}

impl StationConfig {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            station_name: None,
            exclude_transport_types: Vec::new(),
            lines: None,
        }
    }

    pub fn with_lines(mut self, lines: Vec<LineRule>) -> Self {
        self.lines = Some(RuleList::List(lines));
        self
    }
}

impl LineRule {
    pub fn new(line: impl Into<LineId>) -> Self {
        Self {
            line: line.into(),
            direction: None,
            swap_dir: false,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn swapped(mut self) -> Self {
        self.swap_dir = true;
        self
    }
}

fn nonzero(interval: Option<u64>, field: &str) -> Result<(), ConfigError> {
    if interval == Some(0) {
        return Err(ConfigError::ZeroInterval {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL_MS
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

/// Station ids are opaque; accept them written as numbers too.
fn deserialize_station_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match NumberOrText::deserialize(d)? {
        NumberOrText::Number(n) => Ok(n.to_string()),
        NumberOrText::Text(s) => Ok(s),
    }
}

/// An empty string means "no direction filter".
fn deserialize_direction<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Direction>, D::Error> {
    match Option::<NumberOrText>::deserialize(d)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(Direction::new(n))),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse()
            .map(|n| Some(Direction::new(n)))
            .map_err(|_| de::Error::custom(format!("invalid direction {s:?}"))),
    }
}
