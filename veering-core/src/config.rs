//! Configuration types
//!
//! Two pieces of configuration drive the pipeline:
//! - [`ZoneMap`]: which tag ids are installed on the left, right and center of the path,
//!   loaded once from a `tags.json` document
//! - [`CycleConfig`]: how many samples make up a decision cycle and how long the reader is
//!   given to settle
//!
//! Both are immutable once the orchestrator starts.

use crate::types::{ConfigError, Result, Zone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Key of the left-zone id array in `tags.json`
pub const LEFT_TAGS_KEY: &str = "left_tags";
/// Key of the right-zone id array in `tags.json`
pub const RIGHT_TAGS_KEY: &str = "right_tags";
/// Key of the center-zone id array in `tags.json`
pub const CENTER_TAGS_KEY: &str = "center_tags";

/// Tag id membership for the three concrete zones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneMap {
    pub left: HashSet<String>,
    pub right: HashSet<String>,
    pub center: HashSet<String>,
}

impl ZoneMap {
    /// Build a zone map from id lists
    pub fn new<L, R, C>(left: L, right: R, center: C) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            left: left.into_iter().map(Into::into).collect(),
            right: right.into_iter().map(Into::into).collect(),
            center: center.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a zone map from a `tags.json` file
    ///
    /// # Example
    /// ```no_run
    /// use veering_core::ZoneMap;
    /// use std::path::Path;
    ///
    /// let zones = ZoneMap::load(Path::new("tags.json")).unwrap();
    /// println!("{} tags configured", zones.len());
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading tag configuration: {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let zones = Self::from_json_str(&content)?;
        log::info!(
            "Tag configuration loaded: {} left, {} right, {} center",
            zones.left.len(),
            zones.right.len(),
            zones.center.len()
        );
        Ok(zones)
    }

    /// Parse a zone map from the JSON text of a `tags.json` document
    ///
    /// All three arrays are required. Non-string scalars are accepted and stringified.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)?;
        let object = document.as_object().ok_or_else(|| ConfigError::InvalidValue {
            key: "<root>",
            reason: "expected a JSON object".to_string(),
        })?;

        let read_ids = |key: &'static str| -> Result<HashSet<String>> {
            let entries = object
                .get(key)
                .ok_or(ConfigError::MissingKey(key))?
                .as_array()
                .ok_or_else(|| ConfigError::InvalidValue {
                    key,
                    reason: "expected an array of tag ids".to_string(),
                })?;

            entries
                .iter()
                .map(|entry| match entry {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    other => Err(ConfigError::InvalidValue {
                        key,
                        reason: format!("unsupported tag id {}", other),
                    }),
                })
                .collect()
        };

        Ok(Self {
            left: read_ids(LEFT_TAGS_KEY)?,
            right: read_ids(RIGHT_TAGS_KEY)?,
            center: read_ids(CENTER_TAGS_KEY)?,
        })
    }

    /// Ids configured in more than one zone, with every zone they appear in
    pub fn overlaps(&self) -> Vec<(String, Vec<Zone>)> {
        let mut all: Vec<&String> = self
            .left
            .iter()
            .chain(self.right.iter())
            .chain(self.center.iter())
            .collect();
        all.sort();
        all.dedup();

        all.into_iter()
            .filter_map(|id| {
                let zones: Vec<Zone> = [
                    (Zone::Left, &self.left),
                    (Zone::Right, &self.right),
                    (Zone::Center, &self.center),
                ]
                .into_iter()
                .filter(|(_, set)| set.contains(id))
                .map(|(zone, _)| zone)
                .collect();
                (zones.len() > 1).then(|| (id.clone(), zones))
            })
            .collect()
    }

    /// Total number of configured ids across all zones
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len() + self.center.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Minimum distinct-tag counts per zone
///
/// Reported alongside each decision. The decision itself only looks at presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountThresholds {
    #[serde(default = "default_threshold")]
    pub left: usize,
    #[serde(default = "default_threshold")]
    pub right: usize,
    #[serde(default = "default_threshold")]
    pub center: usize,
}

impl Default for CountThresholds {
    fn default() -> Self {
        Self {
            left: default_threshold(),
            right: default_threshold(),
            center: default_threshold(),
        }
    }
}

/// Settings for the sampling/deciding loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Sample iterations per decision cycle (default: 10)
    #[serde(default = "default_samples_per_cycle")]
    pub samples_per_cycle: usize,

    /// Delay between the inventory command and reading its response (default: 100ms)
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Delay inside the reader start-up handshake (default: 500ms)
    #[serde(default = "default_init_settle_delay")]
    pub init_settle_delay_ms: u64,

    /// Optional: stop after this many cycles
    #[serde(default)]
    pub max_cycles: Option<u64>,

    #[serde(default)]
    pub thresholds: CountThresholds,
}

fn default_samples_per_cycle() -> usize {
    10
}

fn default_settle_delay() -> u64 {
    100
}

fn default_init_settle_delay() -> u64 {
    500
}

fn duration_to_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

fn default_threshold() -> usize {
    5
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            samples_per_cycle: default_samples_per_cycle(),
            settle_delay_ms: default_settle_delay(),
            init_settle_delay_ms: default_init_settle_delay(),
            max_cycles: None,
            thresholds: CountThresholds::default(),
        }
    }
}

impl CycleConfig {
    /// Create a cycle configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set sample iterations per cycle
    pub fn with_samples_per_cycle(mut self, samples: usize) -> Self {
        self.samples_per_cycle = samples;
        self
    }

    /// Builder method: set the per-iteration settle delay
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = duration_to_millis(delay);
        self
    }

    /// Builder method: set the handshake settle delay
    pub fn with_init_settle_delay(mut self, delay: Duration) -> Self {
        self.init_settle_delay_ms = duration_to_millis(delay);
        self
    }

    /// Builder method: bound the number of cycles
    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Builder method: set count thresholds
    pub fn with_thresholds(mut self, thresholds: CountThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn init_settle_delay(&self) -> Duration {
        Duration::from_millis(self.init_settle_delay_ms)
    }

    /// Reject settings the orchestrator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.samples_per_cycle == 0 {
            return Err(ConfigError::InvalidValue {
                key: "samples_per_cycle",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_cycles == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "max_cycles",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TAGS_JSON: &str = r#"{
        "left_tags": ["-aa-01", "-aa-02"],
        "right_tags": ["-bb-01"],
        "center_tags": ["-cc-01", 42]
    }"#;

    #[test]
    fn test_zone_map_from_json() {
        let zones = ZoneMap::from_json_str(TAGS_JSON).unwrap();
        assert_eq!(zones.left.len(), 2);
        assert!(zones.right.contains("-bb-01"));
        assert!(zones.center.contains("42"));
        assert_eq!(zones.len(), 5);
    }

    #[test]
    fn test_missing_key_is_reported() {
        let err = ZoneMap::from_json_str(r#"{"left_tags": [], "right_tags": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(CENTER_TAGS_KEY)));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            ZoneMap::from_json_str("{ not json"),
            Err(ConfigError::Malformed(_))
        ));
        assert!(matches!(
            ZoneMap::from_json_str("[1, 2]"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ZoneMap::from_json_str(r#"{"left_tags": "x", "right_tags": [], "center_tags": []}"#),
            Err(ConfigError::InvalidValue { key: LEFT_TAGS_KEY, .. })
        ));
        assert!(matches!(
            ZoneMap::from_json_str(r#"{"left_tags": [{}], "right_tags": [], "center_tags": []}"#),
            Err(ConfigError::InvalidValue { key: LEFT_TAGS_KEY, .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TAGS_JSON.as_bytes()).unwrap();

        let zones = ZoneMap::load(file.path()).unwrap();
        assert!(zones.left.contains("-aa-01"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        assert!(matches!(ZoneMap::load(&path), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ZoneMap::load(dir.path()),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overlaps() {
        let zones = ZoneMap::new(["-01", "-02"], ["-02"], ["-03"]);
        let overlaps = zones.overlaps();
        assert_eq!(overlaps, vec![("-02".to_string(), vec![Zone::Left, Zone::Right])]);
    }

    #[test]
    fn test_cycle_config_defaults_and_builder() {
        let config = CycleConfig::new();
        assert_eq!(config.samples_per_cycle, 10);
        assert_eq!(config.settle_delay(), Duration::from_millis(100));
        assert_eq!(config.init_settle_delay(), Duration::from_millis(500));
        assert_eq!(config.thresholds.left, 5);
        assert!(config.validate().is_ok());

        let config = CycleConfig::new()
            .with_samples_per_cycle(3)
            .with_settle_delay(Duration::from_millis(20))
            .with_max_cycles(2);
        assert_eq!(config.samples_per_cycle, 3);
        assert_eq!(config.settle_delay_ms, 20);
        assert_eq!(config.max_cycles, Some(2));
    }

    #[test]
    fn test_oversized_delay_saturates() {
        let config = CycleConfig::new().with_init_settle_delay(Duration::MAX);
        assert_eq!(config.init_settle_delay_ms, u64::MAX);
    }

    #[test]
    fn test_cycle_config_validation() {
        assert!(CycleConfig::new().with_samples_per_cycle(0).validate().is_err());
        assert!(CycleConfig::new().with_max_cycles(0).validate().is_err());
    }

    #[test]
    fn test_cycle_config_deserialize_partial() {
        let config: CycleConfig = serde_json::from_str(r#"{"samples_per_cycle": 4}"#).unwrap();
        assert_eq!(config.samples_per_cycle, 4);
        assert_eq!(config.settle_delay_ms, 100);
        assert_eq!(config.thresholds, CountThresholds::default());
    }
}
