//! CLI configuration from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub facilities_path: PathBuf,
    pub lookup_timeout_ms: u64,
    pub cruise_altitude_ft: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            facilities_path: var("FMS_FACILITIES")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("facilities.json")),
            lookup_timeout_ms: var("FMS_LOOKUP_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10_000),
            cruise_altitude_ft: var("FMS_CRUISE_ALTITUDE_FT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.0),
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_with(&[]);
        assert_eq!(config.facilities_path, PathBuf::from("facilities.json"));
        assert_eq!(config.lookup_timeout(), Duration::from_secs(10));
        assert_eq!(config.cruise_altitude_ft, 0.0);
    }

    #[test]
    fn reads_overrides() {
        let config = config_with(&[
            ("FMS_FACILITIES", "/data/nav.json"),
            ("FMS_LOOKUP_TIMEOUT_MS", "250"),
            ("FMS_CRUISE_ALTITUDE_FT", "35000"),
        ]);
        assert_eq!(config.facilities_path, PathBuf::from("/data/nav.json"));
        assert_eq!(config.lookup_timeout_ms, 250);
        assert_eq!(config.cruise_altitude_ft, 35000.0);
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = config_with(&[("FMS_LOOKUP_TIMEOUT_MS", "soon")]);
        assert_eq!(config.lookup_timeout_ms, 10_000);
    }
}
