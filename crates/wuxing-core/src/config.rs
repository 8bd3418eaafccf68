//! TOML-based demo configuration.
//!
//! All of the tunable thresholds of the guided demo live here:
//! - Step goal and calibration guard rails
//! - Countdown durations for the two deadline kinds
//! - Intimacy award on goal completion
//!
//! The thresholds are carried over from the shipped product as named
//! parameters; none of them is derived from first principles.
//!
//! Configuration is stored at `~/.config/wuxing/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::storage::data_dir;

/// Step-goal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepGoalConfig {
    /// Session steps needed to complete the demo goal.
    #[serde(default = "default_goal_steps")]
    pub goal_steps: u32,
    /// Intimacy points awarded on completion (level is clamped to 100).
    #[serde(default = "default_intimacy_award")]
    pub intimacy_award: u8,
}

/// Calibration guard rails for the raw step counter.
///
/// Raw deltas are not trustworthy at a 10-step goal: counter resets,
/// pre-subscription backlogs and upward glitches all land within the
/// noise floor. Each guard below names one of those failure shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// A delta larger than this on the first post-baseline check is a
    /// stale backlog from before monitoring began, not real motion.
    #[serde(default = "default_backlog_jump_steps")]
    pub backlog_jump_steps: u32,
    /// Any delta larger than this is an anomalous spike and is dropped.
    #[serde(default = "default_spike_steps")]
    pub spike_steps: u32,
    /// A negative delta within this many checks of the start re-baselines;
    /// after the window it is treated as noise and ignored.
    #[serde(default = "default_rebaseline_window_checks")]
    pub rebaseline_window_checks: u32,
}

/// Countdown durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Sedentary-trigger countdown (short).
    #[serde(default = "default_sedentary_secs")]
    pub sedentary_secs: u64,
    /// Step-detection window (long).
    #[serde(default = "default_step_detection_secs")]
    pub step_detection_secs: u64,
}

/// Demo configuration.
///
/// Serialized to/from TOML at `~/.config/wuxing/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DemoConfig {
    #[serde(default)]
    pub step_goal: StepGoalConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub countdown: CountdownConfig,
}

// Default functions
fn default_goal_steps() -> u32 {
    10
}
fn default_intimacy_award() -> u8 {
    10
}
fn default_backlog_jump_steps() -> u32 {
    30
}
fn default_spike_steps() -> u32 {
    200
}
fn default_rebaseline_window_checks() -> u32 {
    5
}
fn default_sedentary_secs() -> u64 {
    30
}
fn default_step_detection_secs() -> u64 {
    180
}

impl Default for StepGoalConfig {
    fn default() -> Self {
        Self {
            goal_steps: default_goal_steps(),
            intimacy_award: default_intimacy_award(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            backlog_jump_steps: default_backlog_jump_steps(),
            spike_steps: default_spike_steps(),
            rebaseline_window_checks: default_rebaseline_window_checks(),
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            sedentary_secs: default_sedentary_secs(),
            step_detection_secs: default_step_detection_secs(),
        }
    }
}

/// Walk a dot-separated key through nested JSON objects.
fn json_lookup<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }
    key.split('.').try_fold(root, |node, part| node.get(part))
}

/// Replace the leaf named by a dot-separated key, parsing `value`
/// according to the type already in place.
fn json_assign(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |wanted: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot parse '{value}' as {wanted}"),
    };

    let mut parts: Vec<&str> = key.split('.').collect();
    let leaf = match parts.pop() {
        Some(l) if !l.is_empty() => l,
        _ => return Err(unknown()),
    };
    let mut node = root;
    for part in parts {
        node = node.get_mut(part).ok_or_else(unknown)?;
    }
    let slot = node
        .as_object_mut()
        .and_then(|obj| obj.get_mut(leaf))
        .ok_or_else(unknown)?;

    *slot = match &*slot {
        serde_json::Value::Bool(_) => {
            serde_json::Value::Bool(value.parse().map_err(|_| invalid("bool"))?)
        }
        serde_json::Value::Number(_) => {
            let n: u64 = value.parse().map_err(|_| invalid("number"))?;
            serde_json::Value::Number(n.into())
        }
        _ => serde_json::Value::String(value.to_string()),
    };
    Ok(())
}

impl DemoConfig {
    fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json_lookup(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        json_assign(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }

    pub fn sedentary_countdown_ms(&self) -> u64 {
        self.countdown.sedentary_secs.saturating_mul(1000)
    }

    pub fn step_detection_countdown_ms(&self) -> u64 {
        self.countdown.step_detection_secs.saturating_mul(1000)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = DemoConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DemoConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.step_goal.goal_steps, 10);
        assert_eq!(parsed.calibration.spike_steps, 200);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = DemoConfig::default();
        assert_eq!(cfg.get("step_goal.goal_steps").as_deref(), Some("10"));
        assert_eq!(cfg.get("countdown.sedentary_secs").as_deref(), Some("30"));
        assert!(cfg.get("countdown.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn json_assign_updates_nested_number() {
        let mut json = serde_json::to_value(DemoConfig::default()).unwrap();
        json_assign(&mut json, "step_goal.goal_steps", "25").unwrap();
        assert_eq!(
            json_lookup(&json, "step_goal.goal_steps").unwrap(),
            &serde_json::Value::Number(25.into())
        );
    }

    #[test]
    fn json_assign_rejects_unknown_key() {
        let mut json = serde_json::to_value(DemoConfig::default()).unwrap();
        let err = json_assign(&mut json, "step_goal.nope", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn json_assign_rejects_unparsable_number() {
        let mut json = serde_json::to_value(DemoConfig::default()).unwrap();
        let err = json_assign(&mut json, "step_goal.goal_steps", "plenty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let parsed: DemoConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.calibration.backlog_jump_steps, 30);
        assert_eq!(parsed.calibration.rebaseline_window_checks, 5);
        assert_eq!(parsed.countdown.step_detection_secs, 180);
        assert_eq!(parsed.step_goal.intimacy_award, 10);
    }

    #[test]
    fn countdown_durations_in_ms() {
        let cfg = DemoConfig::default();
        assert_eq!(cfg.sedentary_countdown_ms(), 30_000);
        assert_eq!(cfg.step_detection_countdown_ms(), 180_000);
    }
}
