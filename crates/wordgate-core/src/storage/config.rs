//! TOML-based application configuration.
//!
//! Stores the parent-facing settings:
//! - Interruption interval preset and active weekdays
//! - The 4-digit access code gating the configuration surface
//! - Audio player/recorder commands and feedback cues
//!
//! Configuration is stored at `~/.config/wordgate/config.toml`.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::data_dir;
use crate::error::ConfigError;

/// The enumerated interruption intervals a parent can pick from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalPreset {
    #[default]
    OneMinute,
    TenMinutes,
    ThirtyMinutes,
    OneHour,
}

impl IntervalPreset {
    pub const ALL: [IntervalPreset; 4] = [
        IntervalPreset::OneMinute,
        IntervalPreset::TenMinutes,
        IntervalPreset::ThirtyMinutes,
        IntervalPreset::OneHour,
    ];

    /// Parse a stored token, `None` when unrecognized.
    pub fn try_from_token(s: &str) -> Option<Self> {
        match s {
            "one_minute" | "1m" => Some(IntervalPreset::OneMinute),
            "ten_minutes" | "10m" => Some(IntervalPreset::TenMinutes),
            "thirty_minutes" | "30m" => Some(IntervalPreset::ThirtyMinutes),
            "one_hour" | "1h" => Some(IntervalPreset::OneHour),
            _ => None,
        }
    }

    /// Parse a stored token, falling back to the default preset rather than
    /// failing on values no preset matches.
    pub fn from_token(s: &str) -> Self {
        Self::try_from_token(s).unwrap_or_else(|| {
            warn!(token = s, "unknown interval preset, using default");
            IntervalPreset::default()
        })
    }

    pub fn as_token(self) -> &'static str {
        match self {
            IntervalPreset::OneMinute => "one_minute",
            IntervalPreset::TenMinutes => "ten_minutes",
            IntervalPreset::ThirtyMinutes => "thirty_minutes",
            IntervalPreset::OneHour => "one_hour",
        }
    }

    pub fn minutes(self) -> i64 {
        match self {
            IntervalPreset::OneMinute => 1,
            IntervalPreset::TenMinutes => 10,
            IntervalPreset::ThirtyMinutes => 30,
            IntervalPreset::OneHour => 60,
        }
    }

    pub fn duration(self) -> chrono::Duration {
        chrono::Duration::minutes(self.minutes())
    }
}

impl<'de> Deserialize<'de> for IntervalPreset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(IntervalPreset::from_token(&s))
    }
}

impl fmt::Display for IntervalPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IntervalPreset::OneMinute => "1 minute",
            IntervalPreset::TenMinutes => "10 minutes",
            IntervalPreset::ThirtyMinutes => "30 minutes",
            IntervalPreset::OneHour => "1 hour",
        };
        f.write_str(label)
    }
}

/// Interruption schedule settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSettings {
    #[serde(default)]
    pub interval: IntervalPreset,
    /// Weekdays on which interruptions fire. An empty set disables them.
    #[serde(default = "default_active_days")]
    pub active_days: HashSet<Weekday>,
}

/// Access-code settings for the configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_pin")]
    pub pin: String,
}

/// Audio facility configuration.
///
/// Player and recorder commands are split on whitespace; the clip path is
/// appended as the final argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_player_cmd")]
    pub player_cmd: String,
    #[serde(default = "default_recorder_cmd")]
    pub recorder_cmd: String,
    /// Optional clip played on a correct answer.
    #[serde(default)]
    pub success_cue: Option<PathBuf>,
    /// Optional clip played on an incorrect answer.
    #[serde(default)]
    pub failure_cue: Option<PathBuf>,
}

fn default_active_days() -> HashSet<Weekday> {
    // Weekdays only by default.
    HashSet::from([
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ])
}

fn default_pin() -> String {
    "1234".into()
}

fn default_player_cmd() -> String {
    "aplay -q".into()
}

fn default_recorder_cmd() -> String {
    "arecord -q -f cd".into()
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval: IntervalPreset::default(),
            active_days: default_active_days(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { pin: default_pin() }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            player_cmd: default_player_cmd(),
            recorder_cmd: default_recorder_cmd(),
            success_cue: None,
            failure_cue: None,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/wordgate/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/wordgate"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing a default config on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
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

    /// Load from disk, returning default on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as a string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let value = json.pointer(&json_pointer(key))?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed as
    /// the field's type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        })?;
        let slot = json
            .pointer_mut(&json_pointer(key))
            .ok_or_else(|| ConfigError::UnknownKey(key.into()))?;

        let parsed = match slot {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse().map_err(
                |_| ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("cannot parse '{value}' as bool"),
                },
            )?),
            serde_json::Value::Number(_) => {
                let n: i64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("cannot parse '{value}' as number"),
                })?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                serde_json::from_str(value).map_err(|_| ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("cannot parse '{value}' as JSON"),
                })?
            }
            _ => serde_json::Value::String(value.into()),
        };
        *slot = parsed;

        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.into(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        self.save()
    }

    /// Check cross-field invariants after any mutation path.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_pin(&self.security.pin)
    }

    /// Whether an entered code matches the stored access code.
    pub fn verify_pin(&self, entered: &str) -> bool {
        entered == self.security.pin
    }

    /// Replace the access code, enforcing the 4-digit format.
    pub fn set_pin(&mut self, new_pin: &str) -> Result<(), ConfigError> {
        validate_pin(new_pin)?;
        self.security.pin = new_pin.to_string();
        self.save()
    }
}

fn validate_pin(pin: &str) -> Result<(), ConfigError> {
    if pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: "security.pin".into(),
            message: "PIN must be 4 digits".into(),
        })
    }
}

fn json_pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.schedule.interval, IntervalPreset::OneMinute);
        assert_eq!(parsed.schedule.active_days.len(), 5);
        assert_eq!(parsed.security.pin, "1234");
    }

    #[test]
    fn default_active_days_are_weekdays() {
        let days = default_active_days();
        assert!(days.contains(&Weekday::Mon));
        assert!(days.contains(&Weekday::Fri));
        assert!(!days.contains(&Weekday::Sat));
        assert!(!days.contains(&Weekday::Sun));
    }

    #[test]
    fn unknown_interval_token_falls_back_to_default() {
        let cfg: Config = toml::from_str(
            "[schedule]\ninterval = \"5 minutes\"\nactive_days = [\"Monday\"]\n",
        )
        .unwrap();
        assert_eq!(cfg.schedule.interval, IntervalPreset::OneMinute);
    }

    #[test]
    fn interval_tokens_parse() {
        assert_eq!(
            IntervalPreset::try_from_token("10m"),
            Some(IntervalPreset::TenMinutes)
        );
        assert_eq!(
            IntervalPreset::try_from_token("one_hour"),
            Some(IntervalPreset::OneHour)
        );
        assert_eq!(IntervalPreset::try_from_token("2 hours"), None);
    }

    #[test]
    fn interval_durations() {
        assert_eq!(IntervalPreset::OneMinute.duration().num_minutes(), 1);
        assert_eq!(IntervalPreset::OneHour.duration().num_minutes(), 60);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("schedule.interval").as_deref(), Some("one_minute"));
        assert_eq!(cfg.get("security.pin").as_deref(), Some("1234"));
        assert!(cfg.get("schedule.missing_key").is_none());
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("schedule.nonexistent", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_pin_before_saving() {
        let mut cfg = Config::default();
        assert!(cfg.set("security.pin", "not-a-pin").is_err());
        assert_eq!(cfg.security.pin, "1234");
    }

    #[test]
    fn pin_validation() {
        assert!(validate_pin("0420").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("12a4").is_err());
    }

    #[test]
    fn verify_pin_matches_stored() {
        let cfg = Config::default();
        assert!(cfg.verify_pin("1234"));
        assert!(!cfg.verify_pin("0000"));
    }

    #[test]
    fn active_days_deserialize_from_names() {
        let cfg: Config = toml::from_str(
            "[schedule]\ninterval = \"1m\"\nactive_days = [\"Saturday\", \"Sunday\"]\n",
        )
        .unwrap();
        assert_eq!(cfg.schedule.active_days.len(), 2);
        assert!(cfg.schedule.active_days.contains(&Weekday::Sat));
    }
}
