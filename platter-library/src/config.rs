//! Simple configuration persistence for Platter
//!
//! Stores user preferences like the last loaded track and theme, plus
//! optional overrides for the scratch engine tuning.

use platter_core::{ParamsError, ScratchParams};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// A config line that cannot be applied to [`ScratchParams`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverrideError {
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Application configuration
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Config {
    /// Track that was loaded last
    pub last_track: Option<PathBuf>,
    /// Name of the selected theme
    pub theme: Option<String>,
    /// Scratch parameter overrides in file order, already checked to parse
    overrides: Vec<(String, String)>,
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("platter")
            .join("config.txt")
    }

    /// Record a scratch parameter override
    ///
    /// The value is checked the same way as when reading the file.
    pub fn set_override(&mut self, key: &str, value: &str) -> Result<(), OverrideError> {
        apply_override(&mut ScratchParams::default(), key, value)?;
        self.overrides.retain(|(k, _)| k != key);
        self.overrides.push((key.to_string(), value.to_string()));
        Ok(())
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Scratch parameters with the overrides applied on top of the defaults
    ///
    /// Fails when the combined set does not validate; the overrides are then
    /// unusable as a whole.
    pub fn params(&self) -> Result<ScratchParams, ParamsError> {
        let mut params = ScratchParams::default();
        for (key, value) in &self.overrides {
            // entries were checked on the way in
            let _ = apply_override(&mut params, key, value);
        }
        params.validate()?;
        Ok(params)
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                warn!(line, "ignoring config line without '='");
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "last_track" => {
                    if !value.is_empty() {
                        config.last_track = Some(PathBuf::from(value));
                    }
                }
                "theme" => {
                    if !value.is_empty() {
                        config.theme = Some(value.to_string());
                    }
                }
                _ => {
                    if let Err(e) = config.set_override(key, value) {
                        warn!(error = %e, "ignoring config entry");
                    }
                }
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# Platter Configuration".to_string());

        if let Some(ref track) = self.last_track {
            lines.push(format!("last_track={}", track.display()));
        }
        if let Some(ref theme) = self.theme {
            lines.push(format!("theme={theme}"));
        }
        for (key, value) in &self.overrides {
            lines.push(format!("{key}={value}"));
        }

        lines.join("\n")
    }
}

/// Apply one `key=value` override to a parameter set
///
/// Durations are given in milliseconds.
pub fn apply_override(
    params: &mut ScratchParams,
    key: &str,
    value: &str,
) -> Result<(), OverrideError> {
    let invalid = || OverrideError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    let f32_value = || value.parse::<f32>().map_err(|_| invalid());
    let f64_value = || value.parse::<f64>().map_err(|_| invalid());
    let ms_value = || {
        value
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| invalid())
    };

    match key {
        "speed_scale" => params.speed_scale = f32_value()?,
        "speed_normalizer" => params.speed_normalizer = f32_value()?,
        "full_bonus_after" => params.full_bonus_after = ms_value()?,
        "build_rate" => params.build_rate = f32_value()?,
        "max_momentum" => params.max_momentum = f32_value()?,
        "momentum_decay" => params.momentum_decay = f32_value()?,
        "speed_decay" => params.speed_decay = f32_value()?,
        "momentum_weight" => params.momentum_weight = f32_value()?,
        "rest_threshold" => params.rest_threshold = f32_value()?,
        "spin_floor" => params.spin_floor = f32_value()?,
        "min_rate" => params.min_rate = f32_value()?,
        "max_rate" => params.max_rate = f32_value()?,
        "scrub_factor" => params.scrub_factor = f64_value()?,
        "chunk_duration" => params.chunk_duration = f64_value()?,
        "chunk_gap" => params.chunk_gap = ms_value()?,
        "chunk_back_offset" => params.chunk_back_offset = f64_value()?,
        "release_damping" => params.release_damping = f32_value()?,
        "tick_rate" => params.tick_rate = value.parse().map_err(|_| invalid())?,
        _ => return Err(OverrideError::UnknownKey(key.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let config = Config::parse("");
        assert!(config.last_track.is_none());
        assert!(config.theme.is_none());
        assert_eq!(config.params(), Ok(ScratchParams::default()));
    }

    #[test]
    fn test_parse_preferences() {
        let content = "# Comment\nlast_track=/books/chapter1.mp3\ntheme=amber\n";
        let config = Config::parse(content);
        assert_eq!(config.last_track, Some(PathBuf::from("/books/chapter1.mp3")));
        assert_eq!(config.theme.as_deref(), Some("amber"));
    }

    #[test]
    fn test_param_overrides() {
        let config = Config::parse("max_rate=2.5\nchunk_gap=350\ntick_rate=30");
        let params = config.params().unwrap();
        assert_eq!(params.max_rate, 2.5);
        assert_eq!(params.chunk_gap, Duration::from_millis(350));
        assert_eq!(params.tick_rate, 30);
        assert_eq!(params.min_rate, ScratchParams::default().min_rate);
    }

    #[test]
    fn test_bad_entries_ignored() {
        let config = Config::parse("max_rate=fast\nwobble=3\nnot a pair\nmin_rate=0.8");
        assert_eq!(config.overrides().count(), 1);
        assert_eq!(config.params().unwrap().min_rate, 0.8);
    }

    #[test]
    fn test_invalid_set_rejected() {
        let config = Config::parse("min_rate=4.0\nmax_rate=1.0");
        assert_eq!(
            config.params(),
            Err(ParamsError::RateRange { min: 4.0, max: 1.0 })
        );

        let config = Config::parse("spin_floor=-1");
        assert!(matches!(
            config.params(),
            Err(ParamsError::Negative { name: "spin_floor", .. })
        ));
    }

    #[test]
    fn test_set_override_replaces() {
        let mut config = Config::default();
        config.set_override("build_rate", "0.5").unwrap();
        config.set_override("build_rate", "0.6").unwrap();
        assert_eq!(config.overrides().count(), 1);
        assert_eq!(config.params().unwrap().build_rate, 0.6);
        assert!(matches!(
            config.set_override("nope", "1"),
            Err(OverrideError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = Config {
            last_track: Some(PathBuf::from("/test/path.flac")),
            theme: Some("cyberpunk".to_string()),
            ..Default::default()
        };
        config.set_override("chunk_duration", "2").unwrap();

        let parsed = Config::parse(&config.serialize());

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("platter-config-{}", std::process::id()));
        let path = dir.join("config.txt");
        let config = Config {
            last_track: Some(PathBuf::from("/a.mp3")),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_track, config.last_track);
        let _ = fs::remove_dir_all(&dir);
    }
}
