//! `copper.toml` settings.
//!
//! Looked up at `--config <path>` or `<config dir>/copper/copper.toml`.
//! A missing default file means defaults; a missing explicit file is an error.

use anyhow::{Context, Result};
use copper_io::read_token;
use copper_viz::figure::Center;
use copper_viz::{DashboardOptions, MapView};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopperConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_pitch")]
    pub pitch: f64,
    /// File holding the map tile provider token
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            zoom: default_zoom(),
            pitch: default_pitch(),
            token_file: None,
        }
    }
}

fn default_style() -> String {
    "open-street-map".to_string()
}

fn default_center_lat() -> f64 {
    53.0
}

fn default_center_lon() -> f64 {
    9.0
}

fn default_zoom() -> f64 {
    3.9
}

fn default_pitch() -> f64 {
    60.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

fn default_title() -> String {
    "Copper Sushi".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `<config dir>/copper/copper.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("copper").join("copper.toml"))
}

impl CopperConfig {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: CopperConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid log level '{}' in config", self.logging.level))
    }

    /// Map view with the token file read, if one is configured.
    pub fn map_view(&self) -> Result<MapView> {
        let access_token = match &self.map.token_file {
            Some(path) => read_token(path)?,
            None => None,
        };
        Ok(MapView {
            style: self.map.style.clone(),
            center: Center {
                lat: self.map.center_lat,
                lon: self.map.center_lon,
            },
            zoom: self.map.zoom,
            pitch: self.map.pitch,
            access_token,
        })
    }

    pub fn dashboard_options(&self, initial_snapshot: usize) -> Result<DashboardOptions> {
        Ok(DashboardOptions {
            title: self.dashboard.title.clone(),
            view: self.map_view()?,
            initial_snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_the_dashboard() {
        let config = CopperConfig::default();
        let view = config.map_view().unwrap();
        assert_eq!(view, MapView::default());
        assert_eq!(config.dashboard.title, "Copper Sushi");
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn partial_files_keep_defaults() {
        let dir = tempdir().unwrap();
        let token = dir.path().join("token");
        std::fs::write(&token, "pk.secret\n").unwrap();
        let path = dir.path().join("copper.toml");
        std::fs::write(
            &path,
            format!(
                concat!(
                    "[map]\nzoom = 5.5\nstyle = \"dark\"\ntoken_file = {:?}\n\n",
                    "[logging]\nlevel = \"debug\"\n",
                ),
                token.display().to_string()
            ),
        )
        .unwrap();

        let config = CopperConfig::load(Some(&path)).unwrap();
        assert_eq!(config.map.zoom, 5.5);
        assert_eq!(config.map.pitch, 60.0);
        assert_eq!(config.dashboard.title, "Copper Sushi");
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
        let view = config.map_view().unwrap();
        assert_eq!(view.style, "dark");
        assert_eq!(view.access_token.as_deref(), Some("pk.secret"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(CopperConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn bad_log_level_is_reported() {
        let mut config = CopperConfig::default();
        config.logging.level = "loud".into();
        assert!(config.log_level().is_err());
    }
}
