use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable pointing at a JSON settings file.
pub const CONFIG_ENV: &str = "CRICKET_DASH_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "cricket-dash.json";

/// User-tunable settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_width: f32,
    pub window_height: f32,
    /// Cap on explicitly selected players in the filter panel.
    pub max_selected_players: usize,
    /// Metrics preselected for radar / heatmap / parallel charts.
    pub default_chart_metrics: usize,
    /// Metrics preselected on the comparison page.
    pub default_comparison_metrics: usize,
    /// Samples per violin density curve.
    pub density_points: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 820.0,
            max_selected_players: 6,
            default_chart_metrics: 5,
            default_comparison_metrics: 3,
            density_points: 64,
        }
    }
}

impl AppConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load from `$CRICKET_DASH_CONFIG` or `./cricket-dash.json`. A missing
    /// file gives the defaults; a broken one is logged and ignored.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(cfg) => {
                log::info!("loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                log::error!("{e:#}; using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, r#"{{ "max_selected_players": 3 }}"#).unwrap();
        let cfg = AppConfig::from_path(tmp.path()).unwrap();
        assert_eq!(cfg.max_selected_players, 3);
        assert_eq!(cfg.density_points, AppConfig::default().density_points);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "not json").unwrap();
        let err = AppConfig::from_path(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
