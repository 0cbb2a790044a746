use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use chernomap_core::SimulationConfig;
use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory for optional overrides.
pub(crate) const CONFIG_FILE: &str = "chernomap.toml";

/// Settings for the animation loop and the window.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct PresentationConfig {
    /// Minimum time between two simulation ticks.
    pub(crate) frame_interval_ms: u64,
    /// Number of ticks after which the simulation stops.
    pub(crate) frame_limit: u64,
    /// Window width in pixels.
    pub(crate) window_width: u32,
    /// Window height in pixels.
    pub(crate) window_height: u32,
    /// Synchronise presentation with the display refresh rate.
    pub(crate) vsync: bool,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 300,
            frame_limit: 200,
            window_width: 1000,
            window_height: 750,
            vsync: true,
        }
    }
}

impl PresentationConfig {
    pub(crate) const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Contents of the optional configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct FileConfig {
    pub(crate) simulation: SimulationConfig,
    pub(crate) presentation: PresentationConfig,
}

/// Where the effective configuration came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ConfigSource {
    Defaults,
    File(PathBuf),
}

/// Failures while reading the optional configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("frame interval must be positive")]
    ZeroFrameInterval,
}

/// Loads `path` if it exists, falling back to built-in defaults otherwise.
pub(crate) fn load(path: &Path) -> Result<(FileConfig, ConfigSource), ConfigError> {
    if !path.exists() {
        return Ok((FileConfig::default(), ConfigSource::Defaults));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if config.presentation.frame_interval_ms == 0 {
        return Err(ConfigError::ZeroFrameInterval);
    }

    Ok((config, ConfigSource::File(path.to_path_buf())))
}

fn parse(contents: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(contents)
}
