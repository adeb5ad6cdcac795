use serde::Deserialize;
use std::path::Path;

use crate::config::generation::GenerationParams;

/// Resources each side begins the game with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StartingResources {
    #[serde(default = "default_rice")]
    pub rice: f64,
    #[serde(default = "default_water")]
    pub water: f64,
    #[serde(default = "default_units")]
    pub units: u32,
}

fn default_rice() -> f64 {
    20.0
}
fn default_water() -> f64 {
    10.0
}
fn default_units() -> u32 {
    15
}

impl Default for StartingResources {
    fn default() -> Self {
        StartingResources {
            rice: default_rice(),
            water: default_water(),
            units: default_units(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub board: GenerationParams,
    #[serde(default)]
    pub start: StartingResources,
    #[serde(default = "default_snapshot_directory")]
    pub snapshot_directory: String,
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_snapshot_directory() -> String {
    "./saves".to_string()
}
fn default_max_snapshots() -> u32 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            board: GenerationParams::default(),
            start: StartingResources::default(),
            snapshot_directory: default_snapshot_directory(),
            max_snapshots: default_max_snapshots(),
            log_level: default_log_level(),
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    /// Like [`SimulationConfig::from_file`], but a missing file yields the defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if let Err(e) = self.board.validate() {
            errors.push(format!("{}. Example: [board] board_size = 10", e));
        }

        if self.start.rice < 0.0 {
            errors.push(format!(
                "start.rice must be >= 0, got {}. Example: [start] rice = 20",
                self.start.rice
            ));
        }

        if self.start.water < 0.0 {
            errors.push(format!(
                "start.water must be >= 0, got {}. Example: [start] water = 10",
                self.start.water
            ));
        }

        if self.max_snapshots == 0 {
            errors.push(format!(
                "max_snapshots must be > 0, got {}. Example: max_snapshots = 10",
                self.max_snapshots
            ));
        }

        if self.snapshot_directory.trim().is_empty() {
            errors.push(
                "snapshot_directory must not be empty. Example: snapshot_directory = \"./saves\""
                    .to_string(),
            );
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }
}
