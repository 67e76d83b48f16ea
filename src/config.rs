use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    audio::{LoudnessPrior, PrototypeConfig, PrototypeLibrary},
    classify::DEFAULT_TEMPERATURE,
    classify::zero_shot::validate_temperature,
    error::{ConfigError, FusionError, Result},
    labels::LabelSet,
    pipeline::AudioMode,
};

/// Default image weight for fusion
pub const DEFAULT_ALPHA: f32 = 0.6;

/// Main configuration for the mood fusion engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Fusion and audio classification settings
    pub engine: EngineConfig,

    /// Prototype synthesis settings
    pub prototypes: PrototypeConfig,

    /// Ordered label set, written as `[[labels]]` tables
    pub labels: LabelSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            prototypes: PrototypeConfig::default(),
            labels: LabelSet::moods(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_config_file(path)?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// Besides per-section checks, every label must have both a prototype
    /// and a loudness prior curve.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.prototypes.validate()?;
        PrototypeLibrary::with_config(self.prototypes.clone()).check_labels(&self.labels)?;
        LoudnessPrior::new(&self.labels)?;
        Ok(())
    }
}

/// Read a configuration file; only a missing file maps to `FileNotFound`
pub(crate) fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FusionError::from(ConfigError::FileNotFound {
            path: path.display().to_string(),
        }),
        _ => FusionError::Io(e),
    })
}

/// Fusion engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Image weight; the audio branch gets `1 - alpha`.
    /// Values outside 0.0-1.0 are accepted for experimentation.
    pub alpha: f32,

    /// Softmax temperature for zero-shot audio classification
    pub temperature: f32,

    /// Which audio evidence feeds the fusion
    pub audio_mode: AudioMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            temperature: DEFAULT_TEMPERATURE,
            audio_mode: AudioMode::default(),
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "engine.alpha".to_string(),
                value: self.alpha.to_string()
            }.into());
        }

        validate_temperature(self.temperature)
    }
}
