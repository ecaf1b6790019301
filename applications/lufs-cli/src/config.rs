/// Measurement configuration
use crate::error::{CliError, Result};
use drumline_loudness::{NormalizationTarget, VolumeNormalizer, MAX_PREAMP_DB, MIN_PREAMP_DB};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "drumline.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// `replaygain`, `ebu_r128`, `streaming`, `disabled` or `custom`
    #[serde(default = "default_target")]
    pub target: String,

    /// Level for the `custom` target
    #[serde(default)]
    pub target_lufs: Option<f64>,

    #[serde(default)]
    pub preamp_db: f64,

    /// Ceiling on boost applied to quiet tracks
    #[serde(default)]
    pub max_gain_db: Option<f64>,

    /// Files analysed in parallel
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// Without an explicit path, `drumline.toml` is used when present.
    /// `DRUMLINE_*` environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path.to_path_buf()));
                }
            }
        }

        settings = settings.add_source(config::Environment::with_prefix("DRUMLINE").try_parsing(true));

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(CliError::Config("jobs must be at least 1".to_string()));
        }

        if !(MIN_PREAMP_DB..=MAX_PREAMP_DB).contains(&self.preamp_db) {
            return Err(CliError::Config(format!(
                "preamp_db {} is outside {}..={} dB",
                self.preamp_db, MIN_PREAMP_DB, MAX_PREAMP_DB
            )));
        }

        self.normalization_target().map(|_| ())
    }

    /// Resolve the configured target
    pub fn normalization_target(&self) -> Result<NormalizationTarget> {
        if self.target.eq_ignore_ascii_case("custom") {
            return match self.target_lufs {
                Some(lufs) if lufs.is_finite() && lufs < 0.0 => Ok(NormalizationTarget::Custom(lufs)),
                Some(lufs) => Err(CliError::InvalidTarget(format!(
                    "custom target must be a negative LUFS value, got {}",
                    lufs
                ))),
                None => Err(CliError::InvalidTarget(
                    "custom target requires target_lufs".to_string(),
                )),
            };
        }

        NormalizationTarget::from_str(&self.target)
            .ok_or_else(|| CliError::InvalidTarget(self.target.clone()))
    }

    /// Build the gain mapper for this configuration
    pub fn normalizer(&self) -> Result<VolumeNormalizer> {
        let mut normalizer = VolumeNormalizer::new(self.normalization_target()?);
        normalizer.set_preamp_db(self.preamp_db);
        normalizer.set_max_gain_db(self.max_gain_db);
        Ok(normalizer)
    }
}

// Default values
fn default_target() -> String {
    "replaygain".to_string()
}

fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(2, |n| n.get())
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            target_lufs: None,
            preamp_db: 0.0,
            max_gain_db: None,
            jobs: default_jobs(),
            format: OutputFormat::default(),
        }
    }
}
