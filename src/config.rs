//! Configuration for locating and checking combinato outputs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SortingError};
use crate::types::{ChannelKey, Polarity, DEFAULT_WAVEFORM_SAMPLES};

/// Extension of combinato HDF5 outputs.
pub const H5_EXT: &str = "h5";

/// Reviewer label combinato uses for an unreviewed sorting.
pub const DEFAULT_REVIEWER: &str = "simple";

/// File stem of the sorting output inside each sort directory.
pub const SORT_CAT_STEM: &str = "sort_cat";

/// Settings for loading sorting outputs of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingConfig {
    /// Directory holding the `data_chan_XX.h5` files and their sort folders
    pub sorting_dir: PathBuf,
    /// Polarity used for keys created with [`SortingConfig::channel_key`]
    pub polarity: Polarity,
    /// Reviewer initials used for keys created with [`SortingConfig::channel_key`]
    pub reviewer: Option<String>,
    /// Expected samples per waveform; `None` disables the check
    pub waveform_samples: Option<usize>,
}

impl Default for SortingConfig {
    fn default() -> Self {
        SortingConfig {
            sorting_dir: PathBuf::from("."),
            polarity: Polarity::Negative,
            reviewer: None,
            waveform_samples: Some(DEFAULT_WAVEFORM_SAMPLES),
        }
    }
}

impl SortingConfig {
    /// Checks that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.waveform_samples == Some(0) {
            return Err(SortingError::ConfigValidation {
                message: "waveform_samples must be greater than 0".to_string(),
            });
        }
        if self.reviewer.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(SortingError::ConfigValidation {
                message: "reviewer must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Builds a key for `channel` using the configured polarity and reviewer.
    pub fn channel_key(&self, channel: impl std::fmt::Display) -> ChannelKey {
        ChannelKey {
            channel: channel.to_string(),
            polarity: self.polarity,
            reviewer: self.reviewer.clone(),
        }
    }

    /// Path of the detection file for a channel.
    pub fn data_chan_path(&self, key: &ChannelKey) -> PathBuf {
        self.sorting_dir.join(data_chan_file_name(&key.channel))
    }

    /// Directory holding the `sort_cat.h5` file for a channel, polarity and reviewer.
    pub fn sort_cat_dir(&self, key: &ChannelKey) -> PathBuf {
        self.sorting_dir
            .join(channel_dir_name(&key.channel))
            .join(sort_dir_name(key.polarity, key.reviewer.as_deref()))
    }

    /// Checks a waveform width against the configured one.
    pub fn check_waveform_samples(&self, found: usize) -> Result<()> {
        match self.waveform_samples {
            Some(expected) if expected != found => {
                Err(SortingError::WaveformWidth { expected, found })
            }
            _ => Ok(()),
        }
    }
}

/// File name of a combinato detection file, e.g. `data_chan_5.h5`.
pub fn data_chan_file_name(channel: &str) -> String {
    format!("data_chan_{channel}.{H5_EXT}")
}

/// Name of the folder combinato creates for a channel's sortings, e.g. `chan_5`.
pub fn channel_dir_name(channel: &str) -> String {
    format!("chan_{channel}")
}

/// Name of a sort folder, e.g. `sort_neg_simple`.
pub fn sort_dir_name(polarity: Polarity, reviewer: Option<&str>) -> String {
    format!("sort_{}_{}", polarity, reviewer.unwrap_or(DEFAULT_REVIEWER))
}

/// Load configuration from a TOML file.
///
/// Returns the default config if the file does not exist.
pub fn load_config_file(path: &Path) -> Result<SortingConfig> {
    if !path.exists() {
        return Ok(SortingConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| SortingError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: SortingConfig = toml::from_str(&contents).map_err(|e| SortingError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_nonexistent_file_returns_default() {
        let config = load_config_file(Path::new("/nonexistent/path/sorting.toml")).unwrap();
        assert_eq!(config, SortingConfig::default());
        assert_eq!(config.waveform_samples, Some(64));
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
sorting_dir = "/data/session1/sorting"
polarity = "pos"
reviewer = "tf"
"#
        )
        .unwrap();

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.sorting_dir, PathBuf::from("/data/session1/sorting"));
        assert_eq!(config.polarity, Polarity::Positive);
        assert_eq!(config.reviewer.as_deref(), Some("tf"));
        assert_eq!(config.waveform_samples, Some(64));
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        assert!(matches!(
            load_config_file(file.path()),
            Err(SortingError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_load_rejects_unknown_polarity() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"polarity = "both""#).unwrap();

        assert!(load_config_file(file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_width_and_blank_reviewer() {
        let config = SortingConfig {
            waveform_samples: Some(0),
            ..SortingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SortingError::ConfigValidation { .. })
        ));

        let config = SortingConfig {
            reviewer: Some("  ".to_string()),
            ..SortingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_channel_paths() {
        let config = SortingConfig {
            sorting_dir: PathBuf::from("/sorting"),
            ..SortingConfig::default()
        };
        let key = config.channel_key(5);
        assert_eq!(config.data_chan_path(&key), PathBuf::from("/sorting/data_chan_5.h5"));
        assert_eq!(
            config.sort_cat_dir(&key),
            PathBuf::from("/sorting/chan_5/sort_neg_simple")
        );

        let reviewed = ChannelKey::new(5, Polarity::Positive).with_reviewer("tf");
        assert_eq!(
            config.sort_cat_dir(&reviewed),
            PathBuf::from("/sorting/chan_5/sort_pos_tf")
        );
    }

    #[test]
    fn test_check_waveform_samples() {
        let config = SortingConfig::default();
        assert!(config.check_waveform_samples(64).is_ok());
        assert!(matches!(
            config.check_waveform_samples(32),
            Err(SortingError::WaveformWidth {
                expected: 64,
                found: 32
            })
        ));

        let unchecked = SortingConfig {
            waveform_samples: None,
            ..SortingConfig::default()
        };
        assert!(unchecked.check_waveform_samples(32).is_ok());
    }
}
