use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use framecast_core::export::domain::exporter::Exporter;
use framecast_core::export::infrastructure::directory_exporter::DirectoryExporter;
use framecast_core::export::infrastructure::drive_exporter::{DriveExporter, TOKEN_ENV_VAR};
use framecast_core::pipeline::conversion_settings::ConversionSettings;

pub const APP_DIR: &str = "Framecast";
const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no Drive access token: set export.access_token or FRAMECAST_DRIVE_TOKEN")]
    MissingToken,
}

/// Where shared results are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExportTarget {
    /// A local directory; folders become sub-directories.
    Directory { path: PathBuf },
    /// Google Drive. Without a token in the file, the environment is used.
    Drive {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        access_token: Option<String>,
    },
}

impl ExportTarget {
    pub fn build(&self) -> Result<Box<dyn Exporter>, ConfigError> {
        match self {
            ExportTarget::Directory { path } => Ok(Box::new(DirectoryExporter::new(path))),
            ExportTarget::Drive { access_token } => {
                let token = access_token
                    .clone()
                    .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
                    .filter(|t| !t.trim().is_empty())
                    .ok_or(ConfigError::MissingToken)?;
                Ok(Box::new(DriveExporter::new(token)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory of the local blob store.
    pub store_root: PathBuf,
    pub export: ExportTarget,
    pub conversion: ConversionSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = app_data_dir();
        Self {
            store_root: data.join("store"),
            export: ExportTarget::Directory {
                path: data.join("exports"),
            },
            conversion: ConversionSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE)
    }

    /// Reads the config at `path`. A missing file yields the defaults; an
    /// unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }
}

/// Per-user data directory for the store, exports and session file.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".framecast"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecast_core::pipeline::conversion_settings::EncodeFailurePolicy;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.conversion.video_container, "video-container");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.store_root = dir.path().join("blobs");
        config.export = ExportTarget::Drive {
            access_token: Some("token".to_string()),
        };
        config.conversion.isolate_requests = true;
        config.conversion.encode_failure = EncodeFailurePolicy::SkipAndLog;

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "export": { "kind": "directory", "path": "/srv/exports" },
                "conversion": { "encode_failure": "skip_and_log" }
            }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(
            config.export,
            ExportTarget::Directory {
                path: PathBuf::from("/srv/exports")
            }
        );
        assert_eq!(
            config.conversion.encode_failure,
            EncodeFailurePolicy::SkipAndLog
        );
        assert_eq!(config.conversion.output_video_name, "converted-video.mp4");
        assert_eq!(config.store_root, AppConfig::default().store_root);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_drive_token_from_config_builds_exporter() {
        let target = ExportTarget::Drive {
            access_token: Some("abc".to_string()),
        };
        assert!(target.build().is_ok());
    }

    #[test]
    fn test_blank_drive_token_is_rejected() {
        let target = ExportTarget::Drive {
            access_token: Some("  ".to_string()),
        };
        assert!(matches!(target.build(), Err(ConfigError::MissingToken)));
    }
}
