//! Locating and reading the model configuration.
//!
//! The first file found wins; files are never merged. Sections missing from
//! a file keep their defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use tessera_orm::config::ModelConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    Read(#[from] std::io::Error),
}

/// Loads the [`ModelConfig`] for a run.
///
/// Looks at `explicit_path`, then `tessera/config.toml` under the working
/// directory, then `config.toml` in the platform config directory, and
/// falls back to [`ModelConfig::default`].
///
/// # Errors
///
/// Fails when `explicit_path` does not exist, or when the chosen file cannot
/// be read or parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<ModelConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path:? = path; "Using configuration from --config");
        return load_config_file(path);
    }

    let local_config = Path::new("tessera/config.toml");
    if local_config.exists() {
        info!(path:? = local_config; "Using local configuration");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "tessera", "tessera") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path:? = system_config; "Using user configuration");
            return load_config_file(system_config);
        }

        debug!(path:? = system_config; "No user configuration");
    } else {
        debug!("No platform config directory");
    }

    debug!("Using default configuration");
    Ok(ModelConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<ModelConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[validation]\nwarn_on_missing_primary_key = false\n\n[naming]\ntable_prefix = \"Entity\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert!(!config.validation().warn_on_missing_primary_key());
        assert!(config.validation().warn_on_empty_design());
        assert_eq!(config.naming().table_prefix(), "Entity");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(p) if p == path));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\ntable_width = \"wide\"\n").unwrap();

        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }
}
