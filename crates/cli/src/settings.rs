//! `obsync config` and resolution-config discovery.
//!
//! Lookup order: `--config <file>`, then `<config dir>/orangebook/resolve.toml`
//! if it exists, then built-in defaults.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use orangebook_resolve::{ConfigError, ResolveConfig};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_IO, EXIT_USAGE};
use crate::CliError;

const CONFIG_DIR_NAME: &str = "orangebook";
const CONFIG_FILE_NAME: &str = "resolve.toml";

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Check a resolution config file without importing anything
    #[command(after_help = "\
Examples:
  obsync config validate resolve.toml")]
    Validate {
        /// Path to the TOML file
        file: PathBuf,
    },

    /// Print the effective resolution config as TOML
    #[command(after_help = "\
Examples:
  obsync config show
  obsync config show --config resolve.toml")]
    Show {
        /// Config file to load instead of the discovered one
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Flag(PathBuf),
    UserFile(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{}", p.display()),
            Self::UserFile(p) => write!(f, "{} (user config)", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn config_err(path: &Path, err: ConfigError) -> CliError {
    match err {
        ConfigError::Io { .. } => CliError {
            code: EXIT_USAGE,
            message: err.to_string(),
            hint: None,
        },
        ConfigError::Parse(_) | ConfigError::Validation(_) => CliError {
            code: EXIT_INVALID_CONFIG,
            message: format!("{}: {err}", path.display()),
            hint: Some("run `obsync config show` to see every key with its default".into()),
        },
    }
}

/// Load the effective resolution config.
pub fn load_config(explicit: Option<&Path>) -> Result<(ResolveConfig, ConfigSource), CliError> {
    if let Some(path) = explicit {
        let config = ResolveConfig::load(path).map_err(|e| config_err(path, e))?;
        return Ok((config, ConfigSource::Flag(path.to_path_buf())));
    }

    if let Some(path) = user_config_path().filter(|p| p.is_file()) {
        tracing::debug!("using user config {}", path.display());
        let config = ResolveConfig::load(&path).map_err(|e| config_err(&path, e))?;
        return Ok((config, ConfigSource::UserFile(path)));
    }

    Ok((ResolveConfig::default(), ConfigSource::Defaults))
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { file } => {
            let config = ResolveConfig::load(&file).map_err(|e| config_err(&file, e))?;
            eprintln!(
                "{}: ok (threshold {}, {} jurisdiction suffixes, {} corporate suffixes, \
                 {} noise words)",
                file.display(),
                config.threshold,
                config.jurisdiction_suffixes.len(),
                config.corporate_suffixes.len(),
                config.noise_words.len(),
            );
            Ok(())
        }
        ConfigCommands::Show { config } => {
            let (config, source) = load_config(config.as_deref())?;
            let rendered = config.to_toml().map_err(|e| CliError {
                code: EXIT_IO,
                message: e.to_string(),
                hint: None,
            })?;
            eprintln!("# source: {source}");
            print!("{rendered}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strict.toml");
        std::fs::write(&path, "threshold = 0.9\n").unwrap();

        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(config.threshold, 0.9);
        assert_eq!(source, ConfigSource::Flag(path));
    }

    #[test]
    fn invalid_file_maps_to_config_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "threshold = 1.5\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CONFIG);
        assert!(err.hint.is_some());
    }

    #[test]
    fn missing_explicit_file_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }

    #[test]
    fn user_config_path_shape() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with("orangebook/resolve.toml"));
        }
    }
}
