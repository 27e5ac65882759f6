//! `config.toml`: output locations, rendering switches and the configured
//! defaults used when no stored record is selected.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

use crate::assembly::Defaults;
use crate::error::ConfigError;
use crate::layout::{FontChoice, LayoutOptions};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "invoice";
const APPLICATION: &str = "invoice";

/// Paths to the two TrueType programs; both or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontPaths {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where finished invoices go. Defaults to the download directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    pub compress: bool,
    pub open_after_write: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fonts: Option<FontPaths>,
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: None,
            store_path: None,
            compress: false,
            open_after_write: true,
            fonts: None,
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// The config written by `config init`: placeholder sender values the
    /// user is expected to edit.
    pub fn sample() -> Self {
        Config {
            defaults: Defaults::placeholder(),
            ..Config::default()
        }
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load `path`; a missing file yields the built-in defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Config = toml::from_str(&raw)?;
        if let Some(fonts) = &config.fonts {
            if fonts.regular.is_some() != fonts.bold.is_some() {
                return Err(ConfigError::IncompleteFonts);
            }
        }
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Write the sample config to `path`, refusing to replace an existing
    /// file unless `force` is set.
    pub fn init(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = toml::to_string_pretty(&Config::sample())?;
        fs::write(path, body).map_err(io_err)?;
        tracing::info!(path = %path.display(), "sample config written");
        Ok(())
    }

    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.store_path {
            Some(path) => Ok(expand_home(path)),
            None => Ok(project_dirs()?.data_dir().join("store.json")),
        }
    }

    /// Configured output directory, else the user's download directory,
    /// else the home directory.
    pub fn output_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.output_dir {
            return Ok(expand_home(dir));
        }
        let user_dirs = UserDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(user_dirs
            .download_dir()
            .unwrap_or_else(|| user_dirs.home_dir())
            .to_path_buf())
    }

    /// Rendering options, with font programs read from disk.
    pub fn layout_options(&self) -> Result<LayoutOptions, ConfigError> {
        let fonts = match &self.fonts {
            Some(FontPaths {
                regular: Some(regular),
                bold: Some(bold),
            }) => FontChoice::Embedded {
                regular: read_font(regular)?,
                bold: read_font(bold)?,
            },
            Some(FontPaths { regular: None, bold: None }) | None => FontChoice::Builtin,
            Some(_) => return Err(ConfigError::IncompleteFonts),
        };
        Ok(LayoutOptions {
            fonts,
            compress: self.compress,
        })
    }
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or(ConfigError::NoHomeDirectory)
}

fn read_font(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let path = expand_home(path);
    fs::read(&path).map_err(|source| ConfigError::Io { path, source })
}

/// Replace a leading `~` with the home directory.
fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}
