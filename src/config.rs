// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration of the logger repository and its backend.
//!
//! The configuration is read from a TOML file, `logger.toml` in the working directory unless
//! `LOGKEEP_CONFIG` names another one:
//!
//! ```toml
//! errors = "var/errors"   # archive directory
//! debug = false           # initial debug mode
//! filter = "info,db=warn" # backend filter directives
//! format = "json"         # "text" or "json"
//! stream = "stdout"       # "stdout" or "stderr"
//! ```
//!
//! `LOGKEEP_ERRORS` and `LOGKEEP_DEBUG` override `errors` and `debug`.

use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Error;
use crate::LoggerRepository;
use crate::append;
use crate::archive::ErrorArchive;
use crate::dispatch;
use crate::filter::EnvFilter;
use crate::layout::JsonLayout;
use crate::layout::Layout;
use crate::layout::TextLayout;

/// The configuration file read by [`Config::discover`].
pub const CONFIG_FILE: &str = "logger.toml";
/// Names a configuration file to read instead of [`CONFIG_FILE`].
pub const CONFIG_ENV: &str = "LOGKEEP_CONFIG";
/// Overrides [`Config::errors`].
pub const ERRORS_ENV: &str = "LOGKEEP_ERRORS";
/// Overrides [`Config::debug`].
pub const DEBUG_ENV: &str = "LOGKEEP_DEBUG";

/// Output format of the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Output stream of the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Stdout,
    #[default]
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory reported errors are archived in.
    pub errors: PathBuf,
    /// Initial debug mode of all loggers.
    pub debug: bool,
    /// Filter directives of the backend, such as `info,db=warn`.
    ///
    /// When unset, `RUST_LOG` is consulted, then `debug` or `info` is used depending on
    /// [`Config::debug`].
    pub filter: Option<String>,
    pub format: Format,
    pub stream: Stream,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            errors: PathBuf::from("errors"),
            debug: true,
            filter: None,
            format: Format::default(),
            stream: Stream::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text. Missing keys take their default value.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::from_toml_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the configuration the way the process-wide repository does.
    ///
    /// Read the file named by `LOGKEEP_CONFIG`, or `logger.toml`; a missing file means defaults.
    /// Then apply the environment overrides.
    pub fn discover() -> Result<Self, Error> {
        Self::discover_with(|key| env::var(key).ok())
    }

    /// Like [`Config::discover`], reading `LOGKEEP_CONFIG` and the overrides through `lookup`.
    pub fn discover_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let path = lookup(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        let config = match Self::load(&path) {
            Ok(config) => config,
            Err(Error::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Config::default()
            }
            Err(err) => return Err(err),
        };
        config.with_overrides(lookup)
    }

    /// Apply `LOGKEEP_ERRORS` and `LOGKEEP_DEBUG` as returned by `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        if let Some(errors) = lookup(ERRORS_ENV) {
            self.errors = PathBuf::from(errors);
        }
        if let Some(value) = lookup(DEBUG_ENV) {
            self.debug = parse_bool(&value).ok_or(Error::InvalidOverride {
                key: DEBUG_ENV,
                value,
            })?;
        }
        Ok(self)
    }

    pub fn archive(&self) -> ErrorArchive {
        ErrorArchive::new(&self.errors)
    }

    /// Create a repository that archives to [`Config::errors`] and forwards to the global logger.
    pub fn build_repository(&self) -> LoggerRepository {
        LoggerRepository::new(self.archive(), self.debug)
    }

    /// A backend builder for the configured filter, format and stream.
    pub fn backend(&self) -> Result<dispatch::Builder, Error> {
        let filter = match &self.filter {
            Some(directives) => {
                directives
                    .parse::<EnvFilter>()
                    .map_err(|err| Error::Filter {
                        directives: directives.clone(),
                        message: err.to_string(),
                    })?
            }
            None => EnvFilter::from_default_env_or(if self.debug { "debug" } else { "info" }),
        };

        let layout: Layout = match self.format {
            Format::Text => TextLayout::default().into(),
            Format::Json => JsonLayout::default().into(),
        };

        let builder = dispatch::builder().filter(filter);
        Ok(match self.stream {
            Stream::Stdout => builder.append(append::Stdout::default().with_layout(layout)),
            Stream::Stderr => builder.append(append::Stderr::default().with_layout(layout)),
        })
    }

    /// Install the configured backend as the global `log` logger.
    pub fn install_backend(&self) -> Result<(), Error> {
        self.backend()?.try_apply()?;
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
