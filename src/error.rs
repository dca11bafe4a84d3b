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

use std::io;
use std::path::PathBuf;

use crate::archive::ErrorId;

/// Errors returned by the archive, the configuration loader and logger setup.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no error archived with id {0}")]
    NotFound(ErrorId),
    #[error("invalid error id {input:?}: {source}")]
    InvalidId {
        input: String,
        #[source]
        source: uuid::Error,
    },
    #[error("failed to encode archived error: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode archived error {id}: {source}")]
    Decode {
        id: ErrorId,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidOverride { key: &'static str, value: String },
    #[error("invalid log filter {directives:?}: {message}")]
    Filter { directives: String, message: String },
    #[error("failed to set up logger: {0}")]
    SetLogger(#[from] log::SetLoggerError),
    #[error("the logger repository has already been initialized")]
    AlreadyInitialized,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
