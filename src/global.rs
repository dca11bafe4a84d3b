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

use std::error::Error as StdError;
use std::sync::Arc;
use std::sync::OnceLock;

use crate::Config;
use crate::Error;
use crate::Logger;
use crate::LoggerRepository;
use crate::RootLogger;
use crate::archive::ErrorArchive;

static REPOSITORY: OnceLock<LoggerRepository> = OnceLock::new();

/// Set up the process-wide repository from `config`.
///
/// This only configures the named loggers and the archive. Call [`Config::install_backend`] or set
/// up another `log` implementation to see the records.
///
/// # Errors
///
/// Return [`Error::AlreadyInitialized`] if the repository was initialized before, explicitly or by
/// using a logger.
pub fn init(config: &Config) -> Result<&'static LoggerRepository, Error> {
    let mut initialized = false;
    let repository = REPOSITORY.get_or_init(|| {
        initialized = true;
        config.build_repository()
    });

    if initialized {
        Ok(repository)
    } else {
        Err(Error::AlreadyInitialized)
    }
}

/// The process-wide repository.
///
/// If [`init`] was not called, the repository is set up from [`Config::discover`] on first use,
/// falling back to the default configuration when discovery fails.
pub fn repository() -> &'static LoggerRepository {
    REPOSITORY.get_or_init(|| {
        let config = Config::discover().unwrap_or_else(|err| {
            log::warn!(target: "logkeep", "failed to load logger configuration, using defaults: {err}");
            Config::default()
        });
        config.build_repository()
    })
}

/// Get the logger for `name` from the process-wide repository.
///
/// ```
/// let logger = logkeep::logger("startup");
/// logger.info("listening on :8080");
/// ```
pub fn logger(name: &str) -> Arc<Logger> {
    repository().get(name)
}

/// Get the logger named after the type `T` from the process-wide repository.
pub fn logger_for<T: ?Sized>() -> Arc<Logger> {
    repository().get_for::<T>()
}

/// The root logger of the process-wide repository.
pub fn root_logger() -> &'static RootLogger {
    repository().root()
}

/// The archive of the process-wide repository.
pub fn errors() -> &'static ErrorArchive {
    repository().errors()
}

/// Run `f`, reporting a panic through the process-wide root logger. See
/// [`LoggerRepository::run`].
#[track_caller]
pub fn run<T>(f: impl FnOnce() -> T) -> Option<T> {
    repository().run(f)
}

/// Run `f`, reporting a panic or an `Err` through the process-wide root logger. See
/// [`LoggerRepository::run_result`].
#[track_caller]
pub fn run_result<T, E>(f: impl FnOnce() -> Result<T, E>) -> Option<T>
where
    E: StdError + 'static,
{
    repository().run_result(f)
}
