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

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::Log;

use crate::Logger;
use crate::RootLogger;
use crate::archive::ErrorArchive;
use crate::logger::GlobalLog;

/// The name the root logger logs under.
pub const ROOT_LOGGER_NAME: &str = "root";

/// Registered loggers, shared between the repository and its root logger.
#[derive(Debug)]
pub(crate) struct Registry {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
    // the debug mode handed to loggers created from now on
    debug: AtomicBool,
}

impl Registry {
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Logger>>> {
        self.loggers.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Logger>>> {
        self.loggers.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub(crate) fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }
}

/// Hands out named [`Logger`]s that share one backend and one [`ErrorArchive`].
///
/// A logger is created the first time its name is requested; later requests return the same
/// instance. New loggers start in the repository's current debug mode, which the
/// [root logger](LoggerRepository::root) controls.
///
/// ```
/// use logkeep::LoggerRepository;
/// use logkeep::archive::ErrorArchive;
///
/// let dir = tempfile::tempdir().unwrap();
/// let loggers = LoggerRepository::new(ErrorArchive::new(dir.path()), true);
///
/// let db = loggers.get("db");
/// assert!(db.is_debug());
///
/// loggers.root().set_debug(false);
/// assert!(!db.is_debug());
/// assert!(!loggers.get("http").is_debug());
/// ```
pub struct LoggerRepository {
    registry: Arc<Registry>,
    errors: Arc<ErrorArchive>,
    backend: Arc<dyn Log>,
    root: RootLogger,
}

impl fmt::Debug for LoggerRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRepository")
            .field("loggers", &self.names())
            .field("debug", &self.is_debug())
            .field("errors", &self.errors.dir())
            .finish_non_exhaustive()
    }
}

impl LoggerRepository {
    /// Create a repository whose loggers forward to the global `log` logger.
    pub fn new(errors: ErrorArchive, debug: bool) -> Self {
        Self::with_backend(errors, debug, GlobalLog)
    }

    /// Create a repository whose loggers forward to `backend`, for example a
    /// [`Dispatcher`](crate::dispatch::Dispatcher) that was built but not installed globally.
    pub fn with_backend(errors: ErrorArchive, debug: bool, backend: impl Log + 'static) -> Self {
        let errors = Arc::new(errors);
        let backend: Arc<dyn Log> = Arc::new(backend);
        let registry = Arc::new(Registry {
            loggers: RwLock::default(),
            debug: AtomicBool::new(debug),
        });
        let root = Logger::new(ROOT_LOGGER_NAME, errors.clone(), backend.clone(), debug);
        let root = RootLogger::new(root, registry.clone());

        Self {
            registry,
            errors,
            backend,
            root,
        }
    }

    /// Get the logger for `name`, creating it if it does not exist yet.
    pub fn get(&self, name: &str) -> Arc<Logger> {
        if let Some(logger) = self.registry.read().get(name) {
            return logger.clone();
        }

        let mut loggers = self.registry.write();
        let logger = loggers.entry(name.to_string()).or_insert_with(|| {
            Arc::new(Logger::new(
                name,
                self.errors.clone(),
                self.backend.clone(),
                self.registry.is_debug(),
            ))
        });
        logger.clone()
    }

    /// Get the logger named after the type `T`.
    pub fn get_for<T: ?Sized>(&self) -> Arc<Logger> {
        self.get(std::any::type_name::<T>())
    }

    /// The logger whose debug mode cascades to every other logger.
    pub fn root(&self) -> &RootLogger {
        &self.root
    }

    /// The archive all loggers write reported errors to.
    pub fn errors(&self) -> &ErrorArchive {
        &self.errors
    }

    /// The debug mode new loggers are created with.
    pub fn is_debug(&self) -> bool {
        self.registry.is_debug()
    }

    /// Names of the loggers created so far, sorted. The root logger is not included.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.registry.read().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Run `f`, reporting a panic through the root logger instead of propagating it.
    ///
    /// Return `None` if `f` panicked. The panic hook still runs, so the panic message is printed
    /// as usual.
    #[track_caller]
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        // nothing observes the closure's state after a panic, only `None` is returned
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(payload) => {
                self.root.error_panic(&*payload);
                None
            }
        }
    }

    /// Like [`run`](LoggerRepository::run), and an `Err` returned by `f` is reported through the
    /// root logger as well.
    #[track_caller]
    pub fn run_result<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Option<T>
    where
        E: StdError + 'static,
    {
        match self.run(f)? {
            Ok(value) => Some(value),
            Err(err) => {
                self.root.error_from(&err);
                None
            }
        }
    }
}
