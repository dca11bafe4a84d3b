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

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::Level;
use log::Log;
use log::Metadata;
use log::Record;
use log::kv::Value;

use crate::archive::ArchivedError;
use crate::archive::ErrorArchive;
use crate::archive::ErrorId;
use crate::archive::panic_message;

/// A named handle that forwards messages to the logging backend.
///
/// Records are emitted with the logger name as their target. Errors reported at error level are
/// also saved to the [`ErrorArchive`], unless the logger is in debug mode, in which case they are
/// only logged.
///
/// Loggers are obtained from a [`LoggerRepository`](crate::LoggerRepository) or from the
/// process-wide one through [`logger`](crate::logger).
pub struct Logger {
    name: String,
    errors: Arc<ErrorArchive>,
    backend: Arc<dyn Log>,
    debug: AtomicBool,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("debug", &self.is_debug())
            .field("errors", &self.errors.dir())
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub(crate) fn new(
        name: impl Into<String>,
        errors: Arc<ErrorArchive>,
        backend: Arc<dyn Log>,
        debug: bool,
    ) -> Self {
        Self {
            name: name.into(),
            errors,
            backend,
            debug: AtomicBool::new(debug),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The archive reported errors are written to.
    pub fn errors(&self) -> &ErrorArchive {
        &self.errors
    }

    /// Whether debug records are emitted and archiving is skipped.
    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    /// Log a message at debug level. Does nothing unless the logger is in debug mode.
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        if self.is_debug() {
            let location = Location::caller();
            self.log(Level::Debug, format_args!("{message}"), None, None, location);
        }
    }

    /// Log a message and an error at debug level. Does nothing unless the logger is in debug mode.
    #[track_caller]
    pub fn debug_with(&self, message: impl fmt::Display, error: &(dyn StdError + 'static)) {
        if self.is_debug() {
            let location = Location::caller();
            self.log(Level::Debug, format_args!("{message}"), Some(error), None, location);
        }
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        let location = Location::caller();
        self.log(Level::Info, format_args!("{message}"), None, None, location);
    }

    #[track_caller]
    pub fn info_with(&self, message: impl fmt::Display, error: &(dyn StdError + 'static)) {
        let location = Location::caller();
        self.log(Level::Info, format_args!("{message}"), Some(error), None, location);
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        let location = Location::caller();
        self.log(Level::Warn, format_args!("{message}"), None, None, location);
    }

    #[track_caller]
    pub fn warn_with(&self, message: impl fmt::Display, error: &(dyn StdError + 'static)) {
        let location = Location::caller();
        self.log(Level::Warn, format_args!("{message}"), Some(error), None, location);
    }

    /// Log a message at error level and archive it.
    ///
    /// Return the archive id, or `None` in debug mode or when archiving failed.
    ///
    /// ```
    /// use logkeep::LoggerRepository;
    /// use logkeep::archive::ErrorArchive;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let loggers = LoggerRepository::new(ErrorArchive::new(dir.path()), false);
    ///
    /// let id = loggers.get("billing").error("card declined").unwrap();
    /// assert_eq!(loggers.errors().read(id).unwrap().message(), "card declined");
    /// ```
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) -> Option<ErrorId> {
        let location = Location::caller();
        let id = self.archive(|| ArchivedError::from_message(&self.name, &message), location);
        self.log(Level::Error, format_args!("{message}"), None, id, location);
        id
    }

    /// Log a message with the error that caused it, and archive the error.
    ///
    /// Return the archive id, or `None` in debug mode or when archiving failed.
    #[track_caller]
    pub fn error_with(
        &self,
        message: impl fmt::Display,
        error: &(dyn StdError + 'static),
    ) -> Option<ErrorId> {
        let location = Location::caller();
        let id = self.archive(
            || ArchivedError::from_error(&self.name, error).with_context(&message),
            location,
        );
        self.log(Level::Error, format_args!("{message}"), Some(error), id, location);
        id
    }

    /// Log an error and archive it.
    ///
    /// Return the archive id, or `None` in debug mode or when archiving failed.
    #[track_caller]
    pub fn error_from(&self, error: &(dyn StdError + 'static)) -> Option<ErrorId> {
        let location = Location::caller();
        let id = self.archive(|| ArchivedError::from_error(&self.name, error), location);
        self.log(Level::Error, format_args!("{error}"), None, id, location);
        id
    }

    /// Log the payload of a caught panic and archive it.
    #[track_caller]
    pub fn error_panic(&self, payload: &(dyn Any + Send)) -> Option<ErrorId> {
        let location = Location::caller();
        let id = self.archive(|| ArchivedError::from_panic(&self.name, payload), location);
        let message = panic_message(payload);
        self.log(Level::Error, format_args!("panicked: {message}"), None, id, location);
        id
    }

    fn archive(
        &self,
        make: impl FnOnce() -> ArchivedError,
        location: &'static Location<'static>,
    ) -> Option<ErrorId> {
        if self.is_debug() {
            return None;
        }

        match self.errors.write(&make()) {
            Ok(id) => Some(id),
            Err(err) => {
                let message = "failed to archive error";
                self.log(Level::Error, format_args!("{message}"), Some(&err), None, location);
                None
            }
        }
    }

    fn log(
        &self,
        level: Level,
        args: fmt::Arguments<'_>,
        error: Option<&(dyn StdError + 'static)>,
        id: Option<ErrorId>,
        location: &'static Location<'static>,
    ) {
        let metadata = Metadata::builder().level(level).target(&self.name).build();
        if !self.backend.enabled(&metadata) {
            return;
        }

        let mut kvs = Vec::with_capacity(2);
        if let Some(error) = error {
            kvs.push(("error", Value::from_dyn_error(error)));
        }
        if let Some(id) = &id {
            kvs.push(("error_id", Value::from_display(id)));
        }

        self.backend.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .file(Some(location.file()))
                .line(Some(location.line()))
                .key_values(&kvs)
                .build(),
        );
    }
}

/// The default backend: forwards to whatever logger is installed with [`log::set_logger`].
///
/// Records above [`log::max_level`] are dropped, as the `log` macros would do.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalLog;

impl Log for GlobalLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() <= log::max_level() {
            log::logger().log(record);
        }
    }

    fn flush(&self) {
        log::logger().flush();
    }
}
