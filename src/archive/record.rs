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
use std::backtrace::Backtrace;
use std::backtrace::BacktraceStatus;
use std::error::Error as StdError;
use std::fmt;
use std::thread;

use jiff::Timestamp;
use serde::Deserialize;
use serde::Serialize;

/// What produced an [`ArchivedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// A plain message reported at error level.
    Message,
    /// A value implementing [`std::error::Error`].
    Error,
    /// A panic payload caught by [`LoggerRepository::run`](crate::LoggerRepository::run).
    Panic,
}

/// The persisted form of a reported error.
///
/// Rust errors are not serializable in general, so the archive keeps what can be rendered from
/// them: the display text, the debug text, and the chain of sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedError {
    kind: ErrorKind,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    causes: Vec<String>,
    logger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thread: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backtrace: Option<String>,
}

impl ArchivedError {
    /// Archive a bare message, as reported by [`Logger::error`](crate::Logger::error).
    pub fn from_message(logger: &str, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Message, logger, message.to_string())
    }

    /// Archive an error value together with its source chain.
    pub fn from_error(logger: &str, error: &(dyn StdError + 'static)) -> Self {
        let mut archived = Self::new(ErrorKind::Error, logger, error.to_string());
        archived.detail = Some(format!("{error:?}"));
        archived.causes = source_chain(error);
        archived
    }

    /// Archive the payload of a caught panic.
    pub fn from_panic(logger: &str, payload: &(dyn Any + Send)) -> Self {
        Self::new(ErrorKind::Panic, logger, panic_message(payload).to_string())
    }

    /// Attach the log message the error was reported with.
    pub fn with_context(mut self, context: impl fmt::Display) -> Self {
        self.context = Some(context.to_string());
        self
    }

    fn new(kind: ErrorKind, logger: &str, message: String) -> Self {
        Self {
            kind,
            message,
            detail: None,
            causes: vec![],
            logger: logger.to_string(),
            context: None,
            timestamp: Timestamp::now(),
            thread: thread::current().name().map(ToOwned::to_owned),
            backtrace: capture_backtrace(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `Debug` rendering of the original error, if it was an error value.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Display texts of [`source`](std::error::Error::source) errors, outermost first.
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// Name of the logger that reported the error.
    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn thread(&self) -> Option<&str> {
        self.thread.as_deref()
    }

    /// Only present when backtraces are enabled through `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE`.
    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }
}

impl fmt::Display for ArchivedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{context}: ")?;
        }
        write!(f, "{}", self.message)?;
        for cause in &self.causes {
            write!(f, ", caused by: {cause}")?;
        }
        Ok(())
    }
}

/// The text of a panic payload, if it is a string.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Box<dyn Any>"
    }
}

fn source_chain(error: &(dyn StdError + 'static)) -> Vec<String> {
    let mut causes = vec![];
    let mut source = error.source();
    while let Some(err) = source {
        causes.push(err.to_string());
        source = err.source();
    }
    causes
}

fn capture_backtrace() -> Option<String> {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[derive(Debug)]
    struct Outer(io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("failed to load settings")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_keeps_source_chain() {
        let err = Outer(io::Error::new(io::ErrorKind::NotFound, "settings.toml missing"));
        let archived = ArchivedError::from_error("app::settings", &err).with_context("startup");

        assert_eq!(archived.kind(), ErrorKind::Error);
        assert_eq!(archived.message(), "failed to load settings");
        assert_eq!(archived.causes(), ["settings.toml missing"]);
        assert_eq!(archived.logger(), "app::settings");
        assert!(archived.detail().unwrap().starts_with("Outer("));
        assert_eq!(
            archived.to_string(),
            "startup: failed to load settings, caused by: settings.toml missing"
        );
    }

    #[test]
    fn test_panic_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let archived = ArchivedError::from_panic("root", &*payload);
        assert_eq!(archived.kind(), ErrorKind::Panic);
        assert_eq!(archived.message(), "boom");

        let payload: Box<dyn Any + Send> = Box::new(format!("index {} out of range", 7));
        assert_eq!(
            ArchivedError::from_panic("root", &*payload).message(),
            "index 7 out of range"
        );

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(
            ArchivedError::from_panic("root", &*payload).message(),
            "Box<dyn Any>"
        );
    }

    #[test]
    fn test_json_shape() {
        let archived = ArchivedError::from_message("worker", "queue stalled");
        let json = serde_json::to_value(&archived).unwrap();
        assert_eq!(json["kind"], "message");
        assert_eq!(json["message"], "queue stalled");
        assert_eq!(json["logger"], "worker");
        assert!(json.get("causes").is_none());

        let back: ArchivedError = serde_json::from_value(json).unwrap();
        assert_eq!(back, archived);
    }
}
