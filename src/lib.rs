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

//! Logkeep hands out named loggers that forward to the [`log`] ecosystem and keep an on-disk
//! archive of the errors they report.
//!
//! # Overview
//!
//! Every [`Logger`] has a name, which becomes the target of its records. Reporting an error with
//! [`Logger::error`] and friends logs it and also writes it to the [`ErrorArchive`] under a random
//! [`ErrorId`]. The id is attached to the log record and returned to the caller, so it can be
//! shown to a user and looked up later with [`ErrorArchive::read`].
//!
//! In debug mode, loggers emit debug records and skip archiving. The [`RootLogger`] switches the
//! debug mode of all loggers at once.
//!
//! The [`dispatch`] module provides the backend that formats and writes the records.
//!
//! # Examples
//!
//! ```
//! use logkeep::Config;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = Config {
//!     errors: dir.path().to_path_buf(),
//!     debug: false,
//!     ..Config::default()
//! };
//! config.install_backend().unwrap();
//! logkeep::init(&config).unwrap();
//!
//! let logger = logkeep::logger("billing");
//! logger.info("charging card");
//! let id = logger.error("card declined").unwrap();
//!
//! assert_eq!(logkeep::errors().read(id).unwrap().message(), "card declined");
//!
//! let value = logkeep::run(|| -> u32 { panic!("worker crashed") });
//! assert!(value.is_none());
//! assert_eq!(logkeep::errors().len().unwrap(), 2);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod archive;
pub mod config;
pub mod dispatch;
pub mod filter;
pub mod layout;

pub use append::Append;
pub use archive::ArchivedError;
pub use archive::ErrorArchive;
pub use archive::ErrorId;
pub use config::Config;
pub use filter::Filter;
pub use layout::Layout;

mod error;
pub use error::Error;

mod logger;
pub use logger::GlobalLog;
pub use logger::Logger;

mod repository;
pub use repository::LoggerRepository;
pub use repository::ROOT_LOGGER_NAME;

mod root;
pub use root::RootLogger;

mod global;
pub use global::errors;
pub use global::init;
pub use global::logger;
pub use global::logger_for;
pub use global::repository;
pub use global::root_logger;
pub use global::run;
pub use global::run_result;

/// Get the logger named after the current module from the process-wide repository.
///
/// ```
/// let logger = logkeep::module_logger!();
/// assert_eq!(logger.name(), module_path!());
/// ```
#[macro_export]
macro_rules! module_logger {
    () => {
        $crate::logger(::std::module_path!())
    };
}
