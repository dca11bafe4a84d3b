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

use log::LevelFilter;

use super::log_impl::Dispatch;
use super::log_impl::Dispatcher;
use crate::append;
use crate::append::Append;
use crate::filter::Filter;

/// Create a new empty [builder][Builder].
///
/// At least one append must be added before the builder can be finished:
///
/// ```rust
/// use log::LevelFilter;
/// use logkeep::append;
///
/// let dispatcher = logkeep::dispatch::builder()
///     // .build()  CANNOT COMPILE: a staging dispatch without Append
///     .filter(LevelFilter::Info)
///     .append(append::Stdout::default())
///     .dispatch() // finish the current dispatch and start a new one
///     .filter(LevelFilter::Error)
///     .append(append::Stderr::default())
///     .build();
/// ```
pub fn builder() -> Builder<false> {
    Builder::default()
}

/// Create a new [`Builder`] with a default `Stdout` append configured.
pub fn stdout() -> Builder<true> {
    builder().append(append::Stdout::default())
}

/// Create a new [`Builder`] with a default `Stderr` append configured.
pub fn stderr() -> Builder<true> {
    builder().append(append::Stderr::default())
}

/// A builder for configuring the backend. See also [`builder`] for a fluent API.
///
/// * `READY=false`: The initialized state. You can configure [`Filter`]s and [`Append`]s for the
///   current staging dispatch. Once at least one append is configured, the builder transit to
///   `READY=true`.
/// * `READY=true`: The builder can be [built][Builder::build] or [applied][Builder::apply]. Or,
///   you can start a new staging dispatch by calling [dispatch][Builder::dispatch].
#[must_use = "call `build` to create a dispatcher or `apply` to set the global logger"]
#[derive(Debug)]
pub struct Builder<const READY: bool = true> {
    // for current dispatch
    filters: Vec<Filter>,
    appends: Vec<Box<dyn Append>>,

    // stashed dispatches
    dispatches: Vec<Dispatch>,

    // default to trace - we need this because the global default is OFF
    max_level: LevelFilter,
}

impl Default for Builder<false> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const READY: bool> Builder<READY> {
    /// Add an [`Append`] to the under constructing `Dispatch`.
    pub fn append(mut self, append: impl Append) -> Builder<true> {
        self.appends.push(Box::new(append));

        Builder {
            filters: self.filters,
            appends: self.appends,
            dispatches: self.dispatches,
            max_level: self.max_level,
        }
    }

    /// Set the global maximum log level.
    ///
    /// This will be passed to [`log::set_max_level`] on [`Builder::apply`].
    pub fn max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }
}

impl Builder<false> {
    /// Create a new empty [`Builder`].
    pub fn new() -> Self {
        Self {
            filters: vec![],
            appends: vec![],
            dispatches: vec![],
            max_level: LevelFilter::Trace,
        }
    }

    /// Add a [`Filter`] to the under constructing `Dispatch`.
    pub fn filter(mut self, filter: impl Into<Filter>) -> Builder<false> {
        self.filters.push(filter.into());
        self
    }
}

impl Builder<true> {
    /// Construct a new `Dispatch` with the configured [`Filter`]s and [`Append`]s.
    pub fn dispatch(mut self) -> Builder<false> {
        let dispatch = Dispatch::new(self.filters, self.appends);
        self.dispatches.push(dispatch);

        Builder {
            filters: vec![],
            appends: vec![],
            dispatches: self.dispatches,
            max_level: self.max_level,
        }
    }

    /// Finish the staging dispatch and return the [`Dispatcher`] without installing it.
    pub fn build(self) -> Dispatcher {
        let mut dispatches = self.dispatches;
        dispatches.push(Dispatch::new(self.filters, self.appends));
        Dispatcher::new(dispatches)
    }

    /// Set up the global logger with all the dispatches configured.
    ///
    /// This should be called early in the execution of a Rust program. Any log events that occur
    /// before initialization will be ignored.
    ///
    /// # Errors
    ///
    /// This function will fail if it is called more than once, or if another library has already
    /// initialized a global logger.
    pub fn try_apply(self) -> Result<(), log::SetLoggerError> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self.build()))?;
        log::set_max_level(max_level);
        Ok(())
    }

    /// Set up the global logger with all the dispatches configured.
    ///
    /// # Panics
    ///
    /// This function will panic if it is called more than once, or if another library has already
    /// initialized a global logger.
    pub fn apply(self) {
        self.try_apply()
            .expect("Builder::apply should not be called after the global logger initialized");
    }
}
