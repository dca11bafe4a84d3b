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

//! The logging backend: dispatches of filters and appenders behind [`log::Log`].
//!
//! Named loggers forward their records here, either through the global `log` logger (set up with
//! [`Builder::apply`]) or directly when a [`Dispatcher`] is handed to
//! [`LoggerRepository::with_backend`](crate::LoggerRepository::with_backend).

mod builder;
mod log_impl;

pub use self::builder::Builder;
pub use self::builder::builder;
pub use self::builder::stderr;
pub use self::builder::stdout;
pub use self::log_impl::Dispatcher;
