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

use std::ops::Deref;
use std::sync::Arc;

use crate::Logger;
use crate::repository::Registry;

/// The logger that controls the debug mode of all loggers of its repository.
///
/// It logs like any other [`Logger`], under the name `root`.
#[derive(Debug)]
pub struct RootLogger {
    logger: Logger,
    registry: Arc<Registry>,
}

impl RootLogger {
    pub(crate) fn new(logger: Logger, registry: Arc<Registry>) -> Self {
        Self { logger, registry }
    }

    /// Set the debug mode of the root logger, every registered logger, and every logger created
    /// later.
    pub fn set_debug(&self, debug: bool) {
        // hold the write lock so no logger is created with the previous mode
        let loggers = self.registry.write();
        self.registry.set_debug(debug);
        self.logger.set_debug(debug);
        for logger in loggers.values() {
            logger.set_debug(debug);
        }
    }
}

impl Deref for RootLogger {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.logger
    }
}
