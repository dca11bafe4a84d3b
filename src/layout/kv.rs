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

use std::fmt;

use log::kv::Key;
use log::kv::Source;
use log::kv::Value;
use log::kv::VisitSource;

/// Renders key-values as ` key=value` pairs.
pub(crate) struct KvDisplay<'kvs> {
    kvs: &'kvs dyn Source,
}

impl<'kvs> KvDisplay<'kvs> {
    pub(crate) fn new(kvs: &'kvs dyn Source) -> Self {
        Self { kvs }
    }
}

impl fmt::Display for KvDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visitor = KvWriter { writer: f };
        self.kvs.visit(&mut visitor).map_err(|_| fmt::Error)
    }
}

struct KvWriter<'a, 'b> {
    writer: &'a mut fmt::Formatter<'b>,
}

impl<'kvs> VisitSource<'kvs> for KvWriter<'_, '_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), log::kv::Error> {
        write!(self.writer, " {key}={value}")?;
        Ok(())
    }
}
