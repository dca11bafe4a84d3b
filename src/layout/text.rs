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

#[cfg(feature = "colored")]
use colored::Color;
#[cfg(feature = "colored")]
use colored::Colorize;
use jiff::Timestamp;
use jiff::Zoned;
use jiff::tz::TimeZone;
use log::Level;

use crate::layout::Layout;
use crate::layout::kv::KvDisplay;

/// A layout that formats log record as text.
///
/// Output format:
///
/// ```text
/// 2024-08-11T22:44:57.172105+08:00 ERROR billing: src/charge.rs:51 card declined error=insufficient funds error_id=2b1f...
/// 2024-08-11T22:44:57.172219+08:00  WARN billing: src/charge.rs:52 retrying
/// 2024-08-11T22:44:57.172276+08:00  INFO root: src/main.rs:12 started
/// ```
///
/// By default, log levels are colored. You can turn it off with [`TextLayout::no_color`].
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    #[cfg(feature = "colored")]
    colors: LevelColor,
    no_color: bool,
    tz: Option<TimeZone>,
}

/// Colors for the log levels.
#[cfg(feature = "colored")]
#[derive(Debug, Clone)]
pub struct LevelColor {
    pub error: Color,
    pub warn: Color,
    pub info: Color,
    pub debug: Color,
    pub trace: Color,
}

#[cfg(feature = "colored")]
impl Default for LevelColor {
    fn default() -> Self {
        Self {
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Blue,
            trace: Color::Magenta,
        }
    }
}

#[cfg(feature = "colored")]
impl LevelColor {
    fn of(&self, level: Level) -> Color {
        match level {
            Level::Error => self.error,
            Level::Warn => self.warn,
            Level::Info => self.info,
            Level::Debug => self.debug,
            Level::Trace => self.trace,
        }
    }
}

impl TextLayout {
    /// Customize the level colors.
    #[cfg(feature = "colored")]
    pub fn colors(mut self, colors: LevelColor) -> Self {
        self.colors = colors;
        self
    }

    /// Disables colored output.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Sets the timezone for timestamps.
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use logkeep::layout::TextLayout;
    ///
    /// let layout = TextLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    fn format_level(&self, level: Level) -> String {
        let text = format!("{:>5}", level.as_str());
        if self.no_color {
            return text;
        }
        #[cfg(feature = "colored")]
        let text = text.color(self.colors.of(level)).to_string();
        text
    }

    pub(crate) fn format(&self, record: &log::Record) -> anyhow::Result<Vec<u8>> {
        let time = match self.tz.clone() {
            Some(tz) => Timestamp::now().to_zoned(tz),
            None => Zoned::now(),
        };
        let time = time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z");
        let level = self.format_level(record.level());
        let target = record.target();
        let file = record.file().unwrap_or_default();
        let line = record.line().unwrap_or_default();
        let message = record.args();
        let kvs = KvDisplay::new(record.key_values());

        Ok(format!("{time} {level} {target}: {file}:{line} {message}{kvs}").into_bytes())
    }
}

impl From<TextLayout> for Layout {
    fn from(layout: TextLayout) -> Self {
        Layout::Text(layout)
    }
}

#[cfg(test)]
mod tests {
    use log::Level;
    use log::Record;

    use super::*;

    #[test]
    fn test_plain_text_line() {
        let layout = TextLayout::default().no_color().timezone(TimeZone::UTC);
        let kvs = [("user", "ana"), ("attempt", "3")];
        let bytes = layout
            .format(
                &Record::builder()
                    .args(format_args!("login failed"))
                    .level(Level::Warn)
                    .target("app::auth")
                    .file(Some("src/auth.rs"))
                    .line(Some(42))
                    .key_values(&kvs)
                    .build(),
            )
            .unwrap();
        let line = String::from_utf8(bytes).unwrap();

        assert!(line.contains("+00:00  WARN app::auth: src/auth.rs:42 login failed"));
        assert!(line.ends_with(" user=ana attempt=3"));
    }
}
