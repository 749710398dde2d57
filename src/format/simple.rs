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

use std::borrow::Cow;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::event::LogEvent;
use crate::format::Formatter;

/// The default line format.
pub const DEFAULT_FORMAT: &str = "%timestamp% %priorityName% (%priority%): %message%";

/// A formatter driven by a format string with `%name%` placeholders.
///
/// The placeholders `%timestamp%`, `%message%`, `%priority%` and `%priorityName%` refer to the
/// event fields; any other name is looked up among the event extras. Placeholders that match
/// nothing are kept verbatim.
///
/// Output format (with the default format string):
///
/// ```text
/// 2024-08-11T22:44:57+08:00 ERR (3): Hello error!
/// 2024-08-11T22:44:57+08:00 WARN (4): Hello warn!
/// 2024-08-11T22:44:57+08:00 INFO (6): Hello info!
/// ```
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use maillog::format::SimpleFormatter;
///
/// let formatter = SimpleFormatter::default().timezone(TimeZone::UTC);
/// let custom = SimpleFormatter::new("%priorityName%: %message% (user=%user%)");
/// ```
#[derive(Debug, Clone)]
pub struct SimpleFormatter {
    format: Cow<'static, str>,
    timezone: TimeZone,
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT)
    }
}

impl SimpleFormatter {
    /// Create a formatter with a custom format string.
    pub fn new(format: impl Into<Cow<'static, str>>) -> Self {
        Self {
            format: format.into(),
            timezone: TimeZone::system(),
        }
    }

    /// Set the timezone for timestamps.
    ///
    /// Defaults to the system timezone if not set.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    fn format_timestamp(&self, ts: Timestamp) -> String {
        ts.to_zoned(self.timezone.clone())
            .strftime("%Y-%m-%dT%H:%M:%S%:z")
            .to_string()
    }

    fn field(&self, event: &LogEvent, key: &str) -> Option<String> {
        match key {
            "timestamp" => Some(self.format_timestamp(event.timestamp())),
            "message" => Some(event.message().to_string()),
            "priority" => Some(event.priority().to_string()),
            "priorityName" => Some(event.priority_name().to_string()),
            _ => event.extra(key).map(str::to_string),
        }
    }
}

impl Formatter for SimpleFormatter {
    fn format(&self, event: &LogEvent) -> String {
        let mut text = String::with_capacity(self.format.len() + event.message().len());
        let mut rest: &str = &self.format;

        while let Some(start) = rest.find('%') {
            text.push_str(&rest[..start]);
            let tail = &rest[start + 1..];
            match tail
                .find('%')
                .and_then(|end| self.field(event, &tail[..end]).map(|v| (end, v)))
            {
                Some((end, value)) => {
                    text.push_str(&value);
                    rest = &tail[end + 1..];
                }
                None => {
                    text.push('%');
                    rest = tail;
                }
            }
        }

        text.push_str(rest);
        text
    }
}
