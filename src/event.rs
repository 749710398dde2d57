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

//! Log events and their priorities.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;

use crate::Error;

/// The standard event priorities, most severe first.
///
/// The numeric value of a priority is its position, so `Emerg` is `0` and `Debug` is `7`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum Priority {
    /// System is unusable.
    Emerg = 0,
    /// Action must be taken immediately.
    Alert = 1,
    /// Critical conditions.
    Crit = 2,
    /// Error conditions.
    Err = 3,
    /// Warning conditions.
    Warn = 4,
    /// Normal but significant condition.
    Notice = 5,
    /// Informational messages.
    Info = 6,
    /// Debug messages.
    Debug = 7,
}

const PRIORITIES: [Priority; 8] = [
    Priority::Emerg,
    Priority::Alert,
    Priority::Crit,
    Priority::Err,
    Priority::Warn,
    Priority::Notice,
    Priority::Info,
    Priority::Debug,
];

impl Priority {
    /// Return the label of the priority, e.g. `"INFO"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Emerg => "EMERG",
            Priority::Alert => "ALERT",
            Priority::Crit => "CRIT",
            Priority::Err => "ERR",
            Priority::Warn => "WARN",
            Priority::Notice => "NOTICE",
            Priority::Info => "INFO",
            Priority::Debug => "DEBUG",
        }
    }

    /// Return the numeric value of the priority.
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Look up a standard priority by its numeric value.
    pub fn from_value(value: u8) -> Option<Priority> {
        PRIORITIES.get(value as usize).copied()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Priority, Error> {
        for priority in PRIORITIES {
            if s.eq_ignore_ascii_case(priority.as_str()) {
                return Ok(priority);
            }
        }

        s.parse::<u8>()
            .ok()
            .and_then(Priority::from_value)
            .ok_or_else(|| Error::config(format!("malformed priority: {s:?}")))
    }
}

/// A single log entry handed to a [`MailSink`](crate::MailSink).
///
/// Events are immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
    timestamp: Timestamp,
    message: String,
    priority: u8,
    priority_name: String,
    extras: Vec<(String, String)>,
}

impl LogEvent {
    /// Create an event at the current time with a standard priority.
    pub fn new(priority: Priority, message: impl Into<String>) -> Self {
        Self::builder().priority(priority).message(message).build()
    }

    /// Returns a new builder.
    pub fn builder() -> LogEventBuilder {
        LogEventBuilder::default()
    }

    /// The time the event was observed.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The numeric severity, `0` being the most severe.
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// The severity label, e.g. `"INFO"`.
    pub fn priority_name(&self) -> &str {
        &self.priority_name
    }

    /// Additional named fields attached to the event.
    pub fn extras(&self) -> &[(String, String)] {
        &self.extras
    }

    /// Look up an extra field by name.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for [`LogEvent`].
#[derive(Debug)]
pub struct LogEventBuilder {
    event: LogEvent,
}

impl Default for LogEventBuilder {
    fn default() -> Self {
        LogEventBuilder {
            event: LogEvent {
                timestamp: Timestamp::now(),
                message: String::new(),
                priority: Priority::Info.value(),
                priority_name: Priority::Info.as_str().to_string(),
                extras: vec![],
            },
        }
    }
}

impl LogEventBuilder {
    /// Set [`timestamp`](LogEvent::timestamp).
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.event.timestamp = timestamp;
        self
    }

    /// Set [`message`](LogEvent::message).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.event.message = message.into();
        self
    }

    /// Set both the numeric priority and its label from a standard priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.event.priority = priority.value();
        self.event.priority_name = priority.as_str().to_string();
        self
    }

    /// Set a custom priority that is not one of the standard [`Priority`] values.
    pub fn custom_priority(mut self, priority: u8, name: impl Into<String>) -> Self {
        self.event.priority = priority;
        self.event.priority_name = name.into();
        self
    }

    /// Attach an extra named field.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.event.extras.push((key.into(), value.into()));
        self
    }

    /// Invoke the builder and return a `LogEvent`.
    pub fn build(self) -> LogEvent {
        self.event
    }
}
