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

//! Formatters that turn a [`LogEvent`] into one line of text.

use std::fmt;

use crate::event::LogEvent;

mod custom;
mod simple;

pub use self::custom::CustomFormatter;
pub use self::simple::SimpleFormatter;

/// A formatter that renders one event as one line of mail body text.
///
/// Formatting is pure and cannot fail.
pub trait Formatter: fmt::Debug + Send + 'static {
    /// Format an event into a line, without a trailing line break.
    fn format(&self, event: &LogEvent) -> String;
}

impl<T: Formatter> From<T> for Box<dyn Formatter> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// Format every event with `formatter`, one line per event, each terminated by `\n`.
pub(crate) fn format_lines(events: &[LogEvent], formatter: &dyn Formatter) -> String {
    let mut text = String::new();
    for event in events {
        text.push_str(&formatter.format(event));
        text.push('\n');
    }
    text
}
