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

use std::fmt::Debug;
use std::fmt::Formatter as DebugFormatter;

use crate::event::LogEvent;
use crate::format::Formatter;

type FormatFunction = dyn Fn(&LogEvent) -> String + Send + Sync + 'static;

/// A formatter backed by a user-supplied closure.
///
/// # Examples
///
/// ```
/// use maillog::format::CustomFormatter;
///
/// let formatter =
///     CustomFormatter::new(|event| format!("[{}] {}", event.priority_name(), event.message()));
/// ```
pub struct CustomFormatter {
    f: Box<FormatFunction>,
}

impl Debug for CustomFormatter {
    fn fmt(&self, f: &mut DebugFormatter) -> std::fmt::Result {
        write!(f, "CustomFormatter {{ ... }}")
    }
}

impl CustomFormatter {
    /// Create a formatter from a closure.
    pub fn new(format: impl Fn(&LogEvent) -> String + Send + Sync + 'static) -> Self {
        CustomFormatter {
            f: Box::new(format),
        }
    }
}

impl Formatter for CustomFormatter {
    fn format(&self, event: &LogEvent) -> String {
        (self.f)(event)
    }
}
