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

//! Filters deciding which events a sink buffers.

use std::fmt;

use crate::event::LogEvent;

mod custom;
mod priority;

pub use self::custom::CustomFilter;
pub use self::priority::PriorityFilter;

/// The result of a filter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// The event will be buffered without further filtering.
    Accept,
    /// The event should not be buffered.
    Reject,
    /// No decision could be made, further filtering should occur.
    Neutral,
}

/// A filter applied to every event written to a sink.
pub trait Filter: fmt::Debug + Send + 'static {
    /// Decide whether the event should be buffered.
    fn matches(&self, event: &LogEvent) -> FilterResult;
}

impl<T: Filter> From<T> for Box<dyn Filter> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// Run `filters` in order; the first non-neutral answer wins, and all-neutral accepts.
pub(crate) fn accepts(filters: &[Box<dyn Filter>], event: &LogEvent) -> bool {
    for filter in filters {
        match filter.matches(event) {
            FilterResult::Reject => return false,
            FilterResult::Accept => return true,
            FilterResult::Neutral => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Priority;

    #[test]
    fn test_first_decision_wins() {
        let filters: Vec<Box<dyn Filter>> = vec![
            CustomFilter::new(|event| {
                if event.message().contains("audit") {
                    FilterResult::Accept
                } else {
                    FilterResult::Neutral
                }
            })
            .into(),
            PriorityFilter::new(Priority::Warn).into(),
        ];

        assert!(accepts(&filters, &LogEvent::new(Priority::Err, "disk full")));
        assert!(accepts(&filters, &LogEvent::new(Priority::Debug, "audit trail")));
        assert!(!accepts(&filters, &LogEvent::new(Priority::Info, "started")));
        assert!(accepts(&[], &LogEvent::new(Priority::Debug, "anything")));
    }
}
