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

use crate::event::LogEvent;
use crate::event::Priority;
use crate::filter::Filter;
use crate::filter::FilterResult;

/// Rejects events less severe than a threshold.
///
/// An event passes when its numeric priority is less than or equal to the threshold, so
/// `PriorityFilter::new(Priority::Warn)` keeps `EMERG` through `WARN`.
#[derive(Debug, Clone, Copy)]
pub struct PriorityFilter(u8);

impl PriorityFilter {
    /// Create a filter passing `priority` and everything more severe.
    pub fn new(priority: Priority) -> Self {
        PriorityFilter(priority.value())
    }

    /// Create a filter from a raw numeric threshold, for custom priorities.
    pub fn from_value(priority: u8) -> Self {
        PriorityFilter(priority)
    }
}

impl Filter for PriorityFilter {
    fn matches(&self, event: &LogEvent) -> FilterResult {
        if event.priority() <= self.0 {
            FilterResult::Neutral
        } else {
            FilterResult::Reject
        }
    }
}
