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

use std::mem;

use crate::event::LogEvent;

/// An append-only store of events waiting to be mailed.
///
/// Besides the events themselves, the buffer counts entries per priority label, in the order
/// each label first appeared.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<LogEvent>,
    counts: Vec<(String, usize)>,
}

impl EventBuffer {
    /// Append an event.
    pub fn push(&mut self, event: LogEvent) {
        match self
            .counts
            .iter_mut()
            .find(|(name, _)| name == event.priority_name())
        {
            Some((_, n)) => *n += 1,
            None => self.counts.push((event.priority_name().to_string(), 1)),
        }
        self.events.push(event);
    }

    /// The number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event is buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The buffered events in arrival order.
    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// The number of buffered events with the given priority label.
    pub fn count(&self, priority_name: &str) -> usize {
        self.counts
            .iter()
            .find(|(name, _)| name == priority_name)
            .map_or(0, |(_, n)| *n)
    }

    /// Per-label counts in first-occurrence order.
    pub fn counts(&self) -> impl ExactSizeIterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, n)| (name.as_str(), *n))
    }

    /// Render the counts as `INFO=2, WARN=1`.
    pub fn summary(&self) -> String {
        self.counts()
            .map(|(name, n)| format!("{name}={n}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Move every event out of the buffer, leaving it empty.
    pub fn drain(&mut self) -> Vec<LogEvent> {
        self.counts.clear();
        mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Priority;

    #[test]
    fn test_counts_keep_first_occurrence_order() {
        let mut buffer = EventBuffer::default();
        buffer.push(LogEvent::new(Priority::Warn, "a warning message"));
        buffer.push(LogEvent::new(Priority::Info, "an info message"));
        buffer.push(LogEvent::new(Priority::Warn, "another warning"));

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.count("WARN"), 2);
        assert_eq!(buffer.count("INFO"), 1);
        assert_eq!(buffer.count("ERR"), 0);
        assert_eq!(buffer.summary(), "WARN=2, INFO=1");
    }

    #[test]
    fn test_drain_empties_buffer() {
        let mut buffer = EventBuffer::default();
        buffer.push(LogEvent::new(Priority::Info, "an info message"));

        let events = buffer.drain();
        assert_eq!(events.len(), 1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.summary(), "");
    }
}
