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

use crate::Error;
use crate::buffer::EventBuffer;
use crate::mail::Compose;

/// Composes the subject line from fixed prepend text and a per-priority summary.
///
/// With prepend text `[app]` and one `INFO` plus two `WARN` events buffered, the final subject
/// is `[app] (INFO=1, WARN=2)`.
#[derive(Debug, Default, Clone)]
pub struct SubjectComposer {
    prepend_text: Option<String>,
}

impl SubjectComposer {
    /// The prepend text, if set.
    pub fn prepend_text(&self) -> Option<&str> {
        self.prepend_text.as_deref()
    }

    /// Set the prepend text.
    ///
    /// Fails if `mail` already carries a subject, which would be clobbered, or if prepend text
    /// was already set.
    pub fn set_prepend_text(&mut self, mail: &dyn Compose, text: String) -> Result<(), Error> {
        if let Some(subject) = mail.subject() {
            return Err(Error::config(
                "subject already exists on the mail; cannot set subject prepend text",
            )
            .with_context("subject", subject));
        }
        if let Some(existing) = &self.prepend_text {
            return Err(
                Error::config("subject prepend text is already set").with_context("text", existing)
            );
        }

        self.prepend_text = Some(text);
        Ok(())
    }

    /// Compute the final subject for the buffered events.
    ///
    /// Returns `None` when there is no prepend text or when the mail already has a subject.
    pub fn compose(&self, mail: &dyn Compose, buffer: &EventBuffer) -> Option<String> {
        if mail.subject().is_some() {
            return None;
        }
        let prepend = self.prepend_text.as_deref()?;
        if buffer.is_empty() {
            return Some(prepend.to_string());
        }
        Some(format!("{prepend} ({})", buffer.summary()))
    }
}
