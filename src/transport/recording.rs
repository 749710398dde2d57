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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use lettre::Message;

use crate::Error;
use crate::transport::Transport;

/// A message captured by [`Recording`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    recipients: Vec<String>,
    header: String,
    body: String,
}

impl SentMail {
    /// Every envelope recipient (`To` and `Cc`), as bare addresses.
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// The header block of the formatted message.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Everything after the header block.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The multipart boundary declared in the header, if the message is multipart.
    pub fn boundary(&self) -> Option<&str> {
        let (_, rest) = self.header.split_once("boundary=")?;
        let rest = rest.trim_start_matches('"');
        let end = rest
            .find(|c: char| c == '"' || c == ';' || c.is_whitespace())
            .unwrap_or(rest.len());
        Some(&rest[..end]).filter(|b| !b.is_empty())
    }
}

/// A transport that keeps sent messages in memory instead of delivering them.
///
/// Clones share the same store, so keep one clone to inspect what a sink sent.
///
/// # Examples
///
/// ```
/// use maillog::transport::Recording;
///
/// let transport = Recording::default();
/// let handle = transport.clone();
/// assert!(handle.sent().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Recording {
    sent: Arc<Mutex<Vec<SentMail>>>,
}

impl Recording {
    fn lock(&self) -> MutexGuard<'_, Vec<SentMail>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All messages sent so far.
    pub fn sent(&self) -> Vec<SentMail> {
        self.lock().clone()
    }

    /// The most recently sent message.
    pub fn last(&self) -> Option<SentMail> {
        self.lock().last().cloned()
    }
}

impl Transport for Recording {
    fn send(&self, message: &Message) -> Result<(), Error> {
        let recipients = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();

        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();
        let (header, body) = match formatted.split_once("\r\n\r\n") {
            Some((header, body)) => (header.to_string(), body.to_string()),
            None => (formatted, String::new()),
        };

        self.lock().push(SentMail {
            recipients,
            header,
            body,
        });
        Ok(())
    }
}
