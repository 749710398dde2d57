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

//! The flat configuration map accepted by [`SinkFactory`](crate::factory::SinkFactory).

use lettre::message::Mailbox;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::Error;
use crate::event::Priority;
use crate::mail::mailbox;
use crate::render::LayoutOptions;

/// Configuration of a mail sink.
///
/// Keys are camelCase; unknown keys are ignored.
///
/// # Examples
///
/// ```
/// use maillog::config::MailConfig;
///
/// let config = MailConfig::from_json(
///     r#"{
///         "from": { "email": "log@example.com", "name": "Application" },
///         "to": ["ops@example.com", { "John Doe": "john@example.com" }],
///         "subjectPrependText": "[error] exceptions on my application"
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(config.to.unwrap().mailboxes().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailConfig {
    /// The sender.
    pub from: Option<Sender>,
    /// `To` recipients.
    pub to: Option<Recipients>,
    /// `Cc` recipients.
    pub cc: Option<Recipients>,
    /// A fixed subject line.
    pub subject: Option<String>,
    /// Text placed before the per-priority summary in a composed subject.
    pub subject_prepend_text: Option<String>,
    /// The charset declared on text bodies.
    pub charset: Option<String>,
    /// The registered composer to use.
    pub class: Option<String>,
    /// The registered layout renderer to use.
    pub layout: Option<String>,
    /// Options passed verbatim to the layout renderer.
    pub layout_options: Option<LayoutOptions>,
    /// The registered formatter to attach to the layout.
    pub layout_formatter: Option<String>,
    /// The least severe priority that is still buffered.
    pub priority: Option<PriorityConfig>,
    /// Settings for the SMTP transport.
    pub smtp: Option<SmtpConfig>,
}

impl MailConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json)
            .map_err(|err| Error::config("malformed mail sink configuration").with_source(err))
    }

    /// Convert a configuration from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        serde_json::from_value(value)
            .map_err(|err| Error::config("malformed mail sink configuration").with_source(err))
    }
}

/// The sender: a bare address or an address with a display name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Sender {
    /// `"log@example.com"`
    Address(String),
    /// `{"email": "log@example.com", "name": "Application"}`
    Named {
        /// The address.
        email: String,
        /// The display name.
        name: Option<String>,
    },
}

impl Sender {
    /// Parse into a mailbox.
    pub fn mailbox(&self) -> Result<Mailbox, Error> {
        match self {
            Sender::Address(email) => mailbox(email, None),
            Sender::Named { email, name } => mailbox(email, name.as_deref()),
        }
    }
}

/// One recipient inside a recipient list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipientEntry {
    /// A bare address.
    Address(String),
    /// `{"display name": "address"}` entries, in configured order.
    Named(Map<String, Value>),
}

/// The accepted shapes of `to` and `cc`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    /// A single address.
    Single(String),
    /// An ordered list of addresses and named entries.
    List(Vec<RecipientEntry>),
    /// A map from display name to address, in configured order.
    Named(Map<String, Value>),
}

impl Recipients {
    /// Normalize into mailboxes, keeping the configured order.
    pub fn mailboxes(&self) -> Result<Vec<Mailbox>, Error> {
        let mut mailboxes = vec![];
        match self {
            Recipients::Single(email) => mailboxes.push(mailbox(email, None)?),
            Recipients::List(entries) => {
                for entry in entries {
                    match entry {
                        RecipientEntry::Address(email) => mailboxes.push(mailbox(email, None)?),
                        RecipientEntry::Named(named) => named_mailboxes(named, &mut mailboxes)?,
                    }
                }
            }
            Recipients::Named(named) => named_mailboxes(named, &mut mailboxes)?,
        }
        Ok(mailboxes)
    }
}

fn named_mailboxes(named: &Map<String, Value>, mailboxes: &mut Vec<Mailbox>) -> Result<(), Error> {
    for (name, email) in named {
        let email = email.as_str().ok_or_else(|| {
            Error::config("recipient address must be a string")
                .with_context("name", name)
                .with_context("value", email)
        })?;
        mailboxes.push(mailbox(email, Some(name))?);
    }
    Ok(())
}

/// A priority given by label (`"WARN"`) or number (`4`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriorityConfig {
    /// A numeric priority; custom priorities beyond `7` are allowed.
    Value(u8),
    /// A standard priority label.
    Label(String),
}

impl PriorityConfig {
    /// The numeric threshold.
    pub fn value(&self) -> Result<u8, Error> {
        match self {
            PriorityConfig::Value(value) => Ok(*value),
            PriorityConfig::Label(label) => label.parse::<Priority>().map(|p| p.value()),
        }
    }
}

/// Settings for the SMTP transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpConfig {
    /// The relay host.
    pub host: String,
    /// The port; the transport default when unset.
    pub port: Option<u16>,
    /// The login name.
    pub username: Option<String>,
    /// The password.
    pub password: Option<String>,
    /// Whether to connect with TLS.
    #[serde(default = "default_tls")]
    pub tls: bool,
}

fn default_tls() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rendered(recipients: &Recipients) -> Vec<String> {
        recipients
            .mailboxes()
            .unwrap()
            .iter()
            .map(|m| m.email.to_string())
            .collect()
    }

    #[test]
    fn test_recipient_shapes() {
        let config = MailConfig::from_value(json!({
            "to": "admin@domain.com",
            "cc": [{ "John Doe": "admin1@domain.com" }, "admin2@domain.com"],
        }))
        .unwrap();

        assert_eq!(rendered(config.to.as_ref().unwrap()), ["admin@domain.com"]);
        assert_eq!(
            rendered(config.cc.as_ref().unwrap()),
            ["admin1@domain.com", "admin2@domain.com"]
        );

        let cc = config.cc.unwrap().mailboxes().unwrap();
        assert_eq!(cc[0].name.as_deref(), Some("John Doe"));
        assert_eq!(cc[1].name, None);
    }

    #[test]
    fn test_named_map_keeps_configured_order() {
        let config = MailConfig::from_json(
            r#"{
                "to": { "zed": "z@x.com", "amy": "a@x.com" },
                "cc": [{ "project": "projectname@domain.com", "bugs": "bug@domain.com" }]
            }"#,
        )
        .unwrap();

        let to = config.to.unwrap().mailboxes().unwrap();
        let to: Vec<String> = to.iter().map(ToString::to_string).collect();
        assert_eq!(to, ["zed <z@x.com>", "amy <a@x.com>"]);
        assert_eq!(
            rendered(config.cc.as_ref().unwrap()),
            ["projectname@domain.com", "bug@domain.com"]
        );

        let config = MailConfig::from_value(json!({ "to": { "John Doe": 42 } })).unwrap();
        let err = config.to.unwrap().mailboxes().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }

    #[test]
    fn test_malformed_shapes() {
        assert!(MailConfig::from_value(json!({ "to": 42 })).is_err());
        assert!(MailConfig::from_value(json!({ "cc": [["nested"]] })).is_err());
        assert!(MailConfig::from_json("{ not json").is_err());

        let config = MailConfig::from_value(json!({ "to": "not an address" })).unwrap();
        assert!(config.to.unwrap().mailboxes().is_err());
    }

    #[test]
    fn test_sender_and_priority() {
        let config = MailConfig::from_value(json!({
            "from": { "email": "log@test.example.com" },
            "priority": "warn",
        }))
        .unwrap();

        let from = config.from.unwrap().mailbox().unwrap();
        assert_eq!(from.to_string(), "log@test.example.com");
        assert_eq!(config.priority.unwrap().value().unwrap(), 4);

        let config = MailConfig::from_value(json!({ "priority": 3 })).unwrap();
        assert_eq!(config.priority.unwrap().value().unwrap(), 3);
    }

    #[test]
    fn test_smtp_defaults_to_tls() {
        let config = MailConfig::from_value(json!({
            "smtp": { "host": "smtp.example.com", "port": 465 },
        }))
        .unwrap();

        let smtp = config.smtp.unwrap();
        assert!(smtp.tls);
        assert_eq!(smtp.port, Some(465));
    }
}
