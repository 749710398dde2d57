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

//! The message composer: sender, recipients, subject and charset of the outgoing mail.

use std::error;
use std::fmt;

use lettre::Address;
use lettre::Message;
use lettre::address::Envelope;
use lettre::message::Mailbox;
use lettre::message::Mailboxes;
use lettre::message::MultiPart;
use lettre::message::SinglePart;
use lettre::message::header;
use lettre::message::header::ContentType;
use lettre::message::header::Header;
use lettre::message::header::HeaderName;
use lettre::message::header::HeaderValue;

use crate::Error;
use crate::ErrorKind;
use crate::render::RenderedBody;

/// The charset declared on outgoing bodies unless configured otherwise.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Holds the envelope and headers of the outgoing mail and assembles the final message.
///
/// The sink only asks a composer for its subject, sets the subject when it composes one, and
/// calls [`build`](Compose::build) once at shutdown. Everything else is set up by the caller or
/// by the [`SinkFactory`](crate::factory::SinkFactory).
pub trait Compose: fmt::Debug + Send + 'static {
    /// Set the sender.
    fn set_from(&mut self, from: Mailbox);

    /// Add a `To` recipient.
    fn add_to(&mut self, to: Mailbox);

    /// Add a `Cc` recipient.
    fn add_cc(&mut self, cc: Mailbox);

    /// The subject line, if one is set.
    fn subject(&self) -> Option<&str>;

    /// Set the subject line.
    fn set_subject(&mut self, subject: String);

    /// The charset declared on text bodies.
    fn charset(&self) -> &str;

    /// Set the charset declared on text bodies.
    fn set_charset(&mut self, charset: String);

    /// Assemble the message carrying `body`.
    ///
    /// A body without HTML becomes a single `text/plain` part; a body with HTML becomes a
    /// `multipart/alternative` message holding both.
    fn build(&self, body: &RenderedBody) -> Result<Message, Error>;
}

impl<T: Compose> From<T> for Box<dyn Compose> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// The default [`Compose`] implementation, built on [`lettre`]'s message builder.
///
/// `To` and `Cc` are written as `Name <address>`, and the charset is declared exactly as
/// configured.
///
/// # Examples
///
/// ```
/// use maillog::mail::Compose;
/// use maillog::mail::Mail;
///
/// let mut mail = Mail::default();
/// mail.set_from("logs@example.com".parse().unwrap());
/// mail.add_to("John Doe <admin@example.com>".parse().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct Mail {
    from: Option<Mailbox>,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    subject: Option<String>,
    charset: String,
}

impl Default for Mail {
    fn default() -> Self {
        Self {
            from: None,
            to: vec![],
            cc: vec![],
            subject: None,
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

impl Mail {
    /// The sender, if set.
    pub fn from(&self) -> Option<&Mailbox> {
        self.from.as_ref()
    }

    /// The `To` recipients in insertion order.
    pub fn to(&self) -> &[Mailbox] {
        &self.to
    }

    /// The `Cc` recipients in insertion order.
    pub fn cc(&self) -> &[Mailbox] {
        &self.cc
    }

    fn content_type(&self, mime: &str) -> Result<TextContentType, Error> {
        let value = format!("{mime}; charset={}", self.charset);
        ContentType::parse(&value).map_err(|err| {
            Error::new(ErrorKind::Compose, "invalid charset")
                .with_context("charset", &self.charset)
                .with_source(err)
        })?;
        Ok(TextContentType(value))
    }

    fn envelope(&self) -> Result<Envelope, Error> {
        let recipients = self
            .to
            .iter()
            .chain(&self.cc)
            .map(|mailbox| mailbox.email.clone())
            .collect();
        Envelope::new(self.from.as_ref().map(|from| from.email.clone()), recipients)
            .map_err(|err| compose_error(self, err))
    }
}

impl Compose for Mail {
    fn set_from(&mut self, from: Mailbox) {
        self.from = Some(from);
    }

    fn add_to(&mut self, to: Mailbox) {
        self.to.push(to);
    }

    fn add_cc(&mut self, cc: Mailbox) {
        self.cc.push(cc);
    }

    fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    fn set_subject(&mut self, subject: String) {
        self.subject = Some(subject);
    }

    fn charset(&self) -> &str {
        &self.charset
    }

    fn set_charset(&mut self, charset: String) {
        self.charset = charset;
    }

    fn build(&self, body: &RenderedBody) -> Result<Message, Error> {
        let mut builder = Message::builder().envelope(self.envelope()?);
        if let Some(from) = &self.from {
            builder = builder.from(from.clone());
        }
        if !self.to.is_empty() {
            builder = builder.header(ToList(Mailboxes::from(self.to.clone())));
        }
        if !self.cc.is_empty() {
            builder = builder.header(CcList(Mailboxes::from(self.cc.clone())));
        }
        if let Some(subject) = &self.subject {
            builder = builder.subject(subject.clone());
        }

        let text_type = self.content_type("text/plain")?;
        let message = match &body.html {
            None => builder.header(text_type).body(body.text.clone()),
            Some(html) => {
                let html_type = self.content_type("text/html")?;
                builder.multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(text_type)
                                .body(body.text.clone()),
                        )
                        .singlepart(SinglePart::builder().header(html_type).body(html.clone())),
                )
            }
        };

        message.map_err(|err| compose_error(self, err))
    }
}

fn compose_error(mail: &Mail, err: impl error::Error + Send + Sync + 'static) -> Error {
    Error::new(ErrorKind::Compose, "failed to compose log mail")
        .with_context("recipients", mail.to.len() + mail.cc.len())
        .with_source(err)
}

/// A `Content-Type` header that keeps the configured charset exactly as written.
#[derive(Debug, Clone)]
struct TextContentType(String);

impl Header for TextContentType {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Content-Type")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn error::Error + Send + Sync>> {
        Ok(TextContentType(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

// Address lists are written as `Name <address>`, quoting a display name only when it is not a
// plain phrase. Non-ASCII display names go through lettre's encoded-word header instead.
macro_rules! address_list_header {
    ($name:ident, $header:literal, $typed:ty) => {
        #[derive(Debug, Clone)]
        struct $name(Mailboxes);

        impl Header for $name {
            fn name() -> HeaderName {
                HeaderName::new_from_ascii_str($header)
            }

            fn parse(s: &str) -> Result<Self, Box<dyn error::Error + Send + Sync>> {
                Ok($name(s.parse()?))
            }

            fn display(&self) -> HeaderValue {
                let ascii = self
                    .0
                    .iter()
                    .all(|mailbox| mailbox.name.as_deref().is_none_or(str::is_ascii));
                if ascii {
                    HeaderValue::new(Self::name(), self.0.to_string())
                } else {
                    <$typed>::from(self.0.clone()).display()
                }
            }
        }
    };
}

address_list_header!(ToList, "To", header::To);
address_list_header!(CcList, "Cc", header::Cc);

/// Parse an address and attach an optional display name.
pub fn mailbox(email: &str, name: Option<&str>) -> Result<Mailbox, Error> {
    let address = email.parse::<Address>().map_err(|err| {
        Error::config("invalid email address")
            .with_context("address", email)
            .with_source(err)
    })?;
    Ok(Mailbox::new(name.map(str::to_string), address))
}
