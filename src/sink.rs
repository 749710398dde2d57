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
use crate::ErrorKind;
use crate::buffer::EventBuffer;
use crate::event::LogEvent;
use crate::filter;
use crate::filter::Filter;
use crate::format::Formatter;
use crate::format::SimpleFormatter;
use crate::mail::Compose;
use crate::render::BodyRenderer;
use crate::render::Render;
use crate::subject::SubjectComposer;
use crate::transport::Transport;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A log sink that buffers events and mails them all at once on shutdown.
///
/// [`write`](MailSink::write) only buffers. [`shutdown`](MailSink::shutdown) renders the buffered
/// events into a plain text body (and an HTML body when a layout is attached), composes the
/// subject, and hands one message to the transport. Failures while shutting down are reported
/// to the sink's [`Trap`] and never returned or panicked.
///
/// Delivery happens only in `shutdown`. Dropping a sink that still holds events sends nothing and
/// reports an [`ErrorKind::Discarded`] error instead.
///
/// # Examples
///
/// ```
/// use maillog::LogEvent;
/// use maillog::MailSink;
/// use maillog::Priority;
/// use maillog::mail::Compose;
/// use maillog::mail::Mail;
/// use maillog::transport::Recording;
///
/// let mut mail = Mail::default();
/// mail.set_from("log@example.com".parse().unwrap());
/// mail.add_to("admin@example.com".parse().unwrap());
///
/// let transport = Recording::default();
/// let mut sink = MailSink::new(mail, transport.clone());
/// sink.set_subject_prepend_text("[app]").unwrap();
///
/// sink.write(LogEvent::new(Priority::Err, "something failed"));
/// sink.shutdown();
///
/// assert!(transport.last().unwrap().header().contains("Subject: [app] (ERR=1)"));
/// ```
#[derive(Debug)]
pub struct MailSink {
    mail: Box<dyn Compose>,
    transport: Box<dyn Transport>,
    layout: Option<Box<dyn Render>>,
    formatter: Box<dyn Formatter>,
    layout_formatter: Option<Box<dyn Formatter>>,
    subject: SubjectComposer,
    filters: Vec<Box<dyn Filter>>,
    trap: Box<dyn Trap>,
    buffer: EventBuffer,
    shutdown: bool,
}

impl MailSink {
    /// Create a sink composing with `mail` and delivering through `transport`.
    pub fn new(
        mail: impl Into<Box<dyn Compose>>,
        transport: impl Into<Box<dyn Transport>>,
    ) -> Self {
        Self {
            mail: mail.into(),
            transport: transport.into(),
            layout: None,
            formatter: Box::new(SimpleFormatter::default()),
            layout_formatter: None,
            subject: SubjectComposer::default(),
            filters: vec![],
            trap: Box::new(DefaultTrap::default()),
            buffer: EventBuffer::default(),
            shutdown: false,
        }
    }

    /// Attach a layout renderer producing an HTML body.
    ///
    /// The layout formats its input with [`SimpleFormatter`] until
    /// [`set_layout_formatter`](MailSink::set_layout_formatter) says otherwise.
    pub fn with_layout(mut self, layout: impl Into<Box<dyn Render>>) -> Self {
        self.layout = Some(layout.into());
        if self.layout_formatter.is_none() {
            self.layout_formatter = Some(Box::new(SimpleFormatter::default()));
        }
        self
    }

    /// Set the formatter for the plain text body.
    ///
    /// Default to [`SimpleFormatter`].
    pub fn with_formatter(mut self, formatter: impl Into<Box<dyn Formatter>>) -> Self {
        self.formatter = formatter.into();
        self
    }

    /// Add a filter deciding which events are buffered.
    pub fn with_filter(mut self, filter: impl Into<Box<dyn Filter>>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Set the trap receiving shutdown errors.
    ///
    /// Default to [`DefaultTrap`].
    pub fn with_trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    /// Set the formatter used for the layout's input.
    ///
    /// # Errors
    ///
    /// Return a configuration error if no layout is attached.
    pub fn set_layout_formatter(
        &mut self,
        formatter: impl Into<Box<dyn Formatter>>,
    ) -> Result<&mut Self, Error> {
        if self.layout.is_none() {
            return Err(Error::config(
                "a layout formatter cannot be set without a layout attached",
            ));
        }
        self.layout_formatter = Some(formatter.into());
        Ok(self)
    }

    /// The formatter used for the layout's input, or `None` without a layout.
    pub fn layout_formatter(&self) -> Option<&dyn Formatter> {
        self.layout_formatter.as_deref()
    }

    /// Compose the subject as `text` followed by a per-priority summary, e.g. `text (ERR=2)`.
    ///
    /// # Errors
    ///
    /// Return a configuration error if the mail already has a subject or prepend text was set
    /// before.
    pub fn set_subject_prepend_text(
        &mut self,
        text: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        self.subject.set_prepend_text(&*self.mail, text.into())?;
        Ok(self)
    }

    /// The message composer.
    pub fn mail(&self) -> &dyn Compose {
        &*self.mail
    }

    /// The message composer, for adjustments before shutdown.
    pub fn mail_mut(&mut self) -> &mut dyn Compose {
        &mut *self.mail
    }

    /// The number of buffered events.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Whether [`shutdown`](MailSink::shutdown) has run.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    /// Buffer an event.
    ///
    /// Events rejected by a filter, and events written after shutdown, are dropped.
    pub fn write(&mut self, event: LogEvent) {
        if self.shutdown || !filter::accepts(&self.filters, &event) {
            return;
        }
        self.buffer.push(event);
    }

    /// Mail every buffered event and release the buffer.
    ///
    /// Only the first call does anything, and nothing is sent if no event was buffered.
    pub fn shutdown(&mut self) {
        if self.shutdown {
            return;
        }
        self.shutdown = true;
        if self.buffer.is_empty() {
            return;
        }

        if let Some(subject) = self.subject.compose(&*self.mail, &self.buffer) {
            self.mail.set_subject(subject);
        }
        let events = self.buffer.drain();

        let mut renderer = BodyRenderer::new(&*self.formatter);
        if let (Some(layout), Some(formatter)) = (&self.layout, &self.layout_formatter) {
            renderer = renderer.with_layout(&**layout, &**formatter);
        }
        let body = renderer.render(&events, &*self.trap);

        let message = match self.mail.build(&body) {
            Ok(message) => message,
            Err(err) => {
                let err = Error::new(
                    ErrorKind::Compose,
                    "unable to compose log entries into an email",
                )
                .with_context("events", events.len())
                .with_source(err);
                self.trap.trap(&err);
                return;
            }
        };

        if let Err(err) = self.transport.send(&message) {
            let err = Error::new(ErrorKind::Transport, "unable to send log entries via email")
                .with_context("events", events.len())
                .with_source(err);
            self.trap.trap(&err);
        }
    }
}

impl Drop for MailSink {
    fn drop(&mut self) {
        if !self.shutdown && !self.buffer.is_empty() {
            let err = Error::new(
                ErrorKind::Discarded,
                "mail sink dropped without shutdown; buffered log entries were not sent",
            )
            .with_context("events", self.buffer.len());
            self.trap.trap(&err);
        }
    }
}
