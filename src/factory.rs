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

//! Building configured sinks from a [`MailConfig`].

use std::collections::BTreeMap;
use std::fmt;

use crate::Error;
use crate::MailSink;
use crate::config::MailConfig;
use crate::filter::PriorityFilter;
use crate::format::Formatter;
use crate::format::SimpleFormatter;
use crate::mail::Compose;
use crate::mail::Mail;
use crate::render::LayoutOptions;
use crate::render::Render;
use crate::render::TemplateLayout;
use crate::transport::Transport;

/// The composer name used when `class` is not configured.
pub const DEFAULT_MAIL: &str = "mail";
/// The layout renderer name used when `layout` is not configured.
pub const DEFAULT_LAYOUT: &str = "template";
/// The name of the built-in [`SimpleFormatter`].
pub const SIMPLE_FORMATTER: &str = "simple";

type MailConstructor = Box<dyn Fn() -> Box<dyn Compose> + Send + Sync>;
type LayoutConstructor =
    Box<dyn Fn(&LayoutOptions) -> Result<Box<dyn Render>, Error> + Send + Sync>;
type FormatterConstructor = Box<dyn Fn() -> Box<dyn Formatter> + Send + Sync>;

/// Named constructors for composers, layout renderers and formatters.
///
/// The `class`, `layout` and `layoutFormatter` configuration keys are resolved here. The default
/// registry knows `mail` ([`Mail`]), `template` ([`TemplateLayout`]) and `simple`
/// ([`SimpleFormatter`]).
///
/// # Examples
///
/// ```
/// use maillog::factory::Registry;
/// use maillog::format::CustomFormatter;
///
/// let mut registry = Registry::default();
/// registry.register_formatter("bare", || CustomFormatter::new(|e| e.message().to_string()));
/// ```
pub struct Registry {
    mails: BTreeMap<String, MailConstructor>,
    layouts: BTreeMap<String, LayoutConstructor>,
    formatters: BTreeMap<String, FormatterConstructor>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("mails", &self.mails.keys().collect::<Vec<_>>())
            .field("layouts", &self.layouts.keys().collect::<Vec<_>>())
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry::empty();
        registry.register_mail(DEFAULT_MAIL, Mail::default);
        registry.register_layout(DEFAULT_LAYOUT, TemplateLayout::from_options);
        registry.register_formatter(SIMPLE_FORMATTER, SimpleFormatter::default);
        registry
    }
}

impl Registry {
    /// A registry without any entry.
    pub fn empty() -> Self {
        Self {
            mails: BTreeMap::new(),
            layouts: BTreeMap::new(),
            formatters: BTreeMap::new(),
        }
    }

    /// Register a composer constructor under `name`.
    pub fn register_mail<F, C>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Compose,
    {
        let f: MailConstructor = Box::new(move || Box::new(f()) as Box<dyn Compose>);
        self.mails.insert(name.into(), f);
        self
    }

    /// Register a layout renderer constructor under `name`.
    ///
    /// The constructor receives the `layoutOptions` map, empty when not configured.
    pub fn register_layout<F, R>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&LayoutOptions) -> Result<R, Error> + Send + Sync + 'static,
        R: Render,
    {
        let f: LayoutConstructor = Box::new(move |options: &LayoutOptions| {
            f(options).map(|r| Box::new(r) as Box<dyn Render>)
        });
        self.layouts.insert(name.into(), f);
        self
    }

    /// Register a formatter constructor under `name`.
    pub fn register_formatter<F, T>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Formatter,
    {
        let f: FormatterConstructor = Box::new(move || Box::new(f()) as Box<dyn Formatter>);
        self.formatters.insert(name.into(), f);
        self
    }

    fn mail(&self, name: &str) -> Result<Box<dyn Compose>, Error> {
        let f = self
            .mails
            .get(name)
            .ok_or_else(|| Error::config("unknown mail class").with_context("class", name))?;
        Ok(f())
    }

    fn layout(&self, name: &str, options: &LayoutOptions) -> Result<Box<dyn Render>, Error> {
        let f = self
            .layouts
            .get(name)
            .ok_or_else(|| Error::config("unknown layout class").with_context("layout", name))?;
        f(options)
    }

    fn formatter(&self, name: &str) -> Result<Box<dyn Formatter>, Error> {
        let f = self.formatters.get(name).ok_or_else(|| {
            Error::config("unknown layout formatter").with_context("layoutFormatter", name)
        })?;
        Ok(f())
    }
}

/// Builds [`MailSink`]s from configuration.
///
/// Every configuration problem is reported here, before any event is buffered.
///
/// # Examples
///
/// ```
/// use maillog::config::MailConfig;
/// use maillog::factory::SinkFactory;
/// use maillog::mail::Compose;
/// use maillog::transport::Recording;
///
/// let config = MailConfig::from_json(
///     r#"{
///         "from": { "email": "log@example.com" },
///         "to": "admin@example.com",
///         "subject": "[error] exceptions on my application"
///     }"#,
/// )
/// .unwrap();
///
/// let sink = SinkFactory::default().build(&config, Recording::default()).unwrap();
/// assert_eq!(sink.mail().subject(), Some("[error] exceptions on my application"));
/// ```
#[derive(Debug, Default)]
pub struct SinkFactory {
    registry: Registry,
}

impl SinkFactory {
    /// Create a factory resolving names through `registry`.
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// The registry, for registering more constructors.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Build a sink delivering through `transport`.
    ///
    /// # Errors
    ///
    /// Return a configuration error for invalid addresses, unknown `class`, `layout` or
    /// `layoutFormatter` names, a `layoutFormatter` without a layout, both `subject` and
    /// `subjectPrependText`, or an invalid `priority`.
    pub fn build(
        &self,
        config: &MailConfig,
        transport: impl Into<Box<dyn Transport>>,
    ) -> Result<MailSink, Error> {
        let mut mail = self
            .registry
            .mail(config.class.as_deref().unwrap_or(DEFAULT_MAIL))?;

        if let Some(from) = &config.from {
            mail.set_from(from.mailbox()?);
        }
        if let Some(to) = &config.to {
            for mailbox in to.mailboxes()? {
                mail.add_to(mailbox);
            }
        }
        if let Some(cc) = &config.cc {
            for mailbox in cc.mailboxes()? {
                mail.add_cc(mailbox);
            }
        }
        if let Some(subject) = &config.subject {
            mail.set_subject(subject.clone());
        }
        if let Some(charset) = &config.charset {
            mail.set_charset(charset.clone());
        }

        let mut sink = MailSink::new(mail, transport);

        if config.layout.is_some() || config.layout_options.is_some() {
            let name = config.layout.as_deref().unwrap_or(DEFAULT_LAYOUT);
            let options = config.layout_options.clone().unwrap_or_default();
            sink = sink.with_layout(self.registry.layout(name, &options)?);
        }

        if let Some(name) = &config.layout_formatter {
            sink.set_layout_formatter(self.registry.formatter(name)?)?;
        }

        if let Some(text) = &config.subject_prepend_text {
            sink.set_subject_prepend_text(text.clone())?;
        }

        if let Some(priority) = &config.priority {
            sink = sink.with_filter(PriorityFilter::from_value(priority.value()?));
        }

        Ok(sink)
    }

    /// Build a sink delivering over SMTP as described by the `smtp` section.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`build`](SinkFactory::build), return a configuration error
    /// if the `smtp` section is missing or invalid.
    #[cfg(feature = "smtp")]
    pub fn build_smtp(&self, config: &MailConfig) -> Result<MailSink, Error> {
        let smtp = config
            .smtp
            .as_ref()
            .ok_or_else(|| Error::config("missing smtp configuration"))?;
        self.build(config, crate::transport::Smtp::new(smtp)?)
    }
}
