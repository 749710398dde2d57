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

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::LogEvent;
use crate::MailSink;
use crate::Priority;

impl From<log::Level> for Priority {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Err,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Debug,
        }
    }
}

/// A [`log::Log`] implementation buffering records into a [`MailSink`].
///
/// Each record becomes a [`LogEvent`] carrying the formatted arguments as message, the record
/// target as the `target` extra, and every key-value pair as another extra.
///
/// The sink is guarded by a mutex. On [`shutdown`](MailLogger::shutdown) it is taken out of the
/// mutex and delivered without holding the lock, so a transport or layout may log through the
/// `log` crate; such records arrive after shutdown and are dropped.
///
/// # Examples
///
/// ```
/// use maillog::MailSink;
/// use maillog::bridge::MailLogger;
/// use maillog::mail::Mail;
/// use maillog::transport::Recording;
///
/// let logger = MailLogger::new(MailSink::new(Mail::default(), Recording::default()));
/// log::Log::log(
///     &logger,
///     &log::Record::builder()
///         .args(format_args!("an info message"))
///         .level(log::Level::Info)
///         .build(),
/// );
/// assert_eq!(logger.with_sink(|sink| sink.buffered()), Some(1));
/// ```
#[derive(Debug)]
pub struct MailLogger {
    sink: Mutex<Option<MailSink>>,
}

impl MailLogger {
    /// Wrap a sink.
    pub fn new(sink: MailSink) -> Self {
        Self {
            sink: Mutex::new(Some(sink)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<MailSink>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the sink.
    ///
    /// Returns `None` while the sink is being delivered by [`shutdown`](MailLogger::shutdown).
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut MailSink) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    /// Shut the sink down, mailing everything buffered so far.
    ///
    /// Records logged while the mail is being delivered are dropped.
    pub fn shutdown(&self) {
        let sink = self.lock().take();
        let Some(mut sink) = sink else {
            return;
        };
        sink.shutdown();
        *self.lock() = Some(sink);
    }

    /// Unwrap the sink.
    ///
    /// Returns `None` if a delivery panicked and the sink was lost.
    pub fn into_inner(self) -> Option<MailSink> {
        self.sink
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Install this logger as the global `log` logger.
    ///
    /// The returned reference stays valid for the rest of the program, so it can be used to
    /// call [`shutdown`](MailLogger::shutdown) before exit.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    pub fn try_apply(self) -> Result<&'static MailLogger, log::SetLoggerError> {
        let logger: &'static MailLogger = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(logger)
    }
}

impl log::Log for MailLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let mut builder = LogEvent::builder()
            .priority(record.level().into())
            .message(record.args().to_string())
            .extra("target", record.target());

        // key-values
        let mut kvs = Vec::new();

        struct KeyValueVisitor<'b> {
            kvs: &'b mut Vec<(String, String)>,
        }

        impl<'kvs> log::kv::VisitSource<'kvs> for KeyValueVisitor<'_> {
            fn visit_pair(
                &mut self,
                key: log::kv::Key<'kvs>,
                value: log::kv::Value<'kvs>,
            ) -> Result<(), log::kv::Error> {
                self.kvs.push((key.to_string(), value.to_string()));
                Ok(())
            }
        }

        let mut visitor = KeyValueVisitor { kvs: &mut kvs };
        if record.key_values().visit(&mut visitor).is_ok() {
            for (k, v) in kvs {
                builder = builder.extra(k, v);
            }
        }

        if let Some(sink) = self.lock().as_mut() {
            sink.write(builder.build());
        }
    }

    fn flush(&self) {}
}
