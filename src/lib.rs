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

//! Maillog is a log sink that collects log entries in memory and delivers them as one email when
//! it shuts down.
//!
//! # Overview
//!
//! A [`MailSink`] buffers every [`LogEvent`] written to it. On [`MailSink::shutdown`] it renders
//! the events into a plain text body, and into an HTML body as well when a layout renderer is
//! attached, composes the subject, and hands a single message to a [`Transport`]. Delivery is a
//! single best-effort attempt: render and send failures are reported to a [`Trap`] and never
//! returned to the caller.
//!
//! Sinks are built directly, or from a flat configuration with a
//! [`SinkFactory`](factory::SinkFactory). With the `bridge-log` feature, a
//! [`MailLogger`](bridge::MailLogger) plugs a sink into the `log` crate.
//!
//! # Examples
//!
//! ```
//! use maillog::LogEvent;
//! use maillog::Priority;
//! use maillog::config::MailConfig;
//! use maillog::factory::SinkFactory;
//! use maillog::transport::Recording;
//!
//! let config = MailConfig::from_json(
//!     r#"{
//!         "from": { "email": "log@example.com" },
//!         "to": ["ops@example.com", { "John Doe": "john@example.com" }],
//!         "subjectPrependText": "[error] exceptions on my application",
//!         "layoutOptions": {}
//!     }"#,
//! )
//! .unwrap();
//!
//! let transport = Recording::default();
//! let mut sink = SinkFactory::default().build(&config, transport.clone()).unwrap();
//!
//! sink.write(LogEvent::new(Priority::Err, "database connection lost"));
//! sink.write(LogEvent::new(Priority::Warn, "retrying in 5s"));
//! sink.shutdown();
//!
//! let sent = transport.last().unwrap();
//! assert!(sent.header().contains("(ERR=1, WARN=1)"));
//! assert!(sent.header().contains("multipart/alternative"));
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod event;
pub mod factory;
pub mod filter;
pub mod format;
pub mod mail;
pub mod render;
pub mod subject;
pub mod transport;
pub mod trap;

mod error;
mod sink;

pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::event::LogEvent;
pub use self::event::Priority;
pub use self::sink::MailSink;
pub use self::transport::Transport;
pub use self::trap::Trap;
