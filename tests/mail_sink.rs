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

use lettre::Message;
use maillog::Error;
use maillog::ErrorKind;
use maillog::LogEvent;
use maillog::MailSink;
use maillog::Priority;
use maillog::Transport;
use maillog::Trap;
use maillog::filter::PriorityFilter;
use maillog::format::CustomFormatter;
use maillog::format::SimpleFormatter;
use maillog::mail::Compose;
use maillog::mail::Mail;
use maillog::render::Render;
use maillog::render::TemplateLayout;
use maillog::transport::Recording;

#[derive(Debug, Clone, Default)]
struct Collect(Arc<Mutex<Vec<(ErrorKind, String)>>>);

impl Collect {
    fn trapped(&self) -> Vec<(ErrorKind, String)> {
        self.0.lock().unwrap().clone()
    }
}

impl Trap for Collect {
    fn trap(&self, err: &Error) {
        self.0.lock().unwrap().push((err.kind(), err.to_string()));
    }
}

#[derive(Debug)]
struct Unreachable;

impl Transport for Unreachable {
    fn send(&self, _: &Message) -> Result<(), Error> {
        Err(Error::new(ErrorKind::Transport, "could not connect to smtp host"))
    }
}

#[derive(Debug)]
struct MissingTemplate;

impl Render for MissingTemplate {
    fn render(&self, _: &str) -> Result<String, Error> {
        Err(Error::new(ErrorKind::Render, "bogus message"))
    }
}

fn simple_sink(use_layout: bool) -> (MailSink, Recording, Collect) {
    let mut mail = Mail::default();
    mail.add_to("maillog_test@example.org".parse().unwrap());
    mail.set_from("maillog_test@example.org".parse().unwrap());

    let transport = Recording::default();
    let trap = Collect::default();
    let mut sink = MailSink::new(mail, transport.clone()).with_trap(trap.clone());
    if use_layout {
        sink = sink.with_layout(TemplateLayout::default());
    }
    (sink, transport, trap)
}

#[test]
fn test_multiple_messages_per_level() {
    let (mut sink, transport, trap) = simple_sink(false);
    sink.write(LogEvent::new(Priority::Info, "an info message"));
    sink.write(LogEvent::new(Priority::Info, "a second info message"));
    assert_eq!(sink.buffered(), 2);
    sink.shutdown();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients(), ["maillog_test@example.org"]);
    assert!(sent[0].body().contains("an info message"));
    assert!(sent[0].body().contains("a second info message"));
    assert!(trap.trapped().is_empty());
}

#[test]
fn test_logging_without_layout() {
    let (mut sink, transport, _) = simple_sink(false);
    sink.write(LogEvent::new(Priority::Info, "an info message"));
    sink.write(LogEvent::new(Priority::Warn, "a warning message"));
    sink.shutdown();

    let sent = transport.last().unwrap();
    assert!(sent.header().contains("Content-Type: text/plain"));
    assert!(!sent.header().contains("multipart/"));
    assert_eq!(sent.boundary(), None);
    assert!(sent.body().contains("INFO (6): an info message"));
    assert!(sent.body().contains("WARN (4): a warning message"));
}

#[test]
fn test_logging_with_layout() {
    let (mut sink, transport, trap) = simple_sink(true);
    sink.write(LogEvent::new(Priority::Info, "an info message"));
    sink.write(LogEvent::new(Priority::Warn, "a warning message"));
    sink.shutdown();

    let sent = transport.last().unwrap();
    let boundary = sent.boundary().expect("multipart message declares a boundary");
    assert!(sent.header().contains("Content-Type: multipart/alternative"));
    assert!(sent.body().contains(boundary));
    assert!(sent.body().contains("Content-Type: text/plain"));
    assert!(sent.body().contains("Content-Type: text/html"));
    assert_eq!(sent.body().matches("an info message").count(), 2);
    assert!(trap.trapped().is_empty());
}

#[test]
fn test_logging_with_layout_and_its_formatter() {
    let (mut sink, transport, _) = simple_sink(true);
    sink.set_layout_formatter(CustomFormatter::new(|event| {
        format!("[layout] {}", event.message())
    }))
    .unwrap();

    sink.write(LogEvent::new(Priority::Info, "an info message"));
    sink.write(LogEvent::new(Priority::Warn, "a warning message"));
    sink.shutdown();

    let body = transport.last().unwrap().body().to_string();
    assert!(body.contains("[layout] an info message"));
    assert!(body.contains("[layout] a warning message"));
    assert!(body.contains("INFO (6): an info message"));
    assert_eq!(body.matches("[layout]").count(), 2);
}

#[test]
fn test_layout_formatter_and_subject_prepend_text() {
    let (mut sink, transport, _) = simple_sink(true);
    sink.set_layout_formatter(SimpleFormatter::default()).unwrap();

    let ptr: *const MailSink = &sink;
    let returned = sink.set_subject_prepend_text("foo").unwrap();
    assert!(std::ptr::eq(returned, ptr));

    sink.write(LogEvent::new(Priority::Info, "an info message"));
    sink.write(LogEvent::new(Priority::Warn, "a warning message"));
    sink.shutdown();

    let sent = transport.last().unwrap();
    assert!(sent.header().contains("Subject: foo (INFO=1, WARN=1)"));
}

#[test]
fn test_set_subject_prepend_text_returns_sink() {
    let (mut sink, _, _) = simple_sink(false);
    let ptr: *const MailSink = &sink;
    let returned = sink.set_subject_prepend_text("foo").unwrap();
    assert!(std::ptr::eq(returned, ptr));
}

#[test]
fn test_set_subject_prepend_text_with_existing_subject() {
    let (mut sink, _, _) = simple_sink(false);
    sink.mail_mut().set_subject("a pre-existing subject line".to_string());

    let err = sink.set_subject_prepend_text("foo").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("a pre-existing subject line"));
}

#[test]
fn test_set_layout_formatter_returns_sink() {
    let (mut sink, _, _) = simple_sink(true);
    let ptr: *const MailSink = &sink;
    let returned = sink.set_layout_formatter(SimpleFormatter::default()).unwrap();
    assert!(std::ptr::eq(returned, ptr));
}

#[test]
fn test_get_layout_formatter() {
    let event = LogEvent::new(Priority::Info, "an info message");

    let (mut sink, _, _) = simple_sink(true);
    let default = sink.layout_formatter().expect("layout has a default formatter");
    assert!(default.format(&event).contains("INFO (6): an info message"));

    sink.set_layout_formatter(CustomFormatter::new(|event| {
        format!("<{}>", event.message())
    }))
    .unwrap();
    let formatter = sink.layout_formatter().unwrap();
    assert_eq!(formatter.format(&event), "<an info message>");

    let (sink, _, _) = simple_sink(false);
    assert!(sink.layout_formatter().is_none());
}

#[test]
fn test_set_layout_formatter_without_layout() {
    let (mut sink, _, _) = simple_sink(false);
    let err = sink
        .set_layout_formatter(SimpleFormatter::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_shutdown_with_transport_error() {
    let mut mail = Mail::default();
    mail.add_to("maillog_test@example.org".parse().unwrap());
    mail.set_from("maillog_test@example.org".parse().unwrap());
    let trap = Collect::default();
    let mut sink = MailSink::new(mail, Unreachable).with_trap(trap.clone());

    sink.write(LogEvent::new(
        Priority::Err,
        "a bogus error message to force mail sending",
    ));
    sink.shutdown();

    let trapped = trap.trapped();
    assert_eq!(trapped.len(), 1);
    assert_eq!(trapped[0].0, ErrorKind::Transport);
    assert!(trapped[0].1.contains("unable to send log entries via email"));
    assert!(trapped[0].1.contains("could not connect to smtp host"));
    assert!(sink.is_shutdown());
}

#[test]
fn test_shutdown_with_layout_error() {
    let (sink, transport, trap) = simple_sink(false);
    let mut sink = sink.with_layout(MissingTemplate);

    sink.write(LogEvent::new(
        Priority::Err,
        "a bogus error message to force mail sending",
    ));
    sink.shutdown();

    let trapped = trap.trapped();
    assert_eq!(trapped.len(), 1);
    assert_eq!(trapped[0].0, ErrorKind::Render);
    assert!(trapped[0].1.contains("bogus message"));

    let sent = transport.last().expect("plain text body is still sent");
    assert!(!sent.header().contains("multipart/"));
    assert!(sent.body().contains("a bogus error message to force mail sending"));
}

#[test]
fn test_fluent_interface() {
    let (mut sink, _, _) = simple_sink(true);
    let instance = sink
        .set_layout_formatter(SimpleFormatter::default())
        .and_then(|sink| sink.set_subject_prepend_text("subject"))
        .unwrap();
    assert!(instance.layout_formatter().is_some());
}

#[test]
fn test_empty_buffer_sends_nothing() {
    let (mut sink, transport, trap) = simple_sink(true);
    sink.set_subject_prepend_text("foo").unwrap();
    sink.shutdown();

    assert!(transport.sent().is_empty());
    assert!(trap.trapped().is_empty());
}

#[test]
fn test_second_shutdown_is_noop() {
    let (mut sink, transport, _) = simple_sink(false);
    sink.write(LogEvent::new(Priority::Info, "an info message"));
    sink.shutdown();
    sink.write(LogEvent::new(Priority::Info, "written after shutdown"));
    sink.shutdown();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].body().contains("written after shutdown"));
    assert_eq!(sink.buffered(), 0);
}

#[test]
fn test_drop_without_shutdown_is_reported() {
    let (mut sink, transport, trap) = simple_sink(false);
    sink.write(LogEvent::new(Priority::Err, "never delivered"));
    drop(sink);

    assert!(transport.sent().is_empty());
    let trapped = trap.trapped();
    assert_eq!(trapped.len(), 1);
    assert_eq!(trapped[0].0, ErrorKind::Discarded);
}

#[test]
fn test_priority_filter() {
    let (sink, transport, _) = simple_sink(false);
    let mut sink = sink.with_filter(PriorityFilter::new(Priority::Warn));
    sink.set_subject_prepend_text("filtered").unwrap();

    sink.write(LogEvent::new(Priority::Info, "an info message"));
    sink.write(LogEvent::new(Priority::Err, "an error message"));
    assert_eq!(sink.buffered(), 1);
    sink.shutdown();

    let sent = transport.last().unwrap();
    assert!(sent.header().contains("Subject: filtered (ERR=1)"));
    assert!(!sent.body().contains("an info message"));
}

#[test]
fn test_compose_error_is_reported() {
    let transport = Recording::default();
    let trap = Collect::default();
    let mut sink = MailSink::new(Mail::default(), transport.clone()).with_trap(trap.clone());

    sink.write(LogEvent::new(Priority::Info, "an info message"));
    sink.shutdown();

    assert!(transport.sent().is_empty());
    let trapped = trap.trapped();
    assert_eq!(trapped.len(), 1);
    assert_eq!(trapped[0].0, ErrorKind::Compose);
}
