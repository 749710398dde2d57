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
use crate::event::LogEvent;
use crate::format::Formatter;
use crate::format::format_lines;
use crate::render::Render;
use crate::trap::Trap;

/// The bodies of an outgoing log mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    /// The plain text body, always present.
    pub text: String,
    /// The HTML body, present iff a layout is attached and rendered successfully.
    pub html: Option<String>,
}

/// Renders buffered events into a [`RenderedBody`].
///
/// The plain text body is produced with `formatter`. When a layout is attached, the events are
/// formatted again with the layout's own formatter and handed to the layout renderer.
#[derive(Debug)]
pub struct BodyRenderer<'a> {
    formatter: &'a dyn Formatter,
    layout: Option<(&'a dyn Render, &'a dyn Formatter)>,
}

impl<'a> BodyRenderer<'a> {
    /// Create a renderer producing plain text only.
    pub fn new(formatter: &'a dyn Formatter) -> Self {
        Self {
            formatter,
            layout: None,
        }
    }

    /// Attach a layout renderer and the formatter used for its input.
    pub fn with_layout(mut self, layout: &'a dyn Render, formatter: &'a dyn Formatter) -> Self {
        self.layout = Some((layout, formatter));
        self
    }

    /// Render `events`.
    ///
    /// A layout failure is reported to `trap` and leaves the HTML body unset; the plain text body
    /// is always returned.
    pub fn render(&self, events: &[LogEvent], trap: &dyn Trap) -> RenderedBody {
        let text = format_lines(events, self.formatter);

        let html = self.layout.and_then(|(layout, formatter)| {
            match layout.render(&format_lines(events, formatter)) {
                Ok(html) => Some(html),
                Err(err) => {
                    let err = Error::new(
                        ErrorKind::Render,
                        "exception occurred when rendering layout; unable to set html body for message",
                    )
                    .with_source(err);
                    trap.trap(&err);
                    None
                }
            }
        });

        RenderedBody { text, html }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use jiff::tz::TimeZone;

    use super::*;
    use crate::event::Priority;
    use crate::format::CustomFormatter;
    use crate::format::SimpleFormatter;

    #[derive(Debug, Default)]
    struct Collect(Mutex<Vec<String>>);

    impl Trap for Collect {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    #[derive(Debug)]
    struct Wrap;

    impl Render for Wrap {
        fn render(&self, events: &str) -> Result<String, Error> {
            Ok(format!("<ul>{events}</ul>"))
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Render for Broken {
        fn render(&self, _: &str) -> Result<String, Error> {
            Err(Error::new(ErrorKind::Render, "template not found"))
        }
    }

    fn events() -> Vec<LogEvent> {
        let ts = "2024-05-01T12:00:00Z".parse().unwrap();
        vec![
            LogEvent::builder()
                .timestamp(ts)
                .priority(Priority::Info)
                .message("an info message")
                .build(),
            LogEvent::builder()
                .timestamp(ts)
                .priority(Priority::Warn)
                .message("a warning message")
                .build(),
        ]
    }

    #[test]
    fn test_plain_only() {
        let formatter = SimpleFormatter::default().timezone(TimeZone::UTC);
        let trap = Collect::default();
        let body = BodyRenderer::new(&formatter).render(&events(), &trap);

        insta::assert_snapshot!(body.text, @r"
        2024-05-01T12:00:00+00:00 INFO (6): an info message
        2024-05-01T12:00:00+00:00 WARN (4): a warning message
        ");
        assert_eq!(body.html, None);
        assert!(trap.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_layout_uses_its_own_formatter() {
        let formatter = SimpleFormatter::default().timezone(TimeZone::UTC);
        let layout_formatter =
            CustomFormatter::new(|event| format!("<li>{}</li>", event.message()));
        let trap = Collect::default();
        let body = BodyRenderer::new(&formatter)
            .with_layout(&Wrap, &layout_formatter)
            .render(&events(), &trap);

        assert!(body.text.contains("INFO (6): an info message"));
        assert_eq!(
            body.html.as_deref(),
            Some("<ul><li>an info message</li>\n<li>a warning message</li>\n</ul>")
        );
    }

    #[test]
    fn test_layout_failure_keeps_plain_text() {
        let formatter = SimpleFormatter::default();
        let trap = Collect::default();
        let body = BodyRenderer::new(&formatter)
            .with_layout(&Broken, &formatter)
            .render(&events(), &trap);

        assert!(body.text.contains("a warning message"));
        assert_eq!(body.html, None);

        let trapped = trap.0.lock().unwrap();
        assert_eq!(trapped.len(), 1);
        assert!(trapped[0].contains("rendering layout"));
        assert!(trapped[0].contains("template not found"));
    }
}
