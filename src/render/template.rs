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

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use minijinja::Environment;
use minijinja::context;
use serde_json::Value;

use crate::Error;
use crate::ErrorKind;
use crate::render::Render;

/// Options handed verbatim from the `layoutOptions` configuration key to a layout constructor.
pub type LayoutOptions = serde_json::Map<String, Value>;

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Log entries</title></head>
<body>
<pre>{{ events }}</pre>
</body>
</html>
"#;

/// A layout renderer backed by [`minijinja`] templates.
///
/// The layout script is `<layout_path>/<layout>.<view_suffix>` and is loaded on every render, so
/// a missing script surfaces as a render error at shutdown. An inline template takes precedence
/// over the path, and without either a built-in page is used.
///
/// Templates see two variables: `events`, the formatted lines, and `count`, the number of
/// lines. Scripts whose suffix is `html` are auto-escaped.
///
/// # Examples
///
/// ```
/// use maillog::render::TemplateLayout;
///
/// let layout = TemplateLayout::default().layout_path("/srv/app/layouts").layout("errors");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateLayout {
    layout_path: Option<PathBuf>,
    layout: String,
    view_suffix: String,
    template: Option<String>,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            layout_path: None,
            layout: "layout".to_string(),
            view_suffix: "html".to_string(),
            template: None,
        }
    }
}

impl TemplateLayout {
    /// Build a layout from `layoutOptions`.
    ///
    /// Recognized keys are `layoutPath`, `layout`, `viewSuffix` and `template`; all must be
    /// strings. Other keys are ignored.
    pub fn from_options(options: &LayoutOptions) -> Result<Self, Error> {
        let mut layout = TemplateLayout::default();
        if let Some(path) = string_option(options, "layoutPath")? {
            layout = layout.layout_path(path);
        }
        if let Some(name) = string_option(options, "layout")? {
            layout = layout.layout(name);
        }
        if let Some(suffix) = string_option(options, "viewSuffix")? {
            layout = layout.view_suffix(suffix);
        }
        if let Some(template) = string_option(options, "template")? {
            layout = layout.template(template);
        }
        Ok(layout)
    }

    /// Set the directory holding layout scripts.
    pub fn layout_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.layout_path = Some(path.into());
        self
    }

    /// Set the layout script name. Default to `layout`.
    pub fn layout(mut self, name: impl Into<String>) -> Self {
        self.layout = name.into();
        self
    }

    /// Set the layout script file suffix. Default to `html`.
    pub fn view_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.view_suffix = suffix.into();
        self
    }

    /// Use an inline template source instead of a script on disk.
    pub fn template(mut self, source: impl Into<String>) -> Self {
        self.template = Some(source.into());
        self
    }

    fn source(&self, name: &str) -> Result<Cow<'_, str>, Error> {
        if let Some(template) = &self.template {
            return Ok(Cow::Borrowed(template.as_str()));
        }

        match &self.layout_path {
            None => Ok(Cow::Borrowed(DEFAULT_TEMPLATE)),
            Some(dir) => {
                let path = dir.join(name);
                fs::read_to_string(&path).map(Cow::Owned).map_err(|err| {
                    Error::new(ErrorKind::Render, "failed to load layout script")
                        .with_context("path", path.display())
                        .with_source(err)
                })
            }
        }
    }
}

impl Render for TemplateLayout {
    fn render(&self, events: &str) -> Result<String, Error> {
        let name = format!("{}.{}", self.layout, self.view_suffix);
        let source = self.source(&name)?;

        let mut env = Environment::new();
        env.add_template(&name, &source)
            .map_err(|err| template_error("failed to parse layout script", &name, err))?;
        let template = env
            .get_template(&name)
            .map_err(|err| template_error("failed to load layout script", &name, err))?;

        template
            .render(context! {
                events => events,
                count => events.lines().count(),
            })
            .map_err(|err| template_error("failed to render layout script", &name, err))
    }
}

fn template_error(message: &str, name: &str, err: minijinja::Error) -> Error {
    Error::new(ErrorKind::Render, message)
        .with_context("layout", name)
        .with_source(err)
}

fn string_option(options: &LayoutOptions, key: &'static str) -> Result<Option<String>, Error> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::config("layout option must be a string")
            .with_context("option", key)
            .with_context("value", other)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_page_escapes_events() {
        let html = TemplateLayout::default()
            .render("an info message <b>\n")
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("an info message &lt;b&gt;"));
    }

    #[test]
    fn test_inline_template() {
        let layout = TemplateLayout::default().template("{{ count }} entries:\n{{ events }}");
        insta::assert_snapshot!(layout.render("one\ntwo\n").unwrap(), @r"
        2 entries:
        one
        two
        ");
    }

    #[test]
    fn test_layout_script_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("errors.phtml"), "<p>{{ events }}</p>").unwrap();

        let options = json!({
            "layoutPath": dir.path().to_str().unwrap(),
            "layout": "errors",
            "viewSuffix": "phtml",
        });
        let layout = TemplateLayout::from_options(options.as_object().unwrap()).unwrap();
        assert_eq!(layout.render("boom").unwrap(), "<p>boom</p>");
    }

    #[test]
    fn test_missing_script_is_render_error() {
        let layout = TemplateLayout::default().layout_path("/path/to/layout/scripts");
        let err = layout.render("boom").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
        assert!(err.to_string().contains("layout.html"));
    }

    #[test]
    fn test_non_string_option_is_config_error() {
        let options = json!({ "layoutPath": 42 });
        let err = TemplateLayout::from_options(options.as_object().unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
