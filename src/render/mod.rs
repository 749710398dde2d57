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

//! Rendering buffered events into mail bodies.

use std::fmt;

use crate::Error;

mod body;
mod template;

pub use self::body::BodyRenderer;
pub use self::body::RenderedBody;
pub use self::template::LayoutOptions;
pub use self::template::TemplateLayout;

/// A layout renderer that turns the formatted events into an HTML document.
pub trait Render: fmt::Debug + Send + 'static {
    /// Render the HTML body.
    ///
    /// `events` holds one formatted line per buffered event, each terminated by `\n`.
    fn render(&self, events: &str) -> Result<String, Error>;
}

impl<T: Render> From<T> for Box<dyn Render> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
