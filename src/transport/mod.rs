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

//! Transports deliver the composed log mail.

use std::fmt;

use lettre::Message;

use crate::Error;

mod recording;
#[cfg(feature = "smtp")]
mod smtp;

pub use self::recording::Recording;
pub use self::recording::SentMail;
#[cfg(feature = "smtp")]
pub use self::smtp::Smtp;

/// A transport that delivers one composed message.
///
/// A sink calls [`send`](Transport::send) at most once, from its shutdown path; any error is
/// reported to the sink's trap and never retried.
pub trait Transport: fmt::Debug + Send + Sync + 'static {
    /// Deliver the message.
    fn send(&self, message: &Message) -> Result<(), Error>;
}

impl<T: Transport> From<T> for Box<dyn Transport> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
