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

use std::fmt;

use lettre::Message;
use lettre::SmtpTransport;
use lettre::transport::smtp::authentication::Credentials;

use crate::Error;
use crate::ErrorKind;
use crate::config::SmtpConfig;
use crate::transport::Transport;

/// A transport delivering over SMTP with [`lettre`].
///
/// Each send opens its own connection; there is no retry.
pub struct Smtp {
    host: String,
    inner: SmtpTransport,
}

impl fmt::Debug for Smtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Smtp").field("host", &self.host).finish()
    }
}

impl Smtp {
    /// Build a transport from the `smtp` configuration section.
    ///
    /// With `tls` enabled (the default) the connection uses implicit TLS to the relay; otherwise
    /// it is an unencrypted connection, suitable only for local relays.
    pub fn new(config: &SmtpConfig) -> Result<Self, Error> {
        let builder = if config.tls {
            SmtpTransport::relay(&config.host).map_err(|err| {
                Error::config("failed to set up smtp relay")
                    .with_context("host", &config.host)
                    .with_source(err)
            })?
        } else {
            SmtpTransport::builder_dangerous(config.host.as_str())
        };

        let builder = match config.port {
            Some(port) => builder.port(port),
            None => builder,
        };

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            (None, None) => builder,
            _ => {
                return Err(Error::config(
                    "smtp username and password must be configured together",
                ));
            }
        };

        Ok(Smtp {
            host: config.host.clone(),
            inner: builder.build(),
        })
    }
}

impl Transport for Smtp {
    fn send(&self, message: &Message) -> Result<(), Error> {
        lettre::Transport::send(&self.inner, message)
            .map(|_| ())
            .map_err(|err| {
                Error::new(ErrorKind::Transport, "failed to deliver mail over smtp")
                    .with_context("host", &self.host)
                    .with_source(err)
            })
    }
}
