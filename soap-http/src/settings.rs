// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::Credentials;
use http::HeaderMap;
use soapkit_core::SoapVersion;

/// Request framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single XML envelope; binaries are inlined as base64.
    Plain,
    /// MTOM/XOP multipart; binaries travel as separate parts.
    Mtom,
    /// Multipart with MIME attachments next to the envelope.
    MimeAttachments,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Plain
    }
}

/// Settings of a SOAP [`Client`](crate::Client).
///
/// # Examples
///
/// ```rust
/// use soapkit_core::SoapVersion;
/// use soapkit_http::ClientSettings;
/// use soapkit_http::Credentials;
/// use soapkit_http::Mode;
///
/// let settings = ClientSettings::new()
///     .version(SoapVersion::Soap12)
///     .mode(Mode::Mtom)
///     .credentials(Credentials::new("admin".into(), "secret".into()))
///     .user_agent("inventory-sync/2.1");
/// ```
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// SOAP protocol version
    pub version: SoapVersion,
    /// Request framing
    pub mode: Mode,
    /// HTTP basic authentication
    pub credentials: Option<Credentials>,
    /// Headers added to every request; they replace the defaults
    /// (`Content-Type`, `SOAPAction`, `User-Agent`) of the same name
    pub http_headers: HeaderMap,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            version: SoapVersion::Soap11,
            mode: Mode::Plain,
            credentials: None,
            http_headers: HeaderMap::new(),
            user_agent: "soapkit/0.1".to_string(),
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn version(mut self, version: SoapVersion) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn http_headers(mut self, headers: HeaderMap) -> Self {
        self.http_headers = headers;
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
