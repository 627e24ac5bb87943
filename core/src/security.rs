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

//! WS-Security `UsernameToken` header.

use serde::Serialize;
use std::fmt;

/// WS-Security extension namespace.
pub const WSSE_NAMESPACE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
/// WS-Security utility namespace.
pub const WSU_NAMESPACE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
/// Password type of plain text passwords.
pub const PASSWORD_TEXT_TYPE: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

/// `wsse:Security` header with a plain text `UsernameToken`.
///
/// Add it to a client with `add_header`. The password is never printed
/// by `Debug`.
#[derive(Clone, Serialize)]
#[serde(rename = "wsse:Security")]
pub struct WssSecurityHeader {
    #[serde(rename = "@xmlns:wsse")]
    xmlns_wsse: &'static str,
    #[serde(rename = "@soap:mustUnderstand", skip_serializing_if = "Option::is_none")]
    must_understand: Option<String>,
    #[serde(rename = "wsse:UsernameToken")]
    token: UsernameToken,
}

#[derive(Clone, Serialize)]
struct UsernameToken {
    #[serde(rename = "@xmlns:wsu")]
    xmlns_wsu: &'static str,
    #[serde(rename = "@wsu:Id", skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(rename = "wsse:Username")]
    username: String,
    #[serde(rename = "wsse:Password")]
    password: Password,
}

#[derive(Clone, Serialize)]
struct Password {
    #[serde(rename = "@Type")]
    kind: &'static str,
    #[serde(rename = "$text")]
    value: String,
}

impl WssSecurityHeader {
    /// Create the header. Empty `token_id` or `must_understand` omit the
    /// corresponding attribute.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        token_id: impl Into<String>,
        must_understand: impl Into<String>,
    ) -> Self {
        let must_understand = must_understand.into();
        Self {
            xmlns_wsse: WSSE_NAMESPACE,
            must_understand: if must_understand.is_empty() {
                None
            } else {
                Some(must_understand)
            },
            token: UsernameToken {
                xmlns_wsu: WSU_NAMESPACE,
                id: token_id.into(),
                username: username.into(),
                password: Password {
                    kind: PASSWORD_TEXT_TYPE,
                    value: password.into(),
                },
            },
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.token.username
    }
}

impl fmt::Debug for WssSecurityHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WssSecurityHeader")
            .field("username", &self.token.username)
            .field("password", &"[REDACTED]")
            .field("token_id", &self.token.id)
            .field("must_understand", &self.must_understand)
            .finish()
    }
}
