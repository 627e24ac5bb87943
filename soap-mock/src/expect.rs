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

//! Expectations for the SOAP transport mock.

use std::fmt::Display;

/// Canned HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

pub type Response<E> = Result<MockResponse, E>;

/// Request expected by the transport.
#[derive(Debug)]
pub enum ExpectedRequest {
    /// Expected call of a SOAP action. Every fragment must appear in the
    /// request body.
    Call {
        action: String,
        fragments: Vec<String>,
    },
}

/// Expectation for the tests.
#[derive(Debug)]
pub struct Expect<E> {
    pub request: ExpectedRequest,
    pub response: Response<E>,
}

impl<E> Expect<E> {
    /// Expect `action` and answer with an XML `response`.
    pub fn call(action: impl Display, response: impl Display) -> Self {
        Self::status(action, 200, response)
    }

    /// Expect `action` with a body containing `fragment`.
    pub fn call_with(action: impl Display, fragment: impl Display, response: impl Display) -> Self {
        Self::call(action, response).containing(fragment)
    }

    /// Expect `action` and answer with `status` and an XML `response`.
    pub fn status(action: impl Display, status: u16, response: impl Display) -> Self {
        Expect {
            request: ExpectedRequest::Call {
                action: action.to_string(),
                fragments: Vec::new(),
            },
            response: Ok(MockResponse {
                status,
                content_type: Some("text/xml; charset=utf-8".into()),
                body: response.to_string().into_bytes(),
            }),
        }
    }

    /// Expect `action` and fail the transport with `err`.
    pub fn error(action: impl Display, err: E) -> Self {
        Expect {
            request: ExpectedRequest::Call {
                action: action.to_string(),
                fragments: Vec::new(),
            },
            response: Err(err),
        }
    }

    /// Require `fragment` in the request body.
    #[must_use]
    pub fn containing(mut self, fragment: impl Display) -> Self {
        match &mut self.request {
            ExpectedRequest::Call { fragments, .. } => fragments.push(fragment.to_string()),
        }
        self
    }
}
