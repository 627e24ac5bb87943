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

pub mod expect;

#[doc(inline)]
pub use expect::Expect;
pub use expect::ExpectedRequest;
pub use expect::MockResponse;

use http::header;
use http::HeaderMap;
use http::HeaderValue;
use soapkit_http::Credentials;
use soapkit_http::HttpClient;
use soapkit_http::SOAP_ACTION;
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Mutex;
use std::sync::PoisonError;
use url::Url;

#[derive(Debug)]
pub enum Error {
    ErrorResponse(Box<dyn StdError + Send + Sync>),
    MutexLock(String),
    NothingIsExpected,
    BadResponse(http::Error),
    UnexpectedCall(String, String, ExpectedRequest),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ErrorResponse(err) => write!(f, "response: {err}"),
            Self::MutexLock(err) => write!(f, "lock error: {err}"),
            Self::NothingIsExpected => {
                write!(f, "nothing is expected to happen but something happened")
            }
            Self::BadResponse(err) => write!(f, "bad response: {err}"),
            Self::UnexpectedCall(action, body, expected) => {
                write!(
                    f,
                    "unexpected call: {action}; body: {body} expected: {expected:?}"
                )
            }
        }
    }
}

impl StdError for Error {}

impl Error {
    pub fn mutex_lock<T>(err: PoisonError<T>) -> Self {
        Self::MutexLock(err.to_string())
    }
}

/// Transport answering calls from a queue of expectations.
pub struct Transport<E> {
    expect: Mutex<VecDeque<Expect<E>>>,
}

impl<E> Default for Transport<E> {
    fn default() -> Self {
        Self {
            expect: Mutex::new(VecDeque::new()),
        }
    }
}

impl<E> Transport<E> {
    /// Queue an expectation after the ones already queued.
    pub fn expect(&self, exp: Expect<E>) {
        if let Ok(mut expect) = self.expect.lock() {
            expect.push_back(exp);
        }
    }

    /// Number of expectations not consumed yet.
    pub fn pending(&self) -> usize {
        self.expect.lock().map_or(0, |expect| expect.len())
    }
}

impl<E> HttpClient for Transport<E>
where
    E: StdError + Send + Sync + 'static,
{
    type Error = Error;

    async fn post(
        &self,
        _url: Url,
        body: Vec<u8>,
        _credentials: Option<&Credentials>,
        headers: &HeaderMap,
    ) -> Result<http::Response<Vec<u8>>, Self::Error> {
        let expect = self
            .expect
            .lock()
            .map_err(Error::mutex_lock)?
            .pop_front()
            .ok_or(Error::NothingIsExpected)?;
        let in_action = headers
            .get(SOAP_ACTION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let in_body = String::from_utf8_lossy(&body).into_owned();
        match expect {
            Expect {
                request: ExpectedRequest::Call { action, fragments },
                response,
            } if action == in_action && fragments.iter().all(|f| in_body.contains(f.as_str())) => {
                let response = response.map_err(|err| Error::ErrorResponse(Box::new(err)))?;
                let mut builder = http::Response::builder().status(response.status);
                if let Some(content_type) = response.content_type {
                    let value = HeaderValue::from_str(&content_type)
                        .map_err(|err| Error::BadResponse(err.into()))?;
                    builder = builder.header(header::CONTENT_TYPE, value);
                }
                builder.body(response.body).map_err(Error::BadResponse)
            }
            _ => Err(Error::UnexpectedCall(in_action, in_body, expect.request)),
        }
    }
}
