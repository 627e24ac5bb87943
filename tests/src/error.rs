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

//! Errors for tests

use soapkit_http::Error as ClientError;
use soapkit_mock::Error as TransportError;
use soapkit_wsdl::Error as WsdlError;
use std::error::Error as StdError;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

#[derive(Debug)]
pub enum Error {
    Client(ClientError<TransportError>),
    Wsdl(WsdlError),
    InvalidEndpoint(url::ParseError),
    ExpectedProperty(&'static str),
}

impl From<ClientError<TransportError>> for Error {
    fn from(err: ClientError<TransportError>) -> Self {
        Self::Client(err)
    }
}

impl From<WsdlError> for Error {
    fn from(err: WsdlError) -> Self {
        Self::Wsdl(err)
    }
}

pub enum TestError {}

impl Default for TestError {
    fn default() -> Self {
        unreachable!("nobody can construct it");
    }
}

impl Display for TestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "error")
    }
}

impl Debug for TestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl StdError for TestError {}
