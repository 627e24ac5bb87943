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

use http::StatusCode;
use soapkit_core::Error as SoapError;
use soapkit_core::SoapFault;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Errors of a SOAP call. `E` is the transport error type.
#[derive(Debug)]
pub enum Error<E> {
    /// Request could not be delivered or the response could not be read.
    Transport(E),
    /// Request encoding or response decoding failed.
    Soap(SoapError),
    /// Service returned a fault.
    Fault(Box<SoapFault>),
    /// Non-success HTTP status without a SOAP fault in the body.
    HttpStatus { status: StatusCode, body: String },
    /// Value cannot be used as an HTTP header.
    InvalidHeader(String),
    /// Attachments were passed to a client not configured for them.
    AttachmentsNotEnabled,
}

impl<E> Error<E> {
    /// Service fault, if this error is one.
    #[must_use]
    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Soap(err) => write!(f, "SOAP error: {err}"),
            Self::Fault(fault) => write!(f, "{fault}"),
            Self::HttpStatus { status, body } => {
                write!(f, "HTTP Status {}: {body}", status.as_u16())
            }
            Self::InvalidHeader(v) => write!(f, "invalid HTTP header value: {v}"),
            Self::AttachmentsNotEnabled => {
                write!(f, "client is not configured for MIME attachments")
            }
        }
    }
}

#[allow(clippy::absolute_paths)]
impl<E: StdError + 'static> StdError for Error<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Soap(err) => Some(err),
            Self::Fault(fault) => Some(fault.as_ref()),
            _ => None,
        }
    }
}

impl<E> From<SoapError> for Error<E> {
    fn from(err: SoapError) -> Self {
        Self::Soap(err)
    }
}
