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

use crate::xsd::ValidateError;
use quick_xml::DeError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

/// Schema loading and lookup errors.
///
/// Every variant that relates to a document carries its location as
/// the first field.
#[derive(Debug)]
pub enum Error {
    Io(String, IoError),
    CurrentDir(IoError),
    Cache(String, IoError),
    HttpClient(reqwest::Error),
    Http(String, reqwest::Error),
    HttpStatus(String, u16),
    XmlRead(String, quick_xml::Error),
    Xml(String, DeError),
    Validate(String, ValidateError),
    InvalidLocation(String, UrlParseError),
    /// Relative reference found in a document that has no location to
    /// resolve it against.
    RelativeReference {
        reference: String,
        base: String,
    },
    /// Document root is neither `definitions` nor `schema`.
    UnknownRoot(String, String),
    /// Extension or restriction base that no loaded schema defines.
    UnresolvedBase {
        base: String,
        referrer: String,
    },
    UnresolvedAttribute(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(location, err) => write!(f, "input/output error: {location}: {err}"),
            Self::CurrentDir(err) => write!(f, "cannot get current directory: {err}"),
            Self::Cache(path, err) => write!(f, "schema cache error: {path}: {err}"),
            Self::HttpClient(err) => write!(f, "cannot create HTTP client: {err}"),
            Self::Http(location, err) => write!(f, "cannot download {location}: {err}"),
            Self::HttpStatus(location, code) => {
                write!(f, "cannot download {location}: received response code {code}")
            }
            Self::XmlRead(location, err) => write!(f, "XML error: {location}: {err}"),
            Self::Xml(location, err) => write!(f, "XML format error: {location}: {err}"),
            Self::Validate(location, err) => {
                write!(f, "schema validation error: {location}: {err}")
            }
            Self::InvalidLocation(location, err) => {
                write!(f, "invalid location: {location}: {err}")
            }
            Self::RelativeReference { reference, base } => write!(
                f,
                "unable to resolve external schema {reference} through location {base}"
            ),
            Self::UnknownRoot(location, root) => {
                write!(f, "{location}: unexpected document root: {root}")
            }
            Self::UnresolvedBase { base, referrer } => {
                write!(f, "base type {base} of {referrer} is not defined")
            }
            Self::UnresolvedAttribute(name) => write!(f, "attribute {name} is not defined"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(_, err) | Self::Cache(_, err) | Self::CurrentDir(err) => Some(err),
            Self::HttpClient(err) | Self::Http(_, err) => Some(err),
            Self::XmlRead(_, err) => Some(err),
            Self::Xml(_, err) => Some(err),
            Self::Validate(_, err) => Some(err),
            Self::InvalidLocation(_, err) => Some(err),
            Self::HttpStatus(..)
            | Self::RelativeReference { .. }
            | Self::UnknownRoot(..)
            | Self::UnresolvedBase { .. }
            | Self::UnresolvedAttribute(_) => None,
        }
    }
}
