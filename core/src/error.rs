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

use quick_xml::DeError;
use quick_xml::Error as XmlError;
use quick_xml::SeError;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;

/// Errors of envelope, fault and multipart encoding/decoding.
#[derive(Debug)]
pub enum Error {
    /// Value cannot be serialized to XML.
    XmlSerialize(SeError),
    /// Value cannot be deserialized from XML. First field is the
    /// element that was decoded.
    XmlDeserialize(String, DeError),
    /// Malformed XML.
    Xml(XmlError),
    /// Write error.
    Io(IoError),
    /// SOAP body contains more than one element.
    MultipleBodyElements,
    /// Content type cannot be parsed.
    InvalidMediaType(String),
    /// Multipart content type without boundary.
    MissingBoundary(String),
    /// Multipart payload does not follow MIME framing.
    MalformedMultipart(String),
    /// Non-envelope part without `Content-ID`.
    MissingContentId,
    /// MTOM content type with missing or unsupported `start-info`.
    InvalidStartInfo(Option<String>),
    /// Binary references a package that is not in the message.
    MissingPart(String),
    /// Multipart message without an envelope part.
    MissingEnvelopePart,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::XmlSerialize(err) => write!(f, "XML serialization error: {err}"),
            Self::XmlDeserialize(element, err) => {
                write!(f, "cannot decode element {element}: {err}")
            }
            Self::Xml(err) => write!(f, "XML error: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::MultipleBodyElements => write!(
                f,
                "Found multiple elements inside SOAP body; not wrapped-document/literal WS-I compliant"
            ),
            Self::InvalidMediaType(v) => write!(f, "invalid media type: {v}"),
            Self::MissingBoundary(v) => write!(f, "invalid multipart boundary in: {v}"),
            Self::MalformedMultipart(reason) => write!(f, "malformed multipart body: {reason}"),
            Self::MissingContentId => write!(f, "Invalid multipart content ID"),
            Self::InvalidStartInfo(Some(v)) => write!(
                f,
                "expected param start-info=\"application/soap+xml\", got {v}"
            ),
            Self::InvalidStartInfo(None) => {
                write!(f, "expected param start-info=\"application/soap+xml\"")
            }
            Self::MissingPart(id) => write!(f, "no multipart part with content id {id}"),
            Self::MissingEnvelopePart => write!(f, "multipart message has no envelope part"),
        }
    }
}

#[allow(clippy::absolute_paths)]
impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::XmlSerialize(err) => Some(err),
            Self::XmlDeserialize(_, err) => Some(err),
            Self::Xml(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<XmlError> for Error {
    fn from(err: XmlError) -> Self {
        Self::Xml(err)
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl From<SeError> for Error {
    fn from(err: SeError) -> Self {
        Self::XmlSerialize(err)
    }
}
