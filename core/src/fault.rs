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

//! SOAP faults.
//!
//! SOAP 1.1 (`faultcode`, `faultstring`, `faultactor`, `detail`) and
//! SOAP 1.2 (`Code/Value`, `Reason/Text`, `Role`, `Detail`) faults are
//! mapped onto one [`SoapFault`]. The content of the detail element is
//! kept as raw XML so callers can decode it into a service-declared type
//! with [`SoapFault::decode_detail`].

use crate::Error;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use std::convert::TryFrom;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Service-declared fault detail.
pub trait FaultDetail: DeserializeOwned {
    /// True when the detail carries information worth reporting.
    fn has_data(&self) -> bool;

    /// Message reported instead of the fault string.
    fn error_string(&self) -> String;
}

/// Fault returned in a SOAP body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    /// `faultcode` (1.1) or `Code/Value` (1.2), for example `soap:Server`.
    pub code: String,
    /// `faultstring` (1.1) or the first `Reason/Text` (1.2).
    pub string: String,
    /// `faultactor` (1.1) or `Role` (1.2).
    pub actor: String,
    /// Raw XML content of the detail element.
    pub detail: Option<String>,
    detail_message: Option<String>,
}

impl SoapFault {
    /// Parse a complete `Fault` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not well-formed XML.
    pub fn parse(raw: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::from_reader(raw);
        let mut fault = Self::default();
        let mut depth = 0usize;
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    depth += 1;
                    if depth == 1 {
                        continue;
                    }
                    match e.local_name().as_ref() {
                        b"faultcode" => fault.code = read_text(&mut reader, &e)?,
                        b"faultstring" => fault.string = read_text(&mut reader, &e)?,
                        b"faultactor" | b"Role" => fault.actor = read_text(&mut reader, &e)?,
                        b"Code" => fault.code = first_child_text(&mut reader, &e, b"Value")?,
                        b"Reason" => fault.string = first_child_text(&mut reader, &e, b"Text")?,
                        b"detail" | b"Detail" => {
                            let span = reader.read_to_end(e.name())?;
                            let inner = &raw[to_usize(span.start)..to_usize(span.end)];
                            fault.detail = Some(String::from_utf8_lossy(inner).into_owned());
                        }
                        _ => {
                            reader.read_to_end(e.name())?;
                        }
                    }
                    depth -= 1;
                }
                Event::End(_) => {
                    if depth <= 1 {
                        break;
                    }
                    depth -= 1;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(fault)
    }

    /// Decode the detail into `D`. `None` when the fault has no detail.
    ///
    /// When the decoded detail reports data, its error string replaces the
    /// fault string in this fault's `Display`.
    ///
    /// # Errors
    ///
    /// Returns an error if the detail does not match `D`.
    pub fn decode_detail<D: FaultDetail>(&mut self) -> Result<Option<D>, Error> {
        let decoded = self.typed_detail::<D>()?;
        if let Some(detail) = decoded.as_ref().filter(|d| d.has_data()) {
            self.detail_message = Some(detail.error_string());
        }
        Ok(decoded)
    }

    /// Deserialize the detail content into `D` without touching the
    /// fault message. `None` when the fault has no detail.
    ///
    /// # Errors
    ///
    /// Returns an error if the detail does not match `D`.
    pub fn typed_detail<D: DeserializeOwned>(&self) -> Result<Option<D>, Error> {
        let Some(detail) = self.detail.as_deref() else {
            return Ok(None);
        };
        let wrapped = format!("<detail>{detail}</detail>");
        quick_xml::de::from_str(&wrapped)
            .map(Some)
            .map_err(|err| Error::XmlDeserialize("detail".into(), err))
    }

    /// Message of the fault: the decoded detail's error string if any,
    /// otherwise the fault string.
    #[must_use]
    pub fn message(&self) -> &str {
        self.detail_message.as_deref().unwrap_or(&self.string)
    }
}

impl Display for SoapFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.message())
    }
}

impl StdError for SoapFault {}

fn to_usize(pos: u64) -> usize {
    usize::try_from(pos).unwrap_or(usize::MAX)
}

fn read_text(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<String, Error> {
    let text = reader.read_text(start.name())?;
    let unescaped = quick_xml::escape::unescape(&text).map_err(quick_xml::Error::from)?;
    Ok(unescaped.trim().to_owned())
}

/// Text of the first direct child named `child`; the rest of the parent
/// element is consumed.
fn first_child_text(
    reader: &mut Reader<&[u8]>,
    parent: &BytesStart<'_>,
    child: &[u8],
) -> Result<String, Error> {
    let mut text = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if text.is_none() && e.local_name().as_ref() == child {
                    text = Some(read_text(reader, &e)?);
                } else {
                    reader.read_to_end(e.name())?;
                }
            }
            Event::End(e) if e.name() == parent.name() => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text.unwrap_or_default())
}
