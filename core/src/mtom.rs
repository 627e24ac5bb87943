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

//! Multipart SOAP messages: MTOM/XOP and plain MIME attachments.
//!
//! MTOM decoding is two-pass. All parts are buffered by `Content-ID`
//! first, the envelope is decoded, and only then are the binary fields
//! of the decoded value bound to their parts. Parts may therefore appear
//! in any order relative to the envelope.

use crate::decode_body;
use crate::mime::header_value;
use crate::mime::MediaType;
use crate::mime::MultipartReader;
use crate::mime::MultipartWriter;
use crate::mime::Part;
use crate::Attachment;
use crate::BinaryFields;
use crate::Body;
use crate::Error;
use http::header::CONTENT_DISPOSITION;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use http::HeaderValue;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::debug;

/// Media type of the MTOM root part.
pub const XOP_MEDIA_TYPE: &str = "application/xop+xml";

/// `Content-ID` of the envelope part of a MIME attachments message.
pub const ATTACHMENTS_START_ID: &str = "soaprequest@soapkit";

const CONTENT_ID: &str = "content-id";
const CONTENT_TRANSFER_ENCODING: &str = "content-transfer-encoding";

/// Encoder of MTOM requests.
#[derive(Debug, Default)]
pub struct MtomEncoder {
    writer: MultipartWriter,
}

impl MtomEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            writer: MultipartWriter::with_boundary(boundary),
        }
    }

    /// Enable XOP encoding on every binary of `request`. Must be called
    /// before the envelope is serialized.
    pub fn prepare<T: BinaryFields + ?Sized>(request: &mut T) {
        request.binaries_mut(&mut |binary| binary.set_use_mtom(true));
    }

    /// `Content-Type` of the encoded request.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!(
            "multipart/related; start-info=\"application/soap+xml\"; type=\"{XOP_MEDIA_TYPE}\"; boundary=\"{}\"",
            self.writer.boundary()
        )
    }

    /// Write the envelope part and one part per binary of `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if a binary has a content type or package id
    /// that cannot be used as a header value.
    pub fn encode<T: BinaryFields + ?Sized>(
        mut self,
        envelope: &[u8],
        request: &T,
    ) -> Result<Vec<u8>, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(XOP_MEDIA_TYPE));
        headers.insert(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("8bit"));
        self.writer.write_part(&headers, envelope);

        let mut parts = Vec::new();
        request.binaries(&mut |binary| {
            parts.push((
                binary.package_id().to_owned(),
                binary.content_type().to_owned(),
                binary.bytes().to_vec(),
            ));
        });
        for (package_id, content_type, content) in parts {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, header_value(&content_type)?);
            headers.insert(CONTENT_ID, header_value(&format!("<{package_id}>"))?);
            headers.insert(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("binary"));
            self.writer.write_part(&headers, &content);
        }
        Ok(self.writer.finish())
    }
}

/// Decoder of MTOM responses.
#[derive(Debug)]
pub struct MtomDecoder<'a> {
    body: &'a [u8],
    boundary: &'a str,
    start: Option<&'a str>,
}

impl<'a> MtomDecoder<'a> {
    /// `start` is the `Content-ID` of the envelope part, if the content
    /// type named one.
    #[must_use]
    pub const fn new(body: &'a [u8], boundary: &'a str, start: Option<&'a str>) -> Self {
        Self {
            body,
            boundary,
            start,
        }
    }

    /// Decode the envelope and bind binaries by package id.
    ///
    /// # Errors
    ///
    /// Returns an error if the multipart framing is broken, a non-root
    /// part has no `Content-ID`, the envelope cannot be decoded, or a
    /// binary references a missing part.
    pub fn decode<T: DeserializeOwned + BinaryFields>(&self) -> Result<Body<T>, Error> {
        let parts = MultipartReader::new(self.body, self.boundary).parts()?;
        let root = root_index(&parts, self.start, XOP_MEDIA_TYPE)?;

        let mut packages = HashMap::new();
        let mut envelope = None;
        for (index, part) in parts.into_iter().enumerate() {
            if index == root {
                envelope = Some(part.body);
                continue;
            }
            let id = part.content_id().ok_or(Error::MissingContentId)?.to_owned();
            let content_type = part.content_type().unwrap_or_default().to_owned();
            packages.insert(id, (part.body, content_type));
        }
        let envelope = envelope.ok_or(Error::MissingEnvelopePart)?;
        debug!(parts = packages.len(), "decoding MTOM response");

        match decode_body::<T>(&envelope)? {
            Body::Content(mut content) => {
                let mut missing = None;
                content.binaries_mut(&mut |binary| {
                    if !binary.use_mtom() || missing.is_some() {
                        return;
                    }
                    match packages.remove(binary.package_id()) {
                        Some((data, content_type)) => binary.set_content(data, content_type),
                        None => missing = Some(binary.package_id().to_owned()),
                    }
                });
                match missing {
                    Some(id) => Err(Error::MissingPart(id)),
                    None => Ok(Body::Content(content)),
                }
            }
            other => Ok(other),
        }
    }
}

/// Encoder and decoder of SOAP messages with MIME attachments.
#[derive(Debug, Default)]
pub struct MimeAttachmentCodec {
    writer: MultipartWriter,
}

impl MimeAttachmentCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            writer: MultipartWriter::with_boundary(boundary),
        }
    }

    /// `Content-Type` of the encoded request.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!(
            "multipart/related; start=\"<{ATTACHMENTS_START_ID}>\"; type=\"text/xml\"; boundary=\"{}\"",
            self.writer.boundary()
        )
    }

    /// Write the envelope part and one part per attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if an attachment name cannot be used in a header.
    pub fn encode(mut self, envelope: &[u8], attachments: &[Attachment]) -> Result<Vec<u8>, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml;charset=UTF-8"));
        headers.insert(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("8bit"));
        headers.insert(CONTENT_ID, header_value(&format!("<{ATTACHMENTS_START_ID}>"))?);
        self.writer.write_part(&headers, envelope);

        for attachment in attachments {
            let name = &attachment.name;
            let mut headers = HeaderMap::new();
            headers.insert(
                CONTENT_TYPE,
                header_value(&format!("application/octet-stream; name={name}"))?,
            );
            headers.insert(CONTENT_TRANSFER_ENCODING, HeaderValue::from_static("binary"));
            headers.insert(CONTENT_ID, header_value(&format!("<{name}>"))?);
            headers.insert(
                CONTENT_DISPOSITION,
                header_value(&format!("attachment; name=\"{name}\"; filename=\"{name}\""))?,
            );
            self.writer.write_part(&headers, &attachment.data);
        }
        Ok(self.writer.finish())
    }

    /// Decode the envelope part and return every other part as an
    /// attachment named after its `Content-ID`.
    ///
    /// # Errors
    ///
    /// Returns an error if the framing is broken, an attachment has no
    /// `Content-ID`, or the envelope cannot be decoded.
    pub fn decode<T: DeserializeOwned>(
        body: &[u8],
        boundary: &str,
        start: Option<&str>,
    ) -> Result<(Body<T>, Vec<Attachment>), Error> {
        let parts = MultipartReader::new(body, boundary).parts()?;
        let root = root_index(&parts, start, "text/xml")?;
        let mut attachments = Vec::new();
        let mut envelope = None;
        for (index, part) in parts.into_iter().enumerate() {
            if index == root {
                envelope = Some(part.body);
                continue;
            }
            let name = part.content_id().ok_or(Error::MissingContentId)?.to_owned();
            attachments.push(Attachment::new(name, part.body));
        }
        let envelope = envelope.ok_or(Error::MissingEnvelopePart)?;
        Ok((decode_body(&envelope)?, attachments))
    }
}

/// Index of the root part: the part named by `start`, otherwise the
/// first part of media type `essence`.
fn root_index(parts: &[Part], start: Option<&str>, essence: &str) -> Result<usize, Error> {
    let start = start.map(|id| id.trim_matches(|c: char| c == '<' || c == '>'));
    if let Some(start) = start.filter(|id| !id.is_empty()) {
        if let Some(index) = parts.iter().position(|p| p.content_id() == Some(start)) {
            return Ok(index);
        }
    }
    parts
        .iter()
        .position(|p| {
            p.content_type()
                .and_then(|ct| MediaType::parse(ct).ok())
                .map_or(false, |mt| mt.essence() == essence)
        })
        .ok_or(Error::MissingEnvelopePart)
}

/// Framing of a response, negotiated from its `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFraming {
    /// Plain XML envelope.
    Plain,
    /// MTOM/XOP multipart message.
    Mtom {
        boundary: String,
        start: Option<String>,
    },
    /// Multipart message with MIME attachments.
    Attachments {
        boundary: String,
        start: Option<String>,
    },
}

impl ResponseFraming {
    /// Non-multipart (or missing) content types are plain XML. A multipart
    /// type needs a boundary; with `type="application/xop+xml"` it is
    /// MTOM and `start-info` must name a SOAP media type.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type cannot be parsed, a multipart
    /// type has no boundary, or an MTOM type has a missing or unsupported
    /// `start-info`.
    pub fn from_content_type(content_type: Option<&str>) -> Result<Self, Error> {
        let Some(content_type) = content_type.filter(|ct| !ct.trim().is_empty()) else {
            return Ok(Self::Plain);
        };
        let media_type = MediaType::parse(content_type)?;
        if !media_type.is_multipart() {
            return Ok(Self::Plain);
        }
        let boundary = media_type
            .param("boundary")
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::MissingBoundary(content_type.to_owned()))?
            .to_owned();
        let start = media_type.param("start").map(ToOwned::to_owned);
        let is_xop = media_type
            .param("type")
            .map_or(false, |t| t.eq_ignore_ascii_case(XOP_MEDIA_TYPE));
        if !is_xop {
            return Ok(Self::Attachments { boundary, start });
        }
        match media_type.param("start-info") {
            Some(info)
                if info.eq_ignore_ascii_case("application/soap+xml")
                    || info.eq_ignore_ascii_case("text/xml") =>
            {
                Ok(Self::Mtom { boundary, start })
            }
            other => Err(Error::InvalidStartInfo(other.map(ToOwned::to_owned))),
        }
    }
}

/// Decode a response body according to its `Content-Type`. Attachments
/// are returned only for MIME attachment messages.
///
/// # Errors
///
/// Returns framing, multipart and envelope decoding errors.
pub fn decode_message<T: DeserializeOwned + BinaryFields>(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<(Body<T>, Vec<Attachment>), Error> {
    match ResponseFraming::from_content_type(content_type)? {
        ResponseFraming::Plain => Ok((decode_body(body)?, Vec::new())),
        ResponseFraming::Mtom { boundary, start } => Ok((
            MtomDecoder::new(body, &boundary, start.as_deref()).decode()?,
            Vec::new(),
        )),
        ResponseFraming::Attachments { boundary, start } => {
            MimeAttachmentCodec::decode(body, &boundary, start.as_deref())
        }
    }
}
