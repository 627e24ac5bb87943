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

//! MIME media types and `multipart/*` bodies (RFC 2045, RFC 2046).

use crate::Error;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use std::collections::BTreeMap;

/// Parsed `Content-Type` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    params: BTreeMap<String, String>,
}

impl MediaType {
    /// Parse `type/subtype; name=value; name="quoted value"`. Type and
    /// parameter names are case-insensitive and stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns an error if the essence or a parameter is malformed.
    pub fn parse(value: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidMediaType(value.to_owned());
        let (essence, mut rest) = value.split_once(';').unwrap_or((value, ""));
        let essence = essence.trim().to_ascii_lowercase();
        match essence.split_once('/') {
            Some((t, s)) if !t.is_empty() && !s.is_empty() && !s.contains('/') => {}
            _ => return Err(invalid()),
        }
        let mut params = BTreeMap::new();
        loop {
            rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
            if rest.is_empty() {
                break;
            }
            let (name, after) = rest.split_once('=').ok_or_else(invalid)?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return Err(invalid());
            }
            let after = after.trim_start();
            let (param, remaining) = if let Some(quoted) = after.strip_prefix('"') {
                read_quoted(quoted).ok_or_else(invalid)?
            } else {
                let end = after.find(';').unwrap_or(after.len());
                (after[..end].trim().to_owned(), &after[end..])
            };
            params.insert(name, param);
            rest = remaining;
        }
        Ok(Self { essence, params })
    }

    /// `type/subtype`, lowercased.
    #[must_use]
    pub fn essence(&self) -> &str {
        &self.essence
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.essence.starts_with("multipart/")
    }
}

/// Returns the unescaped quoted string and the input after the closing quote.
fn read_quoted(s: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?.1),
            '"' => return Some((out, &s[i + 1..])),
            _ => out.push(c),
        }
    }
    None
}

/// One part of a multipart body.
#[derive(Debug, Clone, Default)]
pub struct Part {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Part {
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// `Content-ID` with surrounding `<>` removed.
    #[must_use]
    pub fn content_id(&self) -> Option<&str> {
        self.header("content-id")
            .map(|id| id.trim_matches(|c: char| c == '<' || c == '>'))
            .filter(|id| !id.is_empty())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Writer of a multipart body into memory.
#[derive(Debug)]
pub struct MultipartWriter {
    boundary: String,
    buf: Vec<u8>,
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartWriter {
    /// Writer with a random boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(uuid::Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: Vec::new(),
        }
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Append a part. Headers are written in insertion order.
    pub fn write_part(&mut self, headers: &HeaderMap, body: &[u8]) {
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        for (name, value) in headers {
            self.buf.extend_from_slice(canonical_header_name(name).as_bytes());
            self.buf.extend_from_slice(b": ");
            self.buf.extend_from_slice(value.as_bytes());
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"\r\n");
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\r\n");
    }

    /// Write the closing delimiter and return the body.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"--\r\n");
        self.buf
    }
}

/// `content-transfer-encoding` -> `Content-Transfer-Encoding`.
fn canonical_header_name(name: &HeaderName) -> String {
    name.as_str()
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Build a header value, reporting the offending text on failure.
pub(crate) fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::MalformedMultipart(format!("invalid header value: {value}")))
}

/// Reader of an in-memory multipart body. Lines may end with CRLF or LF.
#[derive(Debug)]
pub struct MultipartReader<'a> {
    data: &'a [u8],
    delimiter: Vec<u8>,
}

impl<'a> MultipartReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8], boundary: &str) -> Self {
        let mut delimiter = b"--".to_vec();
        delimiter.extend_from_slice(boundary.as_bytes());
        Self { data, delimiter }
    }

    /// Split the body into parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the opening or closing delimiter is missing or
    /// a part header is malformed.
    pub fn parts(&self) -> Result<Vec<Part>, Error> {
        let mut pos = self
            .find_delimiter(0)
            .ok_or_else(|| Error::MalformedMultipart("no opening boundary".into()))?;
        let mut parts = Vec::new();
        loop {
            let after = pos + self.delimiter.len();
            if self.data[after..].starts_with(b"--") {
                return Ok(parts);
            }
            let start = find(&self.data[after..], b"\n")
                .map(|eol| after + eol + 1)
                .ok_or_else(|| Error::MalformedMultipart("truncated part".into()))?;
            let next = self
                .find_delimiter(start)
                .ok_or_else(|| Error::MalformedMultipart("no closing boundary".into()))?;
            let mut end = next.saturating_sub(1).max(start);
            if end > start && self.data[end - 1] == b'\r' {
                end -= 1;
            }
            parts.push(parse_part(&self.data[start..end])?);
            pos = next;
        }
    }

    /// Delimiter line at `from` or at the start of a line after `from`.
    fn find_delimiter(&self, from: usize) -> Option<usize> {
        let mut offset = from;
        while let Some(found) = find(&self.data[offset..], &self.delimiter) {
            let at = offset + found;
            if (at == 0 || self.data[at - 1] == b'\n') && self.ends_delimiter_line(at) {
                return Some(at);
            }
            offset = at + 1;
        }
        None
    }

    /// After the delimiter only `--`, transport padding and the line end
    /// may follow (RFC 2046 5.1.1).
    fn ends_delimiter_line(&self, at: usize) -> bool {
        let mut rest = &self.data[at + self.delimiter.len()..];
        if rest.starts_with(b"--") {
            rest = &rest[2..];
        }
        match rest.iter().position(|b| *b != b' ' && *b != b'\t') {
            Some(eol) => rest[eol..].starts_with(b"\r\n") || rest[eol..].starts_with(b"\n"),
            None => true,
        }
    }
}

fn parse_part(raw: &[u8]) -> Result<Part, Error> {
    let (head, body) = if raw.starts_with(b"\r\n") {
        (&raw[..0], &raw[2..])
    } else if raw.starts_with(b"\n") {
        (&raw[..0], &raw[1..])
    } else {
        let crlf = find(raw, b"\r\n\r\n").map(|i| (i, i + 4));
        let lf = find(raw, b"\n\n").map(|i| (i, i + 2));
        let (head_end, body_start) = match (crlf, lf) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => (raw.len(), raw.len()),
        };
        (&raw[..head_end], &raw[body_start..])
    };

    let head = std::str::from_utf8(head)
        .map_err(|_| Error::MalformedMultipart("part header is not UTF-8".into()))?;
    let mut lines: Vec<String> = Vec::new();
    for line in head.lines() {
        if line.starts_with(|c: char| c == ' ' || c == '\t') {
            if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(line.trim());
                continue;
            }
        }
        if !line.trim().is_empty() {
            lines.push(line.to_owned());
        }
    }

    let mut headers = HeaderMap::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::MalformedMultipart(format!("invalid part header: {line}")))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| Error::MalformedMultipart(format!("invalid part header: {line}")))?;
        headers.append(name, header_value(value.trim())?);
    }
    Ok(Part {
        headers,
        body: body.to_vec(),
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
