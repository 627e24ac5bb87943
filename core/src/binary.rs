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

//! Binary payloads carried inside SOAP messages.
//!
//! A [`Binary`] is inlined as base64 text by default. When MTOM is
//! enabled it is replaced by a XOP placeholder
//! (`<Include xmlns="http://www.w3.org/2004/08/xop/include" href="cid:ID"/>`)
//! and its bytes travel in a separate MIME part with `Content-ID: <ID>`.
//!
//! Request and response types expose their binary fields through
//! [`BinaryFields`], which the MTOM codec uses to collect parts when
//! encoding and to bind parts when decoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::Error as _;
use serde::ser::SerializeStruct as _;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// Namespace of XOP include elements.
pub const XOP_NAMESPACE: &str = "http://www.w3.org/2004/08/xop/include";

/// Content type of a binary when none is set.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Binary content of a SOAP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    content: Vec<u8>,
    content_type: String,
    package_id: String,
    use_mtom: bool,
}

impl Default for Binary {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Binary {
    /// Create binary content with the default content type, no package
    /// id and MTOM disabled.
    #[must_use]
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            content_type: DEFAULT_CONTENT_TYPE.into(),
            package_id: String::new(),
            use_mtom: false,
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.content
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Identifier of the MIME part (without `<>`).
    #[must_use]
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    #[must_use]
    pub const fn use_mtom(&self) -> bool {
        self.use_mtom
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Override the package id used for the MIME part.
    #[must_use]
    pub fn with_package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = package_id.into();
        self
    }

    /// Switch XOP encoding on or off. Enabling it assigns a random
    /// package id if none is set.
    pub fn set_use_mtom(&mut self, use_mtom: bool) {
        self.use_mtom = use_mtom;
        if use_mtom && self.package_id.is_empty() {
            self.package_id = uuid::Uuid::new_v4().to_string();
        }
    }

    pub(crate) fn set_content(&mut self, content: Vec<u8>, content_type: String) {
        self.content = content;
        if !content_type.is_empty() {
            self.content_type = content_type;
        }
    }
}

#[derive(Serialize, Deserialize)]
struct XopInclude {
    #[serde(rename = "@xmlns", skip_deserializing, default)]
    xmlns: String,
    #[serde(rename = "@href")]
    href: String,
}

#[derive(Deserialize)]
struct BinaryRepr {
    #[serde(rename = "Include")]
    include: Option<XopInclude>,
    #[serde(rename = "$text")]
    text: Option<String>,
}

impl Serialize for Binary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.use_mtom {
            let mut s = serializer.serialize_struct("Binary", 1)?;
            s.serialize_field(
                "Include",
                &XopInclude {
                    xmlns: XOP_NAMESPACE.into(),
                    href: format!("cid:{}", self.package_id),
                },
            )?;
            s.end()
        } else {
            serializer.serialize_str(&BASE64.encode(&self.content))
        }
    }
}

impl<'de> Deserialize<'de> for Binary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = BinaryRepr::deserialize(deserializer)?;
        if let Some(include) = repr.include {
            let package_id = include
                .href
                .strip_prefix("cid:")
                .unwrap_or(&include.href)
                .to_owned();
            return Ok(Self {
                content: Vec::new(),
                content_type: DEFAULT_CONTENT_TYPE.into(),
                package_id,
                use_mtom: true,
            });
        }
        let text: String = repr
            .text
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let content = BASE64.decode(text.as_bytes()).map_err(D::Error::custom)?;
        Ok(Self::new(content))
    }
}

/// Access to the [`Binary`] fields of a message type.
///
/// Types without binaries implement it with an empty body:
///
/// ```rust
/// use soapkit_core::BinaryFields;
///
/// struct Ping;
/// impl BinaryFields for Ping {}
/// ```
pub trait BinaryFields {
    /// Visit every binary field.
    fn binaries(&self, _visit: &mut dyn FnMut(&Binary)) {}

    /// Visit every binary field mutably.
    fn binaries_mut(&mut self, _visit: &mut dyn FnMut(&mut Binary)) {}
}

impl BinaryFields for Binary {
    fn binaries(&self, visit: &mut dyn FnMut(&Binary)) {
        visit(self);
    }

    fn binaries_mut(&mut self, visit: &mut dyn FnMut(&mut Binary)) {
        visit(self);
    }
}

impl<T: BinaryFields> BinaryFields for Option<T> {
    fn binaries(&self, visit: &mut dyn FnMut(&Binary)) {
        if let Some(v) = self {
            v.binaries(visit);
        }
    }

    fn binaries_mut(&mut self, visit: &mut dyn FnMut(&mut Binary)) {
        if let Some(v) = self {
            v.binaries_mut(visit);
        }
    }
}

impl<T: BinaryFields> BinaryFields for Vec<T> {
    fn binaries(&self, visit: &mut dyn FnMut(&Binary)) {
        for v in self {
            v.binaries(visit);
        }
    }

    fn binaries_mut(&mut self, visit: &mut dyn FnMut(&mut Binary)) {
        for v in self {
            v.binaries_mut(visit);
        }
    }
}

impl<T: BinaryFields + ?Sized> BinaryFields for Box<T> {
    fn binaries(&self, visit: &mut dyn FnMut(&Binary)) {
        (**self).binaries(visit);
    }

    fn binaries_mut(&mut self, visit: &mut dyn FnMut(&mut Binary)) {
        (**self).binaries_mut(visit);
    }
}

impl BinaryFields for () {}
impl BinaryFields for String {}

/// Named attachment of a MIME multipart message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub data: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}
