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

//! Namespace declarations and prefix allocation.

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::PrefixDeclaration;
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Prefix to namespace bindings. The default namespace uses the empty
/// prefix.
pub type Namespaces = BTreeMap<String, String>;

/// Namespace declarations in scope of the interesting elements of a
/// WSDL or XSD document.
#[derive(Debug, Default)]
pub struct Declarations {
    /// Local name of the root element.
    pub root: String,
    /// Bindings in scope of the root element.
    pub root_namespaces: Namespaces,
    /// Bindings in scope of each `schema` element embedded in `types`,
    /// in document order.
    pub schemas: Vec<Namespaces>,
}

/// Only the root, `types` and embedded `schema` scopes are tracked.
const TRACKED_DEPTH: usize = 3;

/// Collect namespace declarations of the root element and of schemas
/// embedded in WSDL `types`.
///
/// # Errors
///
/// Returns an error if the document is not well-formed.
pub fn scan(data: &[u8]) -> Result<Declarations, quick_xml::Error> {
    let mut reader = Reader::from_reader(data);
    let mut out = Declarations::default();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut scopes: Vec<Namespaces> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if let Some(scope) = visit(&e, &path, &scopes, &mut out)? {
                    scopes.push(scope);
                }
                path.push(e.local_name().as_ref().to_vec());
            }
            Event::Empty(e) => {
                visit(&e, &path, &scopes, &mut out)?;
            }
            Event::End(_) => {
                path.pop();
                scopes.truncate(path.len());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

fn visit(
    e: &BytesStart<'_>,
    path: &[Vec<u8>],
    scopes: &[Namespaces],
    out: &mut Declarations,
) -> Result<Option<Namespaces>, quick_xml::Error> {
    if path.len() >= TRACKED_DEPTH {
        return Ok(None);
    }
    let mut scope = scopes.last().cloned().unwrap_or_default();
    for attr in e.attributes() {
        let attr = attr?;
        let prefix = match attr.key.as_namespace_binding() {
            Some(PrefixDeclaration::Default) => String::new(),
            Some(PrefixDeclaration::Named(prefix)) => String::from_utf8_lossy(prefix).into_owned(),
            None => continue,
        };
        let value = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&value).map_err(quick_xml::Error::from)?;
        scope.insert(prefix, value.into_owned());
    }

    let local = e.local_name();
    if path.is_empty() {
        out.root = String::from_utf8_lossy(local.as_ref()).into_owned();
        out.root_namespaces = scope.clone();
    } else if local.as_ref() == b"schema"
        && path.last().map(Vec::as_slice) == Some(&b"types"[..])
    {
        out.schemas.push(scope.clone());
    }
    Ok(Some(scope))
}

/// Allocates short prefixes (`ns1`, `ns2`, ...) to namespaces in the
/// order they are first seen.
#[derive(Debug, Default, Clone)]
pub struct NamespacePrefixes {
    by_namespace: BTreeMap<String, String>,
    order: Vec<String>,
}

impl NamespacePrefixes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for `namespace`, allocating one if needed.
    pub fn allocate(&mut self, namespace: &str) -> &str {
        if !self.by_namespace.contains_key(namespace) {
            let prefix = format!("ns{}", self.order.len() + 1);
            self.order.push(namespace.to_owned());
            self.by_namespace.insert(namespace.to_owned(), prefix);
        }
        self.by_namespace
            .get(namespace)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Prefix allocated to `namespace`, if any.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&str> {
        self.by_namespace.get(namespace).map(String::as_str)
    }

    /// `(namespace, prefix)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.order
            .iter()
            .filter_map(move |ns| self.get(ns).map(|prefix| (ns.as_str(), prefix)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WSDL: &str = r#"<?xml version="1.0"?>
<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
             xmlns:tns="urn:quotes" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <types xmlns:common="urn:common">
    <xsd:schema targetNamespace="urn:quotes" xmlns:tns="urn:quotes:types">
      <xsd:element name="a" xmlns:deep="urn:ignored"/>
    </xsd:schema>
    <xsd:schema targetNamespace="urn:other"/>
  </types>
</definitions>"#;

    #[test]
    fn scans_wsdl_scopes() {
        let decl = scan(WSDL.as_bytes()).unwrap();
        assert_eq!(decl.root, "definitions");
        assert_eq!(
            decl.root_namespaces.get("").map(String::as_str),
            Some("http://schemas.xmlsoap.org/wsdl/")
        );
        assert_eq!(decl.schemas.len(), 2);

        let first = &decl.schemas[0];
        assert_eq!(first.get("tns").map(String::as_str), Some("urn:quotes:types"));
        assert_eq!(first.get("common").map(String::as_str), Some("urn:common"));
        assert_eq!(
            first.get("xsd").map(String::as_str),
            Some("http://www.w3.org/2001/XMLSchema")
        );
        assert!(!first.contains_key("deep"));

        let second = &decl.schemas[1];
        assert_eq!(second.get("tns").map(String::as_str), Some("urn:quotes"));
    }

    #[test]
    fn scans_schema_root() {
        let decl = scan(
            br#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:po="urn:po"/>"#,
        )
        .unwrap();
        assert_eq!(decl.root, "schema");
        assert_eq!(decl.root_namespaces.len(), 2);
        assert!(decl.schemas.is_empty());
    }

    #[test]
    fn allocates_prefixes_in_order() {
        let mut prefixes = NamespacePrefixes::new();
        assert_eq!(prefixes.allocate("urn:a"), "ns1");
        assert_eq!(prefixes.allocate("urn:b"), "ns2");
        assert_eq!(prefixes.allocate("urn:a"), "ns1");
        assert_eq!(prefixes.get("urn:c"), None);
        assert_eq!(
            prefixes.iter().collect::<Vec<_>>(),
            [("urn:a", "ns1"), ("urn:b", "ns2")]
        );
    }
}
