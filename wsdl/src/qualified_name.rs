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

use crate::namespaces::Namespaces;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Schema component name: namespace and local name.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct QualifiedName<'a> {
    /// Namespace URI. Empty for components without a namespace.
    pub namespace: &'a str,
    /// Local name.
    pub name: &'a str,
}

impl<'a> QualifiedName<'a> {
    /// Create new qualified name.
    #[must_use]
    pub const fn new(namespace: &'a str, name: &'a str) -> Self {
        Self { namespace, name }
    }

    /// Resolve a prefixed name (`tns:Foo`) with the `namespaces` in scope.
    /// An unprefixed name uses the default namespace. Returns `None` if
    /// the prefix is not bound.
    #[must_use]
    pub fn resolve(qname: &'a str, namespaces: &'a Namespaces) -> Option<Self> {
        let (prefix, name) = split_prefix(qname);
        namespaces
            .get(prefix.unwrap_or_default())
            .map(|ns| Self::new(ns, name))
            .or_else(|| prefix.is_none().then(|| Self::new("", name)))
    }
}

impl Display for QualifiedName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.namespace.is_empty() {
            self.name.fmt(f)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.name)
        }
    }
}

/// Split `prefix:name` into its prefix and local name.
#[must_use]
pub fn split_prefix(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, qname),
    }
}

/// Local part of a possibly prefixed name.
#[must_use]
pub fn strip_prefix(qname: &str) -> &str {
    split_prefix(qname).1
}
