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

//! Location of a WSDL or XSD document: an absolute URL or an absolute
//! file path.

use crate::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use url::ParseError;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Url(Url),
    File(PathBuf),
}

impl Location {
    /// Parse a raw location. Anything with a URL scheme is a URL;
    /// everything else is a file path made absolute against the
    /// current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the current
    /// directory cannot be determined.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        match Url::parse(raw) {
            Ok(url) => Ok(Self::Url(url)),
            Err(ParseError::RelativeUrlWithoutBase) => {
                let path = Path::new(raw);
                if path.is_absolute() {
                    Ok(Self::File(normalize(path)))
                } else {
                    let cwd = std::env::current_dir().map_err(Error::CurrentDir)?;
                    Ok(Self::File(normalize(&cwd.join(path))))
                }
            }
            Err(err) => Err(Error::InvalidLocation(raw.into(), err)),
        }
    }

    /// Resolve `reference` in the context of this location.
    ///
    /// URL bases join with URL rules. For a file base an absolute path
    /// stays a file, a reference with a scheme becomes a URL and
    /// anything else is joined with the base file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference cannot be joined to a URL base.
    pub fn join(&self, reference: &str) -> Result<Self, Error> {
        match self {
            Self::Url(base) => base
                .join(reference)
                .map(Self::Url)
                .map_err(|err| Error::InvalidLocation(reference.into(), err)),
            Self::File(base) => {
                let path = Path::new(reference);
                if path.is_absolute() {
                    return Ok(Self::File(normalize(path)));
                }
                if let Ok(url) = Url::parse(reference) {
                    return Ok(Self::Url(url));
                }
                let dir = base.parent().unwrap_or_else(|| Path::new("/"));
                Ok(Self::File(normalize(&dir.join(path))))
            }
        }
    }

    #[must_use]
    pub const fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Url(url) => url.as_str().fmt(f),
            Self::File(path) => path.display().fmt(f),
        }
    }
}

/// Lexically clean a path: drop `.` and fold `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut out, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if !out.pop() {
                        out.push(component);
                    }
                }
                _ => out.push(component),
            }
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url() {
        let location = Location::parse("http://example.org/my.wsdl").unwrap();
        assert!(location.is_url());
        assert_eq!(location.to_string(), "http://example.org/my.wsdl");
    }

    #[test]
    fn join_url() {
        let table = [
            ("http://example.org/my.wsdl", "some.xsd", "http://example.org/some.xsd"),
            (
                "http://example.org/folder/my.wsdl",
                "some.xsd",
                "http://example.org/folder/some.xsd",
            ),
            (
                "http://example.org/folder/my.wsdl",
                "../some.xsd",
                "http://example.org/some.xsd",
            ),
        ];
        for (base, reference, expected) in table.iter() {
            let joined = Location::parse(base).unwrap().join(reference).unwrap();
            assert!(joined.is_url());
            assert_eq!(joined.to_string(), *expected, "{base} + {reference}");
        }
    }

    #[test]
    fn parse_relative_file() {
        let cwd = std::env::current_dir().unwrap();
        for raw in ["fixtures/test.wsdl", "cmd/../fixtures/test.wsdl"].iter() {
            let location = Location::parse(raw).unwrap();
            assert!(location.is_file());
            assert_eq!(
                location,
                Location::File(cwd.join("fixtures").join("test.wsdl"))
            );
        }
    }

    #[test]
    fn join_file() {
        let cwd = std::env::current_dir().unwrap();
        let table = [
            ("fixtures/test.wsdl", "some.xsd", "fixtures/some.xsd"),
            ("fixtures/test.wsdl", "../xsd/some.xsd", "xsd/some.xsd"),
            ("fixtures/test.wsdl", "xsd/some.xsd", "fixtures/xsd/some.xsd"),
        ];
        for (base, reference, expected) in table.iter() {
            let joined = Location::parse(base).unwrap().join(reference).unwrap();
            assert_eq!(joined, Location::File(cwd.join(expected)));
        }
    }

    #[test]
    fn join_file_to_url() {
        let joined = Location::parse("fixtures/test.wsdl")
            .unwrap()
            .join("http://example.org/some.xsd")
            .unwrap();
        assert!(joined.is_url());
        assert_eq!(joined.to_string(), "http://example.org/some.xsd");
    }

    #[test]
    fn join_absolute_file() {
        let joined = Location::parse("/srv/a/test.wsdl")
            .unwrap()
            .join("/srv/b/./common.xsd")
            .unwrap();
        assert_eq!(joined, Location::File(PathBuf::from("/srv/b/common.xsd")));
    }
}
