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

//! Document fetching.
//!
//! [`DefaultFetcher`] reads files and downloads URLs with a blocking
//! HTTP client. [`CachingFetcher`] keeps downloaded documents in a
//! directory shared between sessions.

use crate::Error;
use crate::Location;
use once_cell::sync::OnceCell;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Source of WSDL and XSD documents.
pub trait Fetcher {
    /// Fetch the document at `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or downloaded.
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, Error>;
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, Error> {
        (**self).fetch(location)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, Error> {
        (**self).fetch(location)
    }
}

/// Parameters of the default fetcher.
#[derive(Debug, Clone)]
pub struct FetcherParams {
    pub timeout: Option<Duration>,
    pub accept_invalid_certs: bool,
    pub user_agent: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

impl Default for FetcherParams {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            accept_invalid_certs: false,
            user_agent: None,
            cache_dir: None,
        }
    }
}

impl FetcherParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Skip TLS certificate verification.
    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Keep downloaded documents in `dir`.
    #[must_use]
    pub fn cache_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }
}

/// Reads files from disk and downloads URLs.
///
/// The HTTP client is created on the first download.
#[derive(Debug)]
pub struct DefaultFetcher {
    params: FetcherParams,
    client: OnceCell<reqwest::blocking::Client>,
}

impl DefaultFetcher {
    #[must_use]
    pub const fn new(params: FetcherParams) -> Self {
        Self {
            params,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, Error> {
        self.client.get_or_try_init(|| {
            let mut builder = reqwest::blocking::Client::builder()
                .timeout(self.params.timeout)
                .danger_accept_invalid_certs(self.params.accept_invalid_certs);
            if let Some(user_agent) = &self.params.user_agent {
                builder = builder.user_agent(user_agent.clone());
            }
            builder.build().map_err(Error::HttpClient)
        })
    }

    fn download(&self, url: &url::Url) -> Result<Vec<u8>, Error> {
        let response = self
            .client()?
            .get(url.clone())
            .send()
            .map_err(|err| Error::Http(url.to_string(), err))?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::HttpStatus(url.to_string(), status.as_u16()));
        }
        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| Error::Http(url.to_string(), err))
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new(FetcherParams::default())
    }
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, Error> {
        match location {
            Location::File(path) => read_file(path),
            Location::Url(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|()| Error::Io(url.to_string(), ErrorKind::InvalidInput.into()))
                .and_then(|path| read_file(&path)),
            Location::Url(url) => self.download(url),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|err| Error::Io(path.display().to_string(), err))
}

/// Wraps a fetcher with an on-disk cache of downloaded documents.
///
/// Entries are keyed by location and written once: a new entry is
/// written to a temporary file and renamed into place, so concurrent
/// sessions sharing the directory never observe partial documents.
/// Files on disk are read directly.
#[derive(Debug)]
pub struct CachingFetcher<F> {
    inner: F,
    dir: PathBuf,
}

impl<F: Fetcher> CachingFetcher<F> {
    /// Cache documents fetched by `inner` in `dir`. The directory is
    /// created if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new<P: Into<PathBuf>>(inner: F, dir: P) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| Error::Cache(dir.display().to_string(), err))?;
        Ok(Self { inner, dir })
    }

    /// Path of the cache entry for `location`.
    #[must_use]
    pub fn entry_path(&self, location: &Location) -> PathBuf {
        let key = Uuid::new_v5(&Uuid::NAMESPACE_URL, location.to_string().as_bytes());
        self.dir.join(format!("{key}.xml"))
    }
}

impl<F: Fetcher> Fetcher for CachingFetcher<F> {
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, Error> {
        if location.is_file() {
            return self.inner.fetch(location);
        }
        let entry = self.entry_path(location);
        match fs::read(&entry) {
            Ok(data) => {
                debug!(%location, entry = %entry.display(), "schema cache hit");
                return Ok(data);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(Error::Cache(entry.display().to_string(), err)),
        }
        let data = self.inner.fetch(location)?;
        let tmp = self.dir.join(format!("{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, &data)
            .and_then(|()| {
                if entry.exists() {
                    fs::remove_file(&tmp)
                } else {
                    fs::rename(&tmp, &entry)
                }
            })
            .map_err(|err| Error::Cache(entry.display().to_string(), err))?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
    }

    impl Fetcher for Counting {
        fn fetch(&self, _location: &Location) -> Result<Vec<u8>, Error> {
            self.calls.set(self.calls.get() + 1);
            Ok(b"<schema/>".to_vec())
        }
    }

    #[test]
    fn cache_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        let location = Location::parse("http://example.org/a.xsd").unwrap();

        let fetcher = CachingFetcher::new(
            Counting {
                calls: Cell::new(0),
            },
            &cache_dir,
        )
        .unwrap();
        assert_eq!(fetcher.fetch(&location).unwrap(), b"<schema/>");
        assert_eq!(fetcher.fetch(&location).unwrap(), b"<schema/>");
        assert_eq!(fetcher.inner.calls.get(), 1);
        assert!(fetcher.entry_path(&location).exists());

        let second = CachingFetcher::new(
            Counting {
                calls: Cell::new(0),
            },
            &cache_dir,
        )
        .unwrap();
        second.fetch(&location).unwrap();
        assert_eq!(second.inner.calls.get(), 0);
    }

    #[test]
    fn files_bypass_cache() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = CachingFetcher::new(
            Counting {
                calls: Cell::new(0),
            },
            dir.path(),
        )
        .unwrap();
        let location = Location::File(dir.path().join("local.xsd"));
        fetcher.fetch(&location).unwrap();
        fetcher.fetch(&location).unwrap();
        assert_eq!(fetcher.inner.calls.get(), 2);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let location = Location::File(dir.path().join("missing.xsd"));
        assert!(matches!(
            DefaultFetcher::default().fetch(&location),
            Err(Error::Io(..))
        ));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xsd");
        fs::write(&path, "<schema/>").unwrap();
        let data = DefaultFetcher::default()
            .fetch(&Location::File(path))
            .unwrap();
        assert_eq!(data, b"<schema/>");
    }
}
