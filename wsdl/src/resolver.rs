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

//! Loading of a WSDL or XSD document together with every schema it
//! reaches through `import` and `include`.
//!
//! External references are resolved against the location of the
//! document that declares them. Each absolute location is fetched at
//! most once per session, so diamonds and cycles terminate. The number
//! of descents into fetched schemas is bounded by
//! [`ResolverSettings::max_depth`]; once the bound is hit, fetched
//! schemas are kept but their own references are not followed.

use crate::fetcher::CachingFetcher;
use crate::fetcher::DefaultFetcher;
use crate::fetcher::Fetcher;
use crate::fetcher::FetcherParams;
use crate::namespaces;
use crate::namespaces::NamespacePrefixes;
use crate::wsdl::Definitions;
use crate::xsd::Schema;
use crate::Error;
use crate::Location;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use tracing::info;
use tracing::warn;
use url::Url;

/// Name used in diagnostics for documents read from memory.
const IN_MEMORY: &str = "<memory>";

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Maximum number of descents into external schemas.
    pub max_depth: usize,
    pub fetcher: FetcherParams,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: 20,
            fetcher: FetcherParams::default(),
        }
    }
}

impl ResolverSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn fetcher(mut self, fetcher: FetcherParams) -> Self {
        self.fetcher = fetcher;
        self
    }
}

/// Schemas loaded by one resolution session.
#[derive(Debug)]
pub struct ResolvedSchemaSet {
    schemas: Vec<Schema>,
    definitions: Option<Definitions>,
    visited: HashSet<Location>,
    depth: usize,
    prefixes: NamespacePrefixes,
}

impl ResolvedSchemaSet {
    /// Schemas in load order: embedded or root schemas first, then
    /// referenced schemas depth first.
    #[must_use]
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// WSDL definitions when the root document is a WSDL.
    #[must_use]
    pub const fn definitions(&self) -> Option<&Definitions> {
        self.definitions.as_ref()
    }

    /// Whether `location` was loaded in this session.
    #[must_use]
    pub fn is_visited(&self, location: &Location) -> bool {
        self.visited.contains(location)
    }

    pub fn visited(&self) -> impl Iterator<Item = &Location> + '_ {
        self.visited.iter()
    }

    /// Number of descents performed.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Prefixes allocated to target namespaces in load order.
    #[must_use]
    pub const fn prefixes(&self) -> &NamespacePrefixes {
        &self.prefixes
    }
}

/// WSDL and XSD resolver.
pub struct Resolver<F = Box<dyn Fetcher>> {
    settings: ResolverSettings,
    fetcher: F,
}

impl Resolver {
    /// Create a resolver with the default fetcher, cached on disk when
    /// the settings name a cache directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created.
    pub fn new(settings: ResolverSettings) -> Result<Self, Error> {
        let fetcher = DefaultFetcher::new(settings.fetcher.clone());
        let fetcher: Box<dyn Fetcher> = match &settings.fetcher.cache_dir {
            Some(dir) => Box::new(CachingFetcher::new(fetcher, dir)?),
            None => Box::new(fetcher),
        };
        Ok(Self { settings, fetcher })
    }
}

impl<F: Fetcher> Resolver<F> {
    pub const fn with_fetcher(settings: ResolverSettings, fetcher: F) -> Self {
        Self { settings, fetcher }
    }

    /// Resolve the document at `root`, a file path or a URL.
    ///
    /// # Errors
    ///
    /// Any fetch, parse or validation failure aborts the resolution.
    pub fn resolve(&self, root: &str) -> Result<ResolvedSchemaSet, Error> {
        self.resolve_location(&Location::parse(root)?)
    }

    /// Resolve the document at `location`.
    ///
    /// # Errors
    ///
    /// Any fetch, parse or validation failure aborts the resolution.
    pub fn resolve_location(&self, location: &Location) -> Result<ResolvedSchemaSet, Error> {
        info!(%location, "fetching root document");
        let data = self.fetcher.fetch(location)?;
        self.resolve_document(&data, Some(location.clone()))
    }

    /// Resolve an already loaded document. Without a `location`, only
    /// absolute references can be followed.
    ///
    /// # Errors
    ///
    /// Any fetch, parse or validation failure aborts the resolution.
    pub fn resolve_document(
        &self,
        data: &[u8],
        location: Option<Location>,
    ) -> Result<ResolvedSchemaSet, Error> {
        let name = location
            .as_ref()
            .map_or_else(|| IN_MEMORY.to_owned(), ToString::to_string);
        let mut session = Session {
            fetcher: &self.fetcher,
            max_depth: self.settings.max_depth,
            set: ResolvedSchemaSet {
                schemas: Vec::new(),
                definitions: None,
                visited: location.iter().cloned().collect(),
                depth: 0,
                prefixes: NamespacePrefixes::new(),
            },
        };

        let declarations =
            namespaces::scan(data).map_err(|err| Error::XmlRead(name.clone(), err))?;
        match declarations.root.as_str() {
            "definitions" => {
                let mut definitions: Definitions = parse(data, &name)?;
                definitions.namespaces = declarations.root_namespaces;
                definitions.location = location.clone();
                if !definitions.target_namespace.is_empty() {
                    session.set.prefixes.allocate(&definitions.target_namespace);
                }
                let schemas = definitions.take_schemas();
                session.set.definitions = Some(definitions);
                let mut scopes = declarations.schemas.into_iter();
                for mut schema in schemas {
                    schema.namespaces = scopes.next().unwrap_or_default();
                    schema.location = location.clone();
                    session.add(schema, &name, true)?;
                }
            }
            "schema" => {
                let mut schema: Schema = parse(data, &name)?;
                schema.namespaces = declarations.root_namespaces;
                schema.location = location;
                session.add(schema, &name, true)?;
            }
            other => return Err(Error::UnknownRoot(name, other.to_owned())),
        }
        Ok(session.set)
    }
}

/// State of one resolution.
struct Session<'r, F> {
    fetcher: &'r F,
    max_depth: usize,
    set: ResolvedSchemaSet,
}

impl<F: Fetcher> Session<'_, F> {
    /// Record `schema` and, when `descend` is set, follow its imports
    /// then its includes.
    fn add(&mut self, schema: Schema, name: &str, descend: bool) -> Result<(), Error> {
        schema
            .validate()
            .map_err(|err| Error::Validate(name.to_owned(), err))?;
        if !schema.target_namespace.is_empty() {
            self.set.prefixes.allocate(&schema.target_namespace);
        }

        let mut references = Vec::new();
        for import in &schema.imports {
            match import.schema_location.as_deref() {
                Some(reference) if !reference.is_empty() => {
                    references.push((reference.to_owned(), None));
                }
                _ => warn!(
                    namespace = import.namespace.as_deref().unwrap_or_default(),
                    document = name,
                    "import without schemaLocation skipped"
                ),
            }
        }
        for include in &schema.includes {
            if let Some(reference) = include.schema_location.as_deref().filter(|r| !r.is_empty()) {
                references.push((reference.to_owned(), Some(schema.target_namespace.clone())));
            }
        }
        let base = schema.location.clone();
        self.set.schemas.push(schema);

        if !descend {
            if !references.is_empty() {
                warn!(
                    document = name,
                    depth = self.set.depth,
                    "maximum schema recursion depth reached, references not followed"
                );
            }
            return Ok(());
        }
        references
            .into_iter()
            .try_for_each(|(reference, includer_namespace)| {
                self.follow(base.as_ref(), &reference, includer_namespace)
            })
    }

    fn follow(
        &mut self,
        base: Option<&Location>,
        reference: &str,
        includer_namespace: Option<String>,
    ) -> Result<(), Error> {
        let location = match base {
            Some(base) => base.join(reference)?,
            None => absolute(reference).ok_or_else(|| Error::RelativeReference {
                reference: reference.to_owned(),
                base: IN_MEMORY.to_owned(),
            })?,
        };
        if !self.set.visited.insert(location.clone()) {
            debug!(%location, "schema already resolved, skipping");
            return Ok(());
        }

        info!(%location, "fetching external schema");
        let data = self.fetcher.fetch(&location)?;
        let name = location.to_string();
        let declarations =
            namespaces::scan(&data).map_err(|err| Error::XmlRead(name.clone(), err))?;
        if declarations.root != "schema" {
            return Err(Error::UnknownRoot(name, declarations.root));
        }
        let mut schema: Schema = parse(&data, &name)?;
        schema.namespaces = declarations.root_namespaces;
        schema.location = Some(location);
        if schema.target_namespace.is_empty() {
            if let Some(namespace) = includer_namespace {
                schema.target_namespace = namespace;
            }
        }

        let descend = self.set.depth < self.max_depth;
        if descend {
            self.set.depth += 1;
        }
        self.add(schema, &name, descend)
    }
}

/// Location of a reference that needs no base.
fn absolute(reference: &str) -> Option<Location> {
    if Path::new(reference).is_absolute() {
        return Some(Location::File(reference.into()));
    }
    Url::parse(reference).ok().map(Location::Url)
}

fn parse<T: DeserializeOwned>(data: &[u8], name: &str) -> Result<T, Error> {
    quick_xml::de::from_reader(data).map_err(|err| Error::Xml(name.to_owned(), err))
}
