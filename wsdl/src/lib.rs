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

//! WSDL 1.1 and XML Schema loading for soapkit.
//!
//! [`Resolver`] reads a WSDL or XSD document, follows its external
//! `import` and `include` references and produces a
//! [`ResolvedSchemaSet`]. [`TypeIndex`] answers lookups over that set:
//! message body types, SOAP actions, service addresses and components
//! by qualified name.
//!
//! ```no_run
//! use soapkit_wsdl::Resolver;
//! use soapkit_wsdl::ResolverSettings;
//! use soapkit_wsdl::TypeIndex;
//!
//! # fn main() -> Result<(), soapkit_wsdl::Error> {
//! let resolver = Resolver::new(ResolverSettings::new())?;
//! let set = resolver.resolve("stockquote.wsdl")?;
//! let index = TypeIndex::build(&set);
//! let action = index.soap_action_for("GetLastTradePrice", "StockQuotePortType");
//! # let _ = action;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetcher;
pub mod location;
pub mod namespaces;
pub mod qualified_name;
pub mod resolver;
pub mod type_index;
pub mod wsdl;
pub mod xsd;

#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use fetcher::CachingFetcher;
#[doc(inline)]
pub use fetcher::DefaultFetcher;
#[doc(inline)]
pub use fetcher::Fetcher;
#[doc(inline)]
pub use fetcher::FetcherParams;
#[doc(inline)]
pub use location::Location;
#[doc(inline)]
pub use namespaces::NamespacePrefixes;
#[doc(inline)]
pub use qualified_name::split_prefix;
#[doc(inline)]
pub use qualified_name::strip_prefix;
#[doc(inline)]
pub use qualified_name::QualifiedName;
#[doc(inline)]
pub use resolver::ResolvedSchemaSet;
#[doc(inline)]
pub use resolver::Resolver;
#[doc(inline)]
pub use resolver::ResolverSettings;
#[doc(inline)]
pub use type_index::TypeIndex;
