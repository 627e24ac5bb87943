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

//! XML Schema (XSD 1.0) document model.
//!
//! Structures mirror the XSD elements they are read from. Child
//! elements are matched by local name, so any prefix bound to the
//! XML Schema namespace works. Names referencing other components
//! (`type`, `ref`, `base`, ...) are kept as prefixed strings and
//! resolved through [`TypeIndex`](crate::TypeIndex).

use crate::Location;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Namespace of XML Schema documents.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Validation error of a schema document.
#[derive(Debug)]
pub enum ValidateError {
    /// Two global components of the same symbol space share a name.
    DuplicateName(&'static str, String),
    /// Element sets more than one of inline type, `type` and `ref`.
    ConflictingElementType(String),
    /// Global component without a name.
    MissingName(&'static str),
}

impl Display for ValidateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::DuplicateName(kind, name) => write!(f, "duplicate {kind} name: {name}"),
            Self::ConflictingElementType(name) => write!(
                f,
                "element {name} must set at most one of inline type, type and ref"
            ),
            Self::MissingName(kind) => write!(f, "global {kind} without name"),
        }
    }
}

impl StdError for ValidateError {}

/// `xs:schema` document.
#[derive(Debug, Default, Deserialize)]
pub struct Schema {
    #[serde(rename = "@targetNamespace", default)]
    pub target_namespace: String,
    #[serde(rename = "@elementFormDefault")]
    pub element_form_default: Option<String>,
    #[serde(rename = "@attributeFormDefault")]
    pub attribute_form_default: Option<String>,
    #[serde(rename = "@version")]
    pub version: Option<String>,
    #[serde(rename = "include", default)]
    pub includes: Vec<Include>,
    #[serde(rename = "import", default)]
    pub imports: Vec<Import>,
    #[serde(rename = "element", default)]
    pub elements: Vec<Element>,
    #[serde(rename = "attribute", default)]
    pub attributes: Vec<Attribute>,
    #[serde(rename = "complexType", default)]
    pub complex_types: Vec<ComplexType>,
    #[serde(rename = "simpleType", default)]
    pub simple_types: Vec<SimpleType>,
    #[serde(rename = "attributeGroup", default)]
    pub attribute_groups: Vec<AttributeGroup>,
    #[serde(rename = "group", default)]
    pub groups: Vec<Group>,
    /// Prefix to namespace bindings in scope of the schema element.
    #[serde(skip)]
    pub namespaces: BTreeMap<String, String>,
    /// Where the document was loaded from. `None` for documents read
    /// from memory.
    #[serde(skip)]
    pub location: Option<Location>,
}

impl Schema {
    /// Namespace bound to `prefix`. The empty prefix is the default
    /// namespace.
    #[must_use]
    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// Whether local elements are qualified by default.
    #[must_use]
    pub fn elements_qualified(&self) -> bool {
        self.element_form_default.as_deref() == Some("qualified")
    }

    /// Check name uniqueness per symbol space and element type
    /// exclusivity.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ValidateError> {
        unique("element", self.elements.iter().map(|e| e.name.as_deref()))?;
        unique(
            "type",
            self.complex_types
                .iter()
                .map(|t| t.name.as_deref())
                .chain(self.simple_types.iter().map(|t| t.name.as_deref())),
        )?;
        unique("attribute", self.attributes.iter().map(|a| a.name.as_deref()))?;
        unique(
            "attribute group",
            self.attribute_groups.iter().map(|g| g.name.as_deref()),
        )?;
        unique("group", self.groups.iter().map(|g| g.name.as_deref()))?;

        let mut nested = Vec::new();
        for element in &self.elements {
            element.collect_nested(&mut nested);
        }
        for ct in &self.complex_types {
            ct.collect_elements(&mut nested);
        }
        self.elements
            .iter()
            .chain(nested)
            .try_for_each(Element::validate)
    }
}

fn unique<'a, I>(kind: &'static str, names: I) -> Result<(), ValidateError>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut seen = HashSet::new();
    for name in names {
        let name = name.ok_or(ValidateError::MissingName(kind))?;
        if !seen.insert(name) {
            return Err(ValidateError::DuplicateName(kind, name.into()));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Include {
    #[serde(rename = "@schemaLocation")]
    pub schema_location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Import {
    #[serde(rename = "@namespace")]
    pub namespace: Option<String>,
    #[serde(rename = "@schemaLocation")]
    pub schema_location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Annotation {
    #[serde(rename = "documentation", default)]
    pub documentation: Vec<Documentation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Documentation {
    #[serde(rename = "$text", default)]
    pub text: String,
}

/// Joined documentation text of an optional annotation.
fn documentation(annotation: Option<&Annotation>) -> Option<String> {
    let text = annotation?
        .documentation
        .iter()
        .map(|d| d.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    Some(text).filter(|t| !t.is_empty())
}

/// Upper bound of occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u64),
    Unbounded,
}

impl MaxOccurs {
    #[must_use]
    pub const fn allows_many(self) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded(n) => n > 1,
        }
    }
}

/// `xs:element`, global or local.
#[derive(Debug, Default, Deserialize)]
pub struct Element {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@type")]
    pub r#type: Option<String>,
    #[serde(rename = "@ref")]
    pub r#ref: Option<String>,
    #[serde(rename = "@nillable", default)]
    pub nillable: bool,
    #[serde(rename = "@abstract", default)]
    pub r#abstract: bool,
    #[serde(rename = "@minOccurs")]
    pub min_occurs: Option<String>,
    #[serde(rename = "@maxOccurs")]
    pub max_occurs: Option<String>,
    #[serde(rename = "@default")]
    pub default: Option<String>,
    #[serde(rename = "@fixed")]
    pub fixed: Option<String>,
    #[serde(rename = "@substitutionGroup")]
    pub substitution_group: Option<String>,
    pub annotation: Option<Annotation>,
    #[serde(rename = "complexType")]
    pub complex_type: Option<ComplexType>,
    #[serde(rename = "simpleType")]
    pub simple_type: Option<SimpleType>,
}

impl Element {
    /// Name of the element, or the local part of the referenced element.
    #[must_use]
    pub fn effective_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.r#ref.as_deref().map(crate::strip_prefix))
    }

    #[must_use]
    pub fn documentation(&self) -> Option<String> {
        documentation(self.annotation.as_ref())
    }

    /// Upper bound of occurrences; `1` when unset.
    #[must_use]
    pub fn max_occurs(&self) -> MaxOccurs {
        parse_max_occurs(self.max_occurs.as_deref())
    }

    /// Lower bound of occurrences; `1` when unset or malformed.
    #[must_use]
    pub fn min_occurs(&self) -> u64 {
        self.min_occurs
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(1)
    }

    /// Element may appear more than once.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.max_occurs().allows_many()
    }

    /// Element may be absent.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.min_occurs() == 0
    }

    fn validate(&self) -> Result<(), ValidateError> {
        let set = [
            self.complex_type.is_some(),
            self.simple_type.is_some(),
            self.r#type.is_some(),
            self.r#ref.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if set > 1 {
            let name = self.effective_name().unwrap_or_default().to_owned();
            return Err(ValidateError::ConflictingElementType(name));
        }
        Ok(())
    }

    /// Elements declared inside the inline complex type, recursively.
    pub(crate) fn collect_nested<'a>(&'a self, out: &mut Vec<&'a Element>) {
        if let Some(ct) = &self.complex_type {
            ct.collect_elements(out);
        }
    }
}

fn parse_max_occurs(value: Option<&str>) -> MaxOccurs {
    match value.map(str::trim) {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(v) => MaxOccurs::Bounded(v.parse().unwrap_or(1)),
        None => MaxOccurs::Bounded(1),
    }
}

/// Item of a model group. Wildcards and annotations are skipped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Particle {
    Element(Element),
    Sequence(ModelGroup),
    Choice(ModelGroup),
    All(ModelGroup),
    Group(Group),
    #[serde(other)]
    Other,
}

/// `xs:sequence`, `xs:choice` or `xs:all`.
#[derive(Debug, Default, Deserialize)]
pub struct ModelGroup {
    #[serde(rename = "@minOccurs")]
    pub min_occurs: Option<String>,
    #[serde(rename = "@maxOccurs")]
    pub max_occurs: Option<String>,
    #[serde(rename = "$value", default)]
    pub particles: Vec<Particle>,
}

impl ModelGroup {
    /// Elements of this group and nested groups in document order. Group
    /// references are not expanded.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_elements(&mut out);
        out
    }

    /// Group may repeat.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        parse_max_occurs(self.max_occurs.as_deref()).allows_many()
    }

    fn collect_elements<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for particle in &self.particles {
            match particle {
                Particle::Element(e) => {
                    out.push(e);
                    e.collect_nested(out);
                }
                Particle::Sequence(g) | Particle::Choice(g) | Particle::All(g) => {
                    g.collect_elements(out);
                }
                Particle::Group(g) => g.collect_elements(out),
                Particle::Other => {}
            }
        }
    }
}

fn collect_content<'a>(
    groups: [&'a Option<ModelGroup>; 3],
    group: Option<&'a Group>,
    out: &mut Vec<&'a Element>,
) {
    for g in groups.iter().copied().flatten() {
        g.collect_elements(out);
    }
    if let Some(g) = group {
        g.collect_elements(out);
    }
}

/// `xs:complexType`, named or anonymous.
#[derive(Debug, Default, Deserialize)]
pub struct ComplexType {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@abstract", default)]
    pub r#abstract: bool,
    #[serde(rename = "@mixed", default)]
    pub mixed: bool,
    pub annotation: Option<Annotation>,
    pub sequence: Option<ModelGroup>,
    pub choice: Option<ModelGroup>,
    pub all: Option<ModelGroup>,
    pub group: Option<Group>,
    #[serde(rename = "attribute", default)]
    pub attributes: Vec<Attribute>,
    #[serde(rename = "attributeGroup", default)]
    pub attribute_groups: Vec<AttributeGroup>,
    #[serde(rename = "complexContent")]
    pub complex_content: Option<ComplexContent>,
    #[serde(rename = "simpleContent")]
    pub simple_content: Option<SimpleContent>,
}

impl ComplexType {
    #[must_use]
    pub fn documentation(&self) -> Option<String> {
        documentation(self.annotation.as_ref())
    }

    /// Every element declared by this type, flattening nested particle
    /// groups and the particles of a complex content derivation.
    #[must_use]
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_elements(&mut out);
        out
    }

    /// Base type derivation, if any.
    #[must_use]
    pub fn derivation(&self) -> Option<Derivation<'_>> {
        self.complex_content
            .as_ref()
            .and_then(ComplexContent::derivation)
            .or_else(|| self.simple_content.as_ref().and_then(SimpleContent::derivation))
    }

    /// Attributes declared directly or by a derivation.
    #[must_use]
    pub fn all_attributes(&self) -> Vec<&Attribute> {
        let derived = match self.derivation() {
            Some(Derivation::Extension(e)) => e.attributes.iter(),
            Some(Derivation::Restriction(r)) => r.attributes.iter(),
            None => [].iter(),
        };
        self.attributes.iter().chain(derived).collect()
    }

    pub(crate) fn collect_elements<'a>(&'a self, out: &mut Vec<&'a Element>) {
        collect_content([&self.sequence, &self.choice, &self.all], self.group.as_ref(), out);
        match self.complex_content.as_ref().and_then(ComplexContent::derivation) {
            Some(Derivation::Extension(e)) => {
                collect_content([&e.sequence, &e.choice, &e.all], e.group.as_ref(), out);
            }
            Some(Derivation::Restriction(r)) => {
                collect_content([&r.sequence, &r.choice, &r.all], r.group.as_ref(), out);
            }
            None => {}
        }
    }
}

/// Derivation of a complex type from a base type.
#[derive(Debug, Clone, Copy)]
pub enum Derivation<'a> {
    Extension(&'a Extension),
    Restriction(&'a Restriction),
}

impl<'a> Derivation<'a> {
    /// Prefixed name of the base type.
    #[must_use]
    pub fn base(&self) -> Option<&'a str> {
        match self {
            Self::Extension(e) => e.base.as_deref(),
            Self::Restriction(r) => r.base.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ComplexContent {
    #[serde(rename = "@mixed")]
    pub mixed: Option<bool>,
    pub extension: Option<Extension>,
    pub restriction: Option<Restriction>,
}

impl ComplexContent {
    #[must_use]
    pub fn derivation(&self) -> Option<Derivation<'_>> {
        self.extension
            .as_ref()
            .map(Derivation::Extension)
            .or_else(|| self.restriction.as_ref().map(Derivation::Restriction))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SimpleContent {
    pub extension: Option<Extension>,
    pub restriction: Option<Restriction>,
}

impl SimpleContent {
    #[must_use]
    pub fn derivation(&self) -> Option<Derivation<'_>> {
        self.extension
            .as_ref()
            .map(Derivation::Extension)
            .or_else(|| self.restriction.as_ref().map(Derivation::Restriction))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Extension {
    #[serde(rename = "@base")]
    pub base: Option<String>,
    pub sequence: Option<ModelGroup>,
    pub choice: Option<ModelGroup>,
    pub all: Option<ModelGroup>,
    pub group: Option<Group>,
    #[serde(rename = "attribute", default)]
    pub attributes: Vec<Attribute>,
    #[serde(rename = "attributeGroup", default)]
    pub attribute_groups: Vec<AttributeGroup>,
}

/// Constraining facet such as `xs:enumeration` or `xs:maxLength`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Facet {
    #[serde(rename = "@value", default)]
    pub value: String,
    #[serde(rename = "@fixed")]
    pub fixed: Option<bool>,
}

/// `xs:restriction` of a simple type, simple content or complex content.
#[derive(Debug, Default, Deserialize)]
pub struct Restriction {
    #[serde(rename = "@base")]
    pub base: Option<String>,
    #[serde(rename = "simpleType")]
    pub simple_type: Option<Box<SimpleType>>,
    #[serde(rename = "enumeration", default)]
    pub enumerations: Vec<Facet>,
    #[serde(rename = "pattern", default)]
    pub patterns: Vec<Facet>,
    #[serde(rename = "minInclusive")]
    pub min_inclusive: Option<Facet>,
    #[serde(rename = "maxInclusive")]
    pub max_inclusive: Option<Facet>,
    #[serde(rename = "minExclusive")]
    pub min_exclusive: Option<Facet>,
    #[serde(rename = "maxExclusive")]
    pub max_exclusive: Option<Facet>,
    pub length: Option<Facet>,
    #[serde(rename = "minLength")]
    pub min_length: Option<Facet>,
    #[serde(rename = "maxLength")]
    pub max_length: Option<Facet>,
    #[serde(rename = "totalDigits")]
    pub total_digits: Option<Facet>,
    #[serde(rename = "fractionDigits")]
    pub fraction_digits: Option<Facet>,
    #[serde(rename = "whiteSpace")]
    pub white_space: Option<Facet>,
    pub sequence: Option<ModelGroup>,
    pub choice: Option<ModelGroup>,
    pub all: Option<ModelGroup>,
    pub group: Option<Group>,
    #[serde(rename = "attribute", default)]
    pub attributes: Vec<Attribute>,
    #[serde(rename = "attributeGroup", default)]
    pub attribute_groups: Vec<AttributeGroup>,
}

impl Restriction {
    /// Enumerated values in document order.
    #[must_use]
    pub fn enumeration_values(&self) -> Vec<&str> {
        self.enumerations.iter().map(|f| f.value.as_str()).collect()
    }
}

/// `xs:simpleType`, named or anonymous.
#[derive(Debug, Default, Deserialize)]
pub struct SimpleType {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@final")]
    pub r#final: Option<String>,
    pub annotation: Option<Annotation>,
    pub restriction: Option<Restriction>,
    pub list: Option<List>,
    pub union: Option<Union>,
}

impl SimpleType {
    #[must_use]
    pub fn documentation(&self) -> Option<String> {
        documentation(self.annotation.as_ref())
    }

    /// Base of the restriction, if the type is one.
    #[must_use]
    pub fn restriction_base(&self) -> Option<&str> {
        self.restriction.as_ref().and_then(|r| r.base.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct List {
    #[serde(rename = "@itemType")]
    pub item_type: Option<String>,
    #[serde(rename = "simpleType")]
    pub simple_type: Option<Box<SimpleType>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Union {
    #[serde(rename = "@memberTypes")]
    pub member_types: Option<String>,
    #[serde(rename = "simpleType", default)]
    pub simple_types: Vec<SimpleType>,
}

impl Union {
    /// Prefixed names listed in `memberTypes`.
    #[must_use]
    pub fn member_type_names(&self) -> Vec<&str> {
        self.member_types
            .as_deref()
            .map(|v| v.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// `xs:attribute`, global, local or reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@ref")]
    pub r#ref: Option<String>,
    #[serde(rename = "@type")]
    pub r#type: Option<String>,
    #[serde(rename = "@use")]
    pub r#use: Option<String>,
    #[serde(rename = "@fixed")]
    pub fixed: Option<String>,
    #[serde(rename = "@default")]
    pub default: Option<String>,
    #[serde(rename = "@form")]
    pub form: Option<String>,
    #[serde(rename = "simpleType")]
    pub simple_type: Option<AttributeSimpleType>,
}

impl Attribute {
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.r#use.as_deref() == Some("required")
    }
}

/// Inline simple type of an attribute. Only the restriction base is
/// kept since attributes carry simple values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeSimpleType {
    pub restriction: Option<AttributeRestriction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeRestriction {
    #[serde(rename = "@base")]
    pub base: Option<String>,
    #[serde(rename = "enumeration", default)]
    pub enumerations: Vec<Facet>,
}

/// `xs:attributeGroup` definition or reference.
#[derive(Debug, Default, Deserialize)]
pub struct AttributeGroup {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@ref")]
    pub r#ref: Option<String>,
    #[serde(rename = "attribute", default)]
    pub attributes: Vec<Attribute>,
    #[serde(rename = "attributeGroup", default)]
    pub attribute_groups: Vec<AttributeGroup>,
}

/// `xs:group` definition or reference.
#[derive(Debug, Default, Deserialize)]
pub struct Group {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@ref")]
    pub r#ref: Option<String>,
    #[serde(rename = "@minOccurs")]
    pub min_occurs: Option<String>,
    #[serde(rename = "@maxOccurs")]
    pub max_occurs: Option<String>,
    pub annotation: Option<Annotation>,
    pub sequence: Option<ModelGroup>,
    pub choice: Option<ModelGroup>,
    pub all: Option<ModelGroup>,
}

impl Group {
    fn collect_elements<'a>(&'a self, out: &mut Vec<&'a Element>) {
        collect_content([&self.sequence, &self.choice, &self.all], None, out);
    }
}
