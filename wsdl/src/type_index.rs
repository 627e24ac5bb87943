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

use crate::strip_prefix;
use crate::wsdl::Message;
use crate::wsdl::Operation;
use crate::xsd::Attribute;
use crate::xsd::AttributeGroup;
use crate::xsd::ComplexType;
use crate::xsd::Element;
use crate::xsd::Group;
use crate::xsd::Schema;
use crate::xsd::SimpleType;
use crate::xsd::XSD_NAMESPACE;
use crate::Error;
use crate::QualifiedName;
use crate::ResolvedSchemaSet;
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use tracing::warn;

/// Named type definition.
#[derive(Debug, Clone, Copy)]
pub enum TypeDefinition<'a> {
    Complex(&'a ComplexType),
    Simple(&'a SimpleType),
}

/// Resolved base of a derived type.
#[derive(Debug, Clone, Copy)]
pub enum BaseType<'a> {
    /// Built-in XML Schema type such as `string` or `anyType`.
    Builtin(&'a str),
    Defined(QualifiedName<'a>, TypeDefinition<'a>),
}

/// Components of a schema together with the schema declaring them.
type Components<'a, T> = HashMap<QualifiedName<'a>, (&'a Schema, &'a T)>;

/// Index over all schemas of a [`ResolvedSchemaSet`].
pub struct TypeIndex<'a> {
    set: &'a ResolvedSchemaSet,
    elements: Components<'a, Element>,
    complex_types: Components<'a, ComplexType>,
    simple_types: Components<'a, SimpleType>,
    attributes: Components<'a, Attribute>,
    attribute_groups: Components<'a, AttributeGroup>,
    groups: Components<'a, Group>,
    /// Distinct element names by unprefixed type name.
    element_names_by_type: OnceCell<HashMap<&'a str, Vec<&'a str>>>,
}

fn components<'a, T, I, N>(set: &'a ResolvedSchemaSet, items: I, name: N) -> Components<'a, T>
where
    I: Fn(&'a Schema) -> &'a [T],
    N: Fn(&'a T) -> Option<&'a str>,
{
    set.schemas().iter().fold(HashMap::new(), |mut map, schema| {
        for item in items(schema) {
            if let Some(local) = name(item) {
                map.entry(QualifiedName::new(&schema.target_namespace, local))
                    .or_insert((schema, item));
            }
        }
        map
    })
}

impl<'a> TypeIndex<'a> {
    /// Build an index over `set`.
    #[must_use]
    pub fn build(set: &'a ResolvedSchemaSet) -> Self {
        Self {
            set,
            elements: components(set, |s| s.elements.as_slice(), |v| v.name.as_deref()),
            complex_types: components(
                set,
                |s| s.complex_types.as_slice(),
                |v| v.name.as_deref(),
            ),
            simple_types: components(set, |s| s.simple_types.as_slice(), |v| v.name.as_deref()),
            attributes: components(set, |s| s.attributes.as_slice(), |v| v.name.as_deref()),
            attribute_groups: components(
                set,
                |s| s.attribute_groups.as_slice(),
                |v| v.name.as_deref(),
            ),
            groups: components(set, |s| s.groups.as_slice(), |v| v.name.as_deref()),
            element_names_by_type: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn schema_set(&self) -> &'a ResolvedSchemaSet {
        self.set
    }

    #[must_use]
    pub fn find_element(&self, qname: QualifiedName<'_>) -> Option<&'a Element> {
        self.elements.get(&qname).map(|(_, v)| *v)
    }

    #[must_use]
    pub fn find_complex_type(&self, qname: QualifiedName<'_>) -> Option<&'a ComplexType> {
        self.complex_types.get(&qname).map(|(_, v)| *v)
    }

    #[must_use]
    pub fn find_simple_type(&self, qname: QualifiedName<'_>) -> Option<&'a SimpleType> {
        self.simple_types.get(&qname).map(|(_, v)| *v)
    }

    #[must_use]
    pub fn find_attribute(&self, qname: QualifiedName<'_>) -> Option<&'a Attribute> {
        self.attributes.get(&qname).map(|(_, v)| *v)
    }

    #[must_use]
    pub fn find_attribute_group(&self, qname: QualifiedName<'_>) -> Option<&'a AttributeGroup> {
        self.attribute_groups.get(&qname).map(|(_, v)| *v)
    }

    #[must_use]
    pub fn find_group(&self, qname: QualifiedName<'_>) -> Option<&'a Group> {
        self.groups.get(&qname).map(|(_, v)| *v)
    }

    /// Find a complex or simple type by its qualified name.
    #[must_use]
    pub fn find_type(&self, qname: QualifiedName<'_>) -> Option<TypeDefinition<'a>> {
        self.find_complex_type(qname)
            .map(TypeDefinition::Complex)
            .or_else(|| self.find_simple_type(qname).map(TypeDefinition::Simple))
    }

    /// Schema declaring the named complex type.
    #[must_use]
    pub fn complex_type_schema(&self, qname: QualifiedName<'_>) -> Option<&'a Schema> {
        self.complex_types.get(&qname).map(|(s, _)| *s)
    }

    /// Resolve a prefixed name used inside `schema`.
    #[must_use]
    pub fn resolve_qname(&self, schema: &'a Schema, qname: &'a str) -> Option<QualifiedName<'a>> {
        QualifiedName::resolve(qname, &schema.namespaces)
    }

    /// Resolve the base of a complex type declared in `schema`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base names a type no loaded schema defines.
    pub fn base_type(
        &self,
        schema: &'a Schema,
        complex_type: &'a ComplexType,
    ) -> Result<Option<BaseType<'a>>, Error> {
        let base = match complex_type.derivation().and_then(|d| d.base()) {
            Some(base) => base,
            None => return Ok(None),
        };
        let unresolved = || Error::UnresolvedBase {
            base: base.to_owned(),
            referrer: complex_type
                .name
                .clone()
                .unwrap_or_else(|| "anonymous complex type".into()),
        };
        let qname = self.resolve_qname(schema, base).ok_or_else(unresolved)?;
        if qname.namespace == XSD_NAMESPACE {
            return Ok(Some(BaseType::Builtin(qname.name)));
        }
        self.find_type(qname)
            .map(|t| Some(BaseType::Defined(qname, t)))
            .ok_or_else(unresolved)
    }

    /// Resolve an attribute declared in `schema`. A reference copies the
    /// name and type of the global attribute, and its fixed value unless
    /// one is set locally. An attribute with an inline simple type takes
    /// the restriction base as its type.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference names no global attribute.
    pub fn resolve_attribute(
        &self,
        schema: &'a Schema,
        attribute: &'a Attribute,
    ) -> Result<Attribute, Error> {
        let mut resolved = attribute.clone();
        if let Some(reference) = attribute.r#ref.as_deref() {
            let global = self
                .resolve_qname(schema, reference)
                .and_then(|qname| self.attributes.get(&qname))
                .filter(|(_, global)| global.r#ref.is_none())
                .ok_or_else(|| Error::UnresolvedAttribute(reference.to_owned()))?;
            let (global_schema, global) = *global;
            let global = self.resolve_attribute(global_schema, global)?;
            resolved.name = global.name;
            resolved.r#type = global.r#type;
            if resolved.fixed.is_none() {
                resolved.fixed = global.fixed;
            }
        } else if resolved.r#type.is_none() {
            resolved.r#type = attribute
                .simple_type
                .as_ref()
                .and_then(|st| st.restriction.as_ref())
                .and_then(|r| r.base.clone());
        }
        Ok(resolved)
    }

    /// Find a message of the WSDL definitions by (possibly prefixed) name.
    #[must_use]
    pub fn message(&self, name: &str) -> Option<&'a Message> {
        self.set.definitions()?.message(strip_prefix(name))
    }

    /// Operations of the named port type.
    #[must_use]
    pub fn operations(&self, port_type: &str) -> &'a [Operation] {
        self.set
            .definitions()
            .and_then(|d| d.port_type(strip_prefix(port_type)))
            .map(|p| p.operations.as_slice())
            .unwrap_or_default()
    }

    /// Prefix allocated to `namespace` during resolution.
    #[must_use]
    pub fn namespace_prefix(&self, namespace: &str) -> Option<&'a str> {
        self.set.prefixes().get(namespace)
    }

    /// Body type of a document/literal message: the unprefixed type of
    /// its first part, or else the type of the global element the part
    /// references (matched case-insensitively), or that element's own
    /// name when it has an inline type.
    ///
    /// Messages without parts have no body type.
    #[must_use]
    pub fn type_of_message_part(&self, message: &str) -> Option<&'a str> {
        let definitions = self.set.definitions()?;
        let message = strip_prefix(message);
        for msg in definitions.messages.iter().filter(|m| m.name == message) {
            let part = match msg.parts.first() {
                Some(part) => part,
                None => {
                    warn!(message = %msg.name, "message doesn't have any parts, ignoring message");
                    continue;
                }
            };
            if let Some(r#type) = part.r#type.as_deref().filter(|t| !t.is_empty()) {
                return Some(strip_prefix(r#type));
            }
            let element_ref = strip_prefix(part.element.as_deref().unwrap_or_default());
            let found = self
                .set
                .schemas()
                .iter()
                .flat_map(|s| s.elements.iter())
                .find(|e| {
                    e.name
                        .as_deref()
                        .map_or(false, |name| name.eq_ignore_ascii_case(element_ref))
                });
            if let Some(element) = found {
                return element
                    .r#type
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .map(strip_prefix)
                    .or_else(|| element.name.as_deref());
            }
        }
        None
    }

    /// `soapAction` of `operation` in the bindings of `port_type`; empty
    /// when no binding declares one.
    #[must_use]
    pub fn soap_action_for(&self, operation: &str, port_type: &str) -> &'a str {
        let port_type = strip_prefix(port_type);
        self.set
            .definitions()
            .into_iter()
            .flat_map(|d| d.bindings.iter())
            .filter(|b| strip_prefix(&b.r#type) == port_type)
            .flat_map(|b| b.operations.iter())
            .find(|op| op.name == operation)
            .map(|op| op.soap_action())
            .unwrap_or_default()
    }

    /// `soap:address` location of the named port.
    #[must_use]
    pub fn service_address_for(&self, port: &str) -> Option<&'a str> {
        self.set
            .definitions()?
            .ports()
            .find(|p| p.name == port)
            .and_then(|p| p.address.as_ref())
            .map(|a| a.location.as_str())
    }

    /// Name of the only element using `type_name`. When no element or
    /// elements of different names use the type, the unprefixed type
    /// name is returned.
    #[must_use]
    pub fn canonical_element_name_for_type<'b>(&'b self, type_name: &'b str) -> &'b str
    where
        'a: 'b,
    {
        let type_name = strip_prefix(type_name);
        match self.element_names_by_type().get(type_name) {
            Some(names) if names.len() == 1 => names[0],
            _ => type_name,
        }
    }

    fn element_names_by_type(&self) -> &HashMap<&'a str, Vec<&'a str>> {
        self.element_names_by_type.get_or_init(|| {
            let mut elements = Vec::new();
            for schema in self.set.schemas() {
                for element in &schema.elements {
                    elements.push(element);
                    element.collect_nested(&mut elements);
                }
                for complex_type in &schema.complex_types {
                    complex_type.collect_elements(&mut elements);
                }
            }
            elements
                .into_iter()
                .filter_map(|e| Some((strip_prefix(e.r#type.as_deref()?), e.name.as_deref()?)))
                .fold(HashMap::new(), |mut map, (type_name, name)| {
                    let names: &mut Vec<&str> = map.entry(type_name).or_default();
                    if !names.contains(&name) {
                        names.push(name);
                    }
                    map
                })
        })
    }
}
