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

//! WSDL 1.1 document model.
//!
//! SOAP 1.1 and SOAP 1.2 binding extensions share local names
//! (`binding`, `operation`, `body`, `address`) and are read the same
//! way. Other extension elements are ignored.

use crate::namespaces::Namespaces;
use crate::xsd::Documentation;
use crate::xsd::Schema;
use crate::Location;
use serde::Deserialize;

/// Namespace of WSDL 1.1 documents.
pub const WSDL_NAMESPACE: &str = "http://schemas.xmlsoap.org/wsdl/";

/// `wsdl:definitions` document.
#[derive(Debug, Default, Deserialize)]
pub struct Definitions {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@targetNamespace", default)]
    pub target_namespace: String,
    #[serde(rename = "import", default)]
    pub imports: Vec<WsdlImport>,
    pub documentation: Option<Documentation>,
    pub types: Option<Types>,
    #[serde(rename = "message", default)]
    pub messages: Vec<Message>,
    #[serde(rename = "portType", default)]
    pub port_types: Vec<PortType>,
    #[serde(rename = "binding", default)]
    pub bindings: Vec<Binding>,
    #[serde(rename = "service", default)]
    pub services: Vec<Service>,
    /// Prefix to namespace bindings of the definitions element.
    #[serde(skip)]
    pub namespaces: Namespaces,
    #[serde(skip)]
    pub location: Option<Location>,
}

impl Definitions {
    /// Schemas embedded in `types`.
    #[must_use]
    pub fn schemas(&self) -> &[Schema] {
        self.types
            .as_ref()
            .map(|t| t.schemas.as_slice())
            .unwrap_or_default()
    }

    /// Take the embedded schemas out of the document.
    pub fn take_schemas(&mut self) -> Vec<Schema> {
        self.types
            .as_mut()
            .map(|t| std::mem::take(&mut t.schemas))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn port_type(&self, name: &str) -> Option<&PortType> {
        self.port_types.iter().find(|p| p.name == name)
    }

    /// All ports of all services.
    pub fn ports(&self) -> impl Iterator<Item = &Port> + '_ {
        self.services.iter().flat_map(|s| s.ports.iter())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WsdlImport {
    #[serde(rename = "@namespace")]
    pub namespace: Option<String>,
    #[serde(rename = "@location")]
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Types {
    #[serde(rename = "schema", default)]
    pub schemas: Vec<Schema>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(rename = "@name")]
    pub name: String,
    pub documentation: Option<Documentation>,
    #[serde(rename = "part", default)]
    pub parts: Vec<Part>,
}

/// Message part referencing either an element or a type.
#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@element")]
    pub element: Option<String>,
    #[serde(rename = "@type")]
    pub r#type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PortType {
    #[serde(rename = "@name")]
    pub name: String,
    pub documentation: Option<Documentation>,
    #[serde(rename = "operation", default)]
    pub operations: Vec<Operation>,
}

/// Abstract operation of a port type.
#[derive(Debug, Deserialize)]
pub struct Operation {
    #[serde(rename = "@name")]
    pub name: String,
    pub documentation: Option<Documentation>,
    pub input: Option<OperationMessage>,
    pub output: Option<OperationMessage>,
    #[serde(rename = "fault", default)]
    pub faults: Vec<OperationMessage>,
}

#[derive(Debug, Deserialize)]
pub struct OperationMessage {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@message", default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Binding {
    #[serde(rename = "@name")]
    pub name: String,
    /// Prefixed name of the bound port type.
    #[serde(rename = "@type")]
    pub r#type: String,
    #[serde(rename = "binding")]
    pub soap_binding: Option<SoapBinding>,
    #[serde(rename = "operation", default)]
    pub operations: Vec<BindingOperation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoapBinding {
    #[serde(rename = "@style")]
    pub style: Option<String>,
    #[serde(rename = "@transport")]
    pub transport: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BindingOperation {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "operation")]
    pub soap_operation: Option<SoapOperation>,
    pub input: Option<BindingMessage>,
    pub output: Option<BindingMessage>,
    #[serde(rename = "fault", default)]
    pub faults: Vec<BindingFault>,
}

impl BindingOperation {
    /// `soapAction` of the operation; empty when not declared.
    #[must_use]
    pub fn soap_action(&self) -> &str {
        self.soap_operation
            .as_ref()
            .and_then(|op| op.soap_action.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoapOperation {
    #[serde(rename = "@soapAction")]
    pub soap_action: Option<String>,
    #[serde(rename = "@style")]
    pub style: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BindingMessage {
    pub body: Option<SoapBody>,
    #[serde(rename = "header", default)]
    pub headers: Vec<SoapHeader>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoapBody {
    #[serde(rename = "@use")]
    pub r#use: Option<String>,
    #[serde(rename = "@parts")]
    pub parts: Option<String>,
    #[serde(rename = "@namespace")]
    pub namespace: Option<String>,
    #[serde(rename = "@encodingStyle")]
    pub encoding_style: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoapHeader {
    #[serde(rename = "@message")]
    pub message: String,
    #[serde(rename = "@part")]
    pub part: String,
    #[serde(rename = "@use")]
    pub r#use: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BindingFault {
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "fault")]
    pub soap_fault: Option<SoapBody>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
    #[serde(rename = "@name")]
    pub name: String,
    pub documentation: Option<Documentation>,
    #[serde(rename = "port", default)]
    pub ports: Vec<Port>,
}

#[derive(Debug, Deserialize)]
pub struct Port {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@binding")]
    pub binding: String,
    pub address: Option<SoapAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoapAddress {
    #[serde(rename = "@location")]
    pub location: String,
}
