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

//! SOAP envelope encoding and body decoding.
//!
//! Only document/literal wrapped messages are supported: the body holds
//! at most one element, which is either the operation payload or a fault.
//!
//! ```rust
//! use serde::Deserialize;
//! use soapkit_core::decode_body;
//! use soapkit_core::Body;
//!
//! #[derive(Deserialize)]
//! struct PingResponse {
//!     #[serde(rename = "Message")]
//!     message: String,
//! }
//!
//! let xml = br#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
//!   <soap:Body><PingResponse><Message>pong</Message></PingResponse></soap:Body>
//! </soap:Envelope>"#;
//! match decode_body::<PingResponse>(xml).unwrap() {
//!     Body::Content(r) => assert_eq!(r.message, "pong"),
//!     _ => unreachable!(),
//! }
//! ```

use crate::Error;
use crate::SoapFault;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::Namespace;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use quick_xml::Writer;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::TryFrom;

/// Namespace of SOAP 1.1 envelopes.
pub const SOAP11_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// Namespace of SOAP 1.2 envelopes.
pub const SOAP12_NAMESPACE: &str = "http://www.w3.org/2003/05/soap-envelope";

/// SOAP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoapVersion {
    Soap11,
    Soap12,
}

impl Default for SoapVersion {
    fn default() -> Self {
        Self::Soap11
    }
}

impl SoapVersion {
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Soap11 => SOAP11_NAMESPACE,
            Self::Soap12 => SOAP12_NAMESPACE,
        }
    }

    /// Media type of a plain (non-multipart) request.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Soap11 => "text/xml",
            Self::Soap12 => "application/soap+xml",
        }
    }

    /// `Content-Type` of a plain request. SOAP 1.2 carries the action as
    /// a media type parameter.
    #[must_use]
    pub fn content_type(self, action: &str) -> String {
        match self {
            Self::Soap11 => "text/xml; charset=\"utf-8\"".into(),
            Self::Soap12 if action.is_empty() => "application/soap+xml; charset=\"utf-8\"".into(),
            Self::Soap12 => format!("application/soap+xml; charset=\"utf-8\"; action=\"{action}\""),
        }
    }
}

/// Serialize a value as an XML fragment. The root element is named after
/// the type (or its `serde(rename)`).
///
/// # Errors
///
/// Returns an error if the value cannot be represented as XML.
pub fn to_fragment<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    Ok(quick_xml::se::to_string(value)?)
}

/// Outgoing SOAP envelope.
#[derive(Debug, Clone)]
pub struct Envelope {
    version: SoapVersion,
    headers: Vec<String>,
    body: String,
}

impl Envelope {
    /// Envelope with `content` as the only body element.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` cannot be serialized.
    pub fn new<T: Serialize + ?Sized>(version: SoapVersion, content: &T) -> Result<Self, Error> {
        Ok(Self {
            version,
            headers: Vec::new(),
            body: to_fragment(content)?,
        })
    }

    /// Envelope with an empty body.
    #[must_use]
    pub const fn empty(version: SoapVersion) -> Self {
        Self {
            version,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Add a header element serialized from `header`.
    ///
    /// # Errors
    ///
    /// Returns an error if `header` cannot be serialized.
    pub fn add_header<H: Serialize + ?Sized>(&mut self, header: &H) -> Result<(), Error> {
        self.headers.push(to_fragment(header)?);
        Ok(())
    }

    /// Add already serialized header elements.
    pub fn extend_headers<I: IntoIterator<Item = String>>(&mut self, headers: I) {
        self.headers.extend(headers);
    }

    #[must_use]
    pub const fn version(&self) -> SoapVersion {
        self.version
    }

    /// Encode the envelope. The `Header` element is written only when
    /// at least one header is present.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut writer = Writer::new(Vec::new());
        let mut envelope = BytesStart::new("soap:Envelope");
        envelope.push_attribute(("xmlns:soap", self.version.namespace()));
        writer.write_event(Event::Start(envelope))?;
        if !self.headers.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("soap:Header")))?;
            for header in &self.headers {
                writer.get_mut().extend_from_slice(header.as_bytes());
            }
            writer.write_event(Event::End(BytesEnd::new("soap:Header")))?;
        }
        writer.write_event(Event::Start(BytesStart::new("soap:Body")))?;
        writer.get_mut().extend_from_slice(self.body.as_bytes());
        writer.write_event(Event::End(BytesEnd::new("soap:Body")))?;
        writer.write_event(Event::End(BytesEnd::new("soap:Envelope")))?;
        Ok(writer.into_inner())
    }
}

/// Decoded SOAP body.
#[derive(Debug)]
pub enum Body<T> {
    /// Operation payload.
    Content(T),
    /// Service fault.
    Fault(SoapFault),
    /// No body element (or no input at all).
    Empty,
}

fn is_envelope_namespace(ns: &ResolveResult<'_>) -> bool {
    matches!(
        ns,
        ResolveResult::Bound(Namespace(n))
            if *n == SOAP11_NAMESPACE.as_bytes() || *n == SOAP12_NAMESPACE.as_bytes()
    )
}

fn position(reader: &NsReader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

struct BodyChild {
    name: String,
    is_fault: bool,
    start: usize,
    end: usize,
}

/// Decode the body of a SOAP envelope.
///
/// The first body element decides: a `Fault` in the envelope namespace is
/// parsed as [`SoapFault`], anything else is deserialized into `T`.
///
/// # Errors
///
/// Returns [`Error::MultipleBodyElements`] if the body contains more than
/// one element, or an XML error if the document is malformed or the
/// element does not match `T`.
pub fn decode_body<T: DeserializeOwned>(data: &[u8]) -> Result<Body<T>, Error> {
    let mut reader = NsReader::from_reader(data);
    reader.config_mut().trim_text(false);
    let mut in_body = false;
    let mut child: Option<BodyChild> = None;
    loop {
        let start = position(&reader);
        let (ns, event) = reader.read_resolved_event()?;
        let in_envelope_ns = is_envelope_namespace(&ns);
        match event {
            Event::Start(e) => {
                let local = e.local_name();
                if !in_body {
                    if in_envelope_ns && local.as_ref() == b"Body" {
                        in_body = true;
                    } else if in_envelope_ns && local.as_ref() == b"Header" {
                        reader.read_to_end(e.name())?;
                    }
                    continue;
                }
                if child.is_some() {
                    return Err(Error::MultipleBodyElements);
                }
                let name = String::from_utf8_lossy(local.as_ref()).into_owned();
                let is_fault = in_envelope_ns && local.as_ref() == b"Fault";
                reader.read_to_end(e.name())?;
                child = Some(BodyChild {
                    name,
                    is_fault,
                    start,
                    end: position(&reader),
                });
            }
            Event::Empty(e) if in_body => {
                if child.is_some() {
                    return Err(Error::MultipleBodyElements);
                }
                let local = e.local_name();
                child = Some(BodyChild {
                    name: String::from_utf8_lossy(local.as_ref()).into_owned(),
                    is_fault: in_envelope_ns && local.as_ref() == b"Fault",
                    start,
                    end: position(&reader),
                });
            }
            Event::End(_) if in_body => break,
            Event::Eof => break,
            _ => {}
        }
    }

    let Some(child) = child else {
        return Ok(Body::Empty);
    };
    let raw = &data[child.start..child.end];
    if child.is_fault {
        return Ok(Body::Fault(SoapFault::parse(raw)?));
    }
    quick_xml::de::from_reader(raw)
        .map(Body::Content)
        .map_err(|err| Error::XmlDeserialize(child.name, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize)]
    #[serde(rename = "tns:GetLastTradePrice")]
    struct GetLastTradePrice {
        #[serde(rename = "@xmlns:tns")]
        xmlns: &'static str,
        #[serde(rename = "tickerSymbol")]
        ticker_symbol: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct TradePrice {
        #[serde(rename = "price")]
        price: f32,
    }

    #[derive(Debug, Serialize)]
    struct SessionHeader {
        #[serde(rename = "Token")]
        token: String,
    }

    fn envelope(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
    <soap:Header><Session>abc</Session></soap:Header>
    <soap:Body>
        {body}
    </soap:Body>
</soap:Envelope>"#
        )
    }

    #[test]
    fn encode_soap11_with_header() {
        let mut env = Envelope::new(
            SoapVersion::Soap11,
            &GetLastTradePrice {
                xmlns: "http://example.com/stockquote.xsd",
                ticker_symbol: "ACME".into(),
            },
        )
        .unwrap();
        env.add_header(&SessionHeader {
            token: "t".into(),
        })
        .unwrap();
        let xml = String::from_utf8(env.encode().unwrap()).unwrap();
        assert_eq!(
            xml,
            "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
             <soap:Header><SessionHeader><Token>t</Token></SessionHeader></soap:Header>\
             <soap:Body><tns:GetLastTradePrice xmlns:tns=\"http://example.com/stockquote.xsd\">\
             <tickerSymbol>ACME</tickerSymbol></tns:GetLastTradePrice></soap:Body></soap:Envelope>"
        );
    }

    #[test]
    fn encode_soap12_without_header() {
        let xml = String::from_utf8(Envelope::empty(SoapVersion::Soap12).encode().unwrap()).unwrap();
        assert_eq!(
            xml,
            "<soap:Envelope xmlns:soap=\"http://www.w3.org/2003/05/soap-envelope\">\
             <soap:Body></soap:Body></soap:Envelope>"
        );
    }

    #[test]
    fn content_types() {
        assert_eq!(
            SoapVersion::Soap11.content_type("urn:a"),
            "text/xml; charset=\"utf-8\""
        );
        assert_eq!(
            SoapVersion::Soap12.content_type("urn:a"),
            "application/soap+xml; charset=\"utf-8\"; action=\"urn:a\""
        );
    }

    #[test]
    fn decode_content() {
        let xml = envelope(
            r#"<m:TradePrice xmlns:m="http://example.com/stockquote.xsd"><price>34.5</price></m:TradePrice>"#,
        );
        match decode_body::<TradePrice>(xml.as_bytes()).unwrap() {
            Body::Content(v) => assert_eq!(v, TradePrice { price: 34.5 }),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn decode_fault() {
        let xml = envelope(
            "<soap:Fault><faultcode>soap:Server</faultcode>\
             <faultstring>Custom error message.</faultstring></soap:Fault>",
        );
        match decode_body::<TradePrice>(xml.as_bytes()).unwrap() {
            Body::Fault(fault) => {
                assert_eq!(fault.code, "soap:Server");
                assert_eq!(fault.to_string(), "Custom error message.");
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn fault_outside_envelope_namespace_is_content() {
        #[derive(Debug, Deserialize)]
        struct Fault {
            #[serde(rename = "Reason")]
            reason: String,
        }
        let xml = envelope(r#"<Fault xmlns="urn:app"><Reason>r</Reason></Fault>"#);
        assert!(matches!(
            decode_body::<Fault>(xml.as_bytes()).unwrap(),
            Body::Content(Fault { .. })
        ));
    }

    #[test]
    fn decode_soap12_fault() {
        let xml = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
            <env:Body><env:Fault>
                <env:Code><env:Value>env:Receiver</env:Value></env:Code>
                <env:Reason><env:Text xml:lang="en">boom</env:Text></env:Reason>
            </env:Fault></env:Body></env:Envelope>"#;
        match decode_body::<TradePrice>(xml.as_bytes()).unwrap() {
            Body::Fault(fault) => assert_eq!(fault.to_string(), "boom"),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn multiple_body_elements() {
        let xml = envelope("<TradePrice><price>1</price></TradePrice><Other/>");
        assert!(matches!(
            decode_body::<TradePrice>(xml.as_bytes()),
            Err(Error::MultipleBodyElements)
        ));
        assert_eq!(
            Error::MultipleBodyElements.to_string(),
            "Found multiple elements inside SOAP body; not wrapped-document/literal WS-I compliant"
        );
    }

    #[test]
    fn empty_input_and_empty_body() {
        assert!(matches!(decode_body::<TradePrice>(b"").unwrap(), Body::Empty));
        let xml = envelope("");
        assert!(matches!(
            decode_body::<TradePrice>(xml.as_bytes()).unwrap(),
            Body::Empty
        ));
        let self_closed =
            br#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body/></soap:Envelope>"#;
        assert!(matches!(
            decode_body::<TradePrice>(self_closed).unwrap(),
            Body::Empty
        ));
    }

    #[test]
    fn mismatched_content_is_an_error() {
        let xml = envelope("<TradePrice><price>not a number</price></TradePrice>");
        assert!(matches!(
            decode_body::<TradePrice>(xml.as_bytes()),
            Err(Error::XmlDeserialize(name, _)) if name == "TradePrice"
        ));
    }
}
