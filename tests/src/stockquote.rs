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

//! Stock quote service described by the WSDL fixture of `soapkit-wsdl`.

use crate::Error;
use crate::Transport;
use serde::Deserialize;
use serde::Serialize;
use soapkit_core::BinaryFields;
use soapkit_core::FaultDetail;
use soapkit_core::XsdDateTime;
use soapkit_http::Client;
use soapkit_http::ClientSettings;
use soapkit_wsdl::ResolvedSchemaSet;
use soapkit_wsdl::Resolver;
use soapkit_wsdl::ResolverSettings;
use soapkit_wsdl::TypeIndex;
use std::path::Path;
use std::sync::Arc;
use url::Url;

pub const PORT_TYPE: &str = "StockQuotePortType";
pub const PORT: &str = "StockQuotePort";
pub const OPERATION: &str = "GetLastTradePrice";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename = "TradePriceRequest")]
pub struct TradePriceRequest {
    #[serde(rename = "tickerSymbol")]
    pub ticker_symbol: String,
}

impl BinaryFields for TradePriceRequest {}

#[derive(Debug, Deserialize)]
pub struct TradePrice {
    pub price: f32,
    #[serde(default)]
    pub timestamp: Option<XsdDateTime>,
}

impl BinaryFields for TradePrice {}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteFault {
    #[serde(rename = "Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
}

impl FaultDetail for QuoteFault {
    fn has_data(&self) -> bool {
        self.message.is_some()
    }

    fn error_string(&self) -> String {
        format!(
            "{}: {}",
            self.symbol.as_deref().unwrap_or("?"),
            self.message.as_deref().unwrap_or_default()
        )
    }
}

/// Location of the stock quote WSDL.
#[must_use]
pub fn wsdl_path() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../wsdl/tests/fixtures/stockquote/stockquote.wsdl")
        .to_string_lossy()
        .into_owned()
}

/// Resolve the stock quote WSDL with its external schemas.
///
/// # Errors
///
/// Returns an error if the fixture cannot be resolved.
pub fn resolve_wsdl() -> Result<ResolvedSchemaSet, Error> {
    Ok(Resolver::new(ResolverSettings::new())?.resolve(&wsdl_path())?)
}

/// Client bound to the address of the service port.
///
/// # Errors
///
/// Returns an error if the port has no usable address.
pub fn client(
    index: &TypeIndex<'_>,
    transport: &Arc<Transport>,
    settings: ClientSettings,
) -> Result<Client<Arc<Transport>>, Error> {
    let address = index
        .service_address_for(PORT)
        .ok_or(Error::ExpectedProperty("soap:address"))?;
    let endpoint = Url::parse(address).map_err(Error::InvalidEndpoint)?;
    Ok(Client::new(Arc::clone(transport), endpoint, settings))
}

pub fn soap11_envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>{body}</soap:Body></soap:Envelope>"#
    )
}

pub fn soap11_fault(faultstring: &str, detail: &str) -> String {
    soap11_envelope(&format!(
        "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>{faultstring}</faultstring><detail>{detail}</detail></soap:Fault>"
    ))
}
