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

use soapkit_http::ClientSettings;
use soapkit_http::Error as ClientError;
use soapkit_tests::stockquote::client;
use soapkit_tests::stockquote::resolve_wsdl;
use soapkit_tests::stockquote::soap11_envelope;
use soapkit_tests::stockquote::soap11_fault;
use soapkit_tests::stockquote::QuoteFault;
use soapkit_tests::stockquote::TradePrice;
use soapkit_tests::stockquote::TradePriceRequest;
use soapkit_tests::stockquote::OPERATION;
use soapkit_tests::stockquote::PORT_TYPE;
use soapkit_tests::Error;
use soapkit_tests::Expect;
use soapkit_tests::Transport;
use soapkit_wsdl::TypeIndex;
use std::sync::Arc;

use tokio::test;

fn acme() -> TradePriceRequest {
    TradePriceRequest {
        ticker_symbol: "ACME".into(),
    }
}

// Resolve the WSDL, take the SOAP action and the endpoint from it and
// perform the call.
#[test]
async fn get_last_trade_price_test() -> Result<(), Error> {
    let set = resolve_wsdl()?;
    let index = TypeIndex::build(&set);
    let action = index.soap_action_for(OPERATION, PORT_TYPE);
    assert_eq!(action, "http://example.com/GetLastTradePrice");

    let operation = &index.operations(PORT_TYPE)[0];
    let input = operation
        .input
        .as_ref()
        .ok_or(Error::ExpectedProperty("input"))?;
    assert_eq!(
        index.type_of_message_part(&input.message),
        Some("TradePriceRequest")
    );

    let transport = Arc::new(Transport::default());
    transport.expect(Expect::call_with(
        action,
        "<tickerSymbol>ACME</tickerSymbol>",
        soap11_envelope("<TradePrice><price>34.5</price></TradePrice>"),
    ));
    let client = client(&index, &transport, ClientSettings::new())?;
    assert_eq!(client.endpoint().as_str(), "http://example.com/stockquote");

    let price = client
        .call::<_, TradePrice>(action, &mut acme())
        .await?
        .ok_or(Error::ExpectedProperty("TradePrice"))?;
    assert_eq!(price.price, 34.5);
    assert!(price.timestamp.is_none());
    assert_eq!(transport.pending(), 0);
    Ok(())
}

// Date and time values keep the presence or absence of a timezone.
#[test]
async fn trade_price_timestamp_test() -> Result<(), Error> {
    let set = resolve_wsdl()?;
    let index = TypeIndex::build(&set);
    let action = index.soap_action_for(OPERATION, PORT_TYPE);
    let transport = Arc::new(Transport::default());
    let client = client(&index, &transport, ClientSettings::new())?;

    for (literal, has_timezone) in [
        ("2024-01-02T15:04:05", false),
        ("2024-01-02T15:04:05+02:00", true),
    ] {
        transport.expect(Expect::call(
            action,
            soap11_envelope(&format!(
                "<TradePrice><price>1</price><timestamp>{literal}</timestamp></TradePrice>"
            )),
        ));
        let price = client
            .call::<_, TradePrice>(action, &mut acme())
            .await?
            .ok_or(Error::ExpectedProperty("TradePrice"))?;
        let timestamp = price
            .timestamp
            .ok_or(Error::ExpectedProperty("timestamp"))?;
        assert_eq!(timestamp.has_timezone(), has_timezone);
        assert_eq!(timestamp.to_string(), literal);
    }
    Ok(())
}

// Fault declared by the operation is decoded into its detail type.
#[test]
async fn quote_fault_test() -> Result<(), Error> {
    let set = resolve_wsdl()?;
    let index = TypeIndex::build(&set);
    let operation = &index.operations(PORT_TYPE)[0];
    assert_eq!(operation.faults[0].name.as_deref(), Some("QuoteFault"));

    let action = index.soap_action_for(OPERATION, PORT_TYPE);
    let transport = Arc::new(Transport::default());
    transport.expect(Expect::status(
        action,
        500,
        soap11_fault(
            "Server was unable to process request.",
            "<Symbol>ACME</Symbol><Message>unknown symbol</Message>",
        ),
    ));
    let client = client(&index, &transport, ClientSettings::new())?;

    let err = client
        .call_with_fault_detail::<_, TradePrice, QuoteFault>(action, &mut acme())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "ACME: unknown symbol");
    let fault = err.fault().ok_or(Error::ExpectedProperty("fault"))?;
    assert_eq!(fault.code, "soap:Server");
    assert_eq!(fault.string, "Server was unable to process request.");
    let detail = fault
        .typed_detail::<QuoteFault>()
        .map_err(|err| Error::Client(err.into()))?
        .ok_or(Error::ExpectedProperty("detail"))?;
    assert_eq!(detail.symbol.as_deref(), Some("ACME"));
    Ok(())
}

// Plain call reports the fault string.
#[test]
async fn fault_without_detail_type_test() -> Result<(), Error> {
    let set = resolve_wsdl()?;
    let index = TypeIndex::build(&set);
    let action = index.soap_action_for(OPERATION, PORT_TYPE);
    let transport = Arc::new(Transport::default());
    transport.expect(Expect::status(
        action,
        500,
        soap11_fault("market closed", ""),
    ));
    let client = client(&index, &transport, ClientSettings::new())?;

    let err = client
        .call::<_, TradePrice>(action, &mut acme())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Fault(_)));
    assert_eq!(err.to_string(), "market closed");
    Ok(())
}

// Failed response that is not a fault keeps the status.
#[test]
async fn http_status_test() -> Result<(), Error> {
    let set = resolve_wsdl()?;
    let index = TypeIndex::build(&set);
    let action = index.soap_action_for(OPERATION, PORT_TYPE);
    let transport = Arc::new(Transport::default());
    transport.expect(Expect::status(action, 503, "service unavailable"));
    let client = client(&index, &transport, ClientSettings::new())?;

    let err = client
        .call::<_, TradePrice>(action, &mut acme())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::HttpStatus { status, .. } if status.as_u16() == 503
    ));
    Ok(())
}

// Request is rejected by the transport when the action does not match.
#[test]
async fn unexpected_action_test() -> Result<(), Error> {
    let set = resolve_wsdl()?;
    let index = TypeIndex::build(&set);
    let transport = Arc::new(Transport::default());
    transport.expect(Expect::call(
        "http://example.com/Other",
        soap11_envelope(""),
    ));
    let client = client(&index, &transport, ClientSettings::new())?;

    let err = client
        .call::<_, TradePrice>(index.soap_action_for(OPERATION, PORT_TYPE), &mut acme())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Transport(soapkit_mock::Error::UnexpectedCall(..))
    ));
    Ok(())
}
