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

mod common;

#[cfg(feature = "hyper")]
mod client_tests {
    use soapkit_core::Attachment;
    use soapkit_core::Binary;
    use soapkit_core::SoapVersion;
    use soapkit_core::WssSecurityHeader;
    use soapkit_http::hyper::ClientParams;
    use soapkit_http::ClientSettings;
    use soapkit_http::Error;
    use soapkit_http::Mode;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_string_contains, header, header_exists, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::common::test_utils::*;

    fn trade_price_request() -> TradePriceRequest {
        TradePriceRequest {
            ticker_symbol: "ACME".to_string(),
        }
    }

    #[tokio::test]
    async fn test_plain_call_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .and(header("soapaction", TRADE_PRICE_ACTION))
            .and(header("content-type", r#"text/xml; charset="utf-8""#))
            .and(header("authorization", BASIC_AUTH))
            .and(body_string_contains("<tickerSymbol>ACME</tickerSymbol>"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/xml; charset=utf-8")
                    .set_body_string(soap11_envelope(
                        "<TradePrice><price>34.5</price></TradePrice>",
                    )),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let settings = ClientSettings::new().credentials(create_test_credentials());
        let client = create_test_client(&mock_server, settings);
        let mut request = trade_price_request();
        let result = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap();

        assert_eq!(result, Some(TradePrice { price: 34.5 }));
    }

    #[tokio::test]
    async fn test_empty_body_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let result = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_soap12_content_type_carries_action() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .and(header(
                "content-type",
                r#"application/soap+xml; charset="utf-8"; action="http://example.com/GetLastTradePrice""#,
            ))
            .and(header("soapaction", TRADE_PRICE_ACTION))
            .and(body_string_contains("http://www.w3.org/2003/05/soap-envelope"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let settings = ClientSettings::new().version(SoapVersion::Soap12);
        let client = create_test_client(&mock_server, settings);
        let mut request = trade_price_request();
        let result = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_empty_action_still_sends_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .and(header("soapaction", ""))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let result = client.call::<_, TradePrice>("", &mut request).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_custom_headers_override_defaults() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .and(header("user-agent", "inventory-sync/2.1"))
            .and(header("soapaction", "urn:override"))
            .and(header("x-request-id", "42"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let settings = ClientSettings::new()
            .user_agent("soapkit-test")
            .http_headers(headers(&[
                ("user-agent", "inventory-sync/2.1"),
                ("soapaction", "urn:override"),
                ("x-request-id", "42"),
            ]));
        let client = create_test_client(&mock_server, settings);
        let mut request = trade_price_request();
        let result = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_security_header_is_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .and(body_string_contains("<soap:Header><wsse:Security"))
            .and(body_string_contains("<wsse:Username>operator</wsse:Username>"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut client = create_test_client(&mock_server, ClientSettings::default());
        client
            .add_header(&WssSecurityHeader::new("operator", "s3cret", "", "1"))
            .unwrap();
        let mut request = trade_price_request();
        let result = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fault_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(
                ResponseTemplate::new(500)
                    .insert_header("content-type", "text/xml")
                    .set_body_string(soap11_fault("Unknown ticker", "")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let err = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap_err();

        let fault = err.fault().expect("fault expected");
        assert_eq!(fault.code, "soap:Server");
        assert_eq!(fault.string, "Unknown ticker");
        assert_eq!(err.to_string(), "Unknown ticker");
    }

    #[tokio::test]
    async fn test_fault_with_typed_detail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(
                ResponseTemplate::new(500)
                    .insert_header("content-type", "text/xml")
                    .set_body_string(soap11_fault(
                        "Custom error message.",
                        "<Reason>market closed</Reason><Code>7</Code>",
                    )),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let err = client
            .call_with_fault_detail::<_, TradePrice, QuoteFault>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "7: market closed");
        let detail = err
            .fault()
            .and_then(|f| f.typed_detail::<QuoteFault>().unwrap())
            .expect("typed detail expected");
        assert_eq!(detail.code, 7);
    }

    #[tokio::test]
    async fn test_fault_with_empty_typed_detail_keeps_faultstring() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(
                ResponseTemplate::new(500)
                    .insert_header("content-type", "text/xml")
                    .set_body_string(soap11_fault("Custom error message.", "")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let err = client
            .call_with_fault_detail::<_, TradePrice, QuoteFault>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fault(_)));
        assert_eq!(err.to_string(), "Custom error message.");
    }

    #[tokio::test]
    async fn test_http_status_without_fault() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let err = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap_err();

        match &err {
            Error::HttpStatus { status, body } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "HTTP Status 500: internal error");
    }

    #[tokio::test]
    async fn test_multiple_body_elements_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/xml")
                    .set_body_string(soap11_envelope(
                        "<TradePrice><price>1</price></TradePrice><TradePrice><price>2</price></TradePrice>",
                    )),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let err = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Soap(soapkit_core::Error::MultipleBodyElements)
        ));
    }

    #[tokio::test]
    async fn test_mtom_binaries_bound_by_package_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .and(header_exists("content-type"))
            .respond_with(ReversedMultipartEcho)
            .expect(1)
            .mount(&mock_server)
            .await;

        let settings = ClientSettings::new().mode(Mode::Mtom);
        let client = create_test_client(&mock_server, settings);
        let mut request = Upload {
            name: "firmware".to_string(),
            first: Binary::new(b"first payload".to_vec()).with_content_type("image/png"),
            second: Binary::new(vec![0u8, 1, 2, 3, 254, 255]),
        };
        let response = client
            .call::<_, Upload>("urn:upload", &mut request)
            .await
            .unwrap()
            .expect("response expected");

        assert_eq!(response.name, "firmware");
        assert_eq!(response.first.bytes(), b"first payload");
        assert_eq!(response.first.content_type(), "image/png");
        assert_eq!(response.second.bytes(), &[0u8, 1, 2, 3, 254, 255][..]);
        assert_eq!(response.first.package_id(), request.first.package_id());
    }

    #[tokio::test]
    async fn test_attachments_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(Echo)
            .expect(1)
            .mount(&mock_server)
            .await;

        let settings = ClientSettings::new().mode(Mode::MimeAttachments);
        let client = create_test_client(&mock_server, settings);
        let mut request = trade_price_request();
        let attachments = vec![
            Attachment::new("report.csv", b"a,b\n1,2\n".to_vec()),
            Attachment::new("logo.bin", vec![9u8, 8, 7]),
        ];
        let response = client
            .call_with_attachments::<_, TradePriceRequest>("urn:attach", &mut request, &attachments)
            .await
            .unwrap();

        assert_eq!(response.content, Some(trade_price_request()));
        assert_eq!(response.attachments, attachments);
    }

    #[tokio::test]
    async fn test_attachments_need_mime_mode() {
        let mock_server = MockServer::start().await;
        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let err = client
            .call_with_attachments::<_, TradePrice>("urn:attach", &mut request, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::AttachmentsNotEnabled));
    }

    #[tokio::test]
    async fn test_request_timeout_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let params = ClientParams::new().request_timeout(Duration::from_millis(200));
        let client = create_test_client_with_params(&mock_server, ClientSettings::default(), params);
        let mut request = trade_price_request();
        let err = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap_err();

        match err {
            Error::Transport(e) => assert!(e.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_temporary_redirect_reposts_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(ResponseTemplate::new(307).insert_header("location", "/moved"))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/moved"))
            .and(header("soapaction", TRADE_PRICE_ACTION))
            .and(body_string_contains("<tickerSymbol>ACME</tickerSymbol>"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/xml; charset=utf-8")
                    .set_body_string(soap11_envelope(
                        "<TradePrice><price>12.5</price></TradePrice>",
                    )),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server, ClientSettings::default());
        let mut request = trade_price_request();
        let response: Option<TradePrice> = client
            .call(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap();

        assert_eq!(response, Some(TradePrice { price: 12.5 }));
    }

    #[tokio::test]
    async fn test_redirect_limit_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SERVICE_PATH))
            .respond_with(ResponseTemplate::new(308).insert_header("location", SERVICE_PATH))
            .mount(&mock_server)
            .await;

        let params = ClientParams::new().max_redirects(2);
        let client = create_test_client_with_params(&mock_server, ClientSettings::default(), params);
        let mut request = trade_price_request();
        let err = client
            .call::<_, TradePrice>(TRADE_PRICE_ACTION, &mut request)
            .await
            .unwrap_err();

        match err {
            Error::Transport(e) => {
                assert!(!e.is_timeout());
                assert_eq!(e.to_string(), "Stopped after 2 redirects");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
