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

#[cfg(feature = "hyper")]
#[allow(dead_code)]
pub mod test_utils {
    use http::HeaderMap;
    use serde::Deserialize;
    use serde::Serialize;
    use soapkit_core::mime::MediaType;
    use soapkit_core::mime::MultipartReader;
    use soapkit_core::mime::MultipartWriter;
    use soapkit_core::Binary;
    use soapkit_core::BinaryFields;
    use soapkit_core::FaultDetail;
    use soapkit_http::hyper::Client as HyperClient;
    use soapkit_http::hyper::ClientParams;
    use soapkit_http::Client;
    use soapkit_http::ClientSettings;
    use soapkit_http::Credentials;
    use url::Url;
    use wiremock::MockServer;
    use wiremock::Request;
    use wiremock::Respond;
    use wiremock::ResponseTemplate;

    pub const SERVICE_PATH: &str = "/stockquote";
    pub const TRADE_PRICE_ACTION: &str = "http://example.com/GetLastTradePrice";
    pub const BASIC_AUTH: &str = "Basic cm9vdDpwYXNzd29yZA==";

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename = "TradePriceRequest")]
    pub struct TradePriceRequest {
        #[serde(rename = "tickerSymbol")]
        pub ticker_symbol: String,
    }

    impl BinaryFields for TradePriceRequest {}

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    pub struct TradePrice {
        pub price: f32,
    }

    impl BinaryFields for TradePrice {}

    /// Request and response of the binary echo operation.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename = "Upload")]
    pub struct Upload {
        pub name: String,
        pub first: Binary,
        pub second: Binary,
    }

    impl BinaryFields for Upload {
        fn binaries(&self, visit: &mut dyn FnMut(&Binary)) {
            self.first.binaries(visit);
            self.second.binaries(visit);
        }

        fn binaries_mut(&mut self, visit: &mut dyn FnMut(&mut Binary)) {
            self.first.binaries_mut(visit);
            self.second.binaries_mut(visit);
        }
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct QuoteFault {
        #[serde(rename = "Reason")]
        pub reason: Option<String>,
        #[serde(rename = "Code", default)]
        pub code: u32,
    }

    impl FaultDetail for QuoteFault {
        fn has_data(&self) -> bool {
            self.reason.is_some()
        }

        fn error_string(&self) -> String {
            format!(
                "{}: {}",
                self.code,
                self.reason.as_deref().unwrap_or_default()
            )
        }
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

    pub fn create_test_credentials() -> Credentials {
        Credentials::new("root".to_string(), "password".to_string())
    }

    pub fn create_endpoint(mock_server: &MockServer) -> Url {
        Url::parse(&format!("{}{SERVICE_PATH}", mock_server.uri())).unwrap()
    }

    pub fn create_test_client(
        mock_server: &MockServer,
        settings: ClientSettings,
    ) -> Client<HyperClient> {
        create_test_client_with_params(mock_server, settings, ClientParams::new())
    }

    pub fn create_test_client_with_params(
        mock_server: &MockServer,
        settings: ClientSettings,
        params: ClientParams,
    ) -> Client<HyperClient> {
        let client = HyperClient::with_params(params).unwrap();
        Client::new(client, create_endpoint(mock_server), settings)
    }

    /// Echoes a multipart request back with its parts in reverse order.
    pub struct ReversedMultipartEcho;

    impl Respond for ReversedMultipartEcho {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let content_type = request
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap();
            let media = MediaType::parse(content_type).unwrap();
            let boundary = media.param("boundary").unwrap();
            let parts = MultipartReader::new(&request.body, boundary)
                .parts()
                .unwrap();

            let mut writer = MultipartWriter::with_boundary("echo-boundary");
            for part in parts.iter().rev() {
                writer.write_part(&part.headers, &part.body);
            }
            let response_type = content_type.replace(boundary, "echo-boundary");
            ResponseTemplate::new(200)
                .insert_header("content-type", response_type.as_str())
                .set_body_bytes(writer.finish())
        }
    }

    /// Echoes the request body and content type unchanged.
    pub struct Echo;

    impl Respond for Echo {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let mut template = ResponseTemplate::new(200).set_body_bytes(request.body.clone());
            if let Some(content_type) = request.headers.get("content-type") {
                template = template.insert_header("content-type", content_type.clone());
            }
            template
        }
    }

    pub fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, value.parse().unwrap());
        }
        map
    }
}
