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

pub mod credentials;
pub mod error;
pub mod settings;

#[cfg(feature = "hyper")]
pub mod hyper;

use http::header;
use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use soapkit_core::decode_message;
use soapkit_core::envelope::to_fragment;
use soapkit_core::Attachment;
use soapkit_core::BinaryFields;
use soapkit_core::Body;
use soapkit_core::Envelope;
use soapkit_core::FaultDetail;
use soapkit_core::MimeAttachmentCodec;
use soapkit_core::MtomEncoder;
use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use tracing::warn;
use url::Url;

#[doc(inline)]
pub use credentials::Credentials;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use settings::ClientSettings;
#[doc(inline)]
pub use settings::Mode;

/// Name of the SOAP 1.1 action header.
pub const SOAP_ACTION: &str = "soapaction";

/// Transport used by the SOAP [`Client`].
pub trait HttpClient: Send + Sync {
    type Error: Send + StdError;

    /// Perform an HTTP POST request and return the response whatever its
    /// status.
    fn post(
        &self,
        url: Url,
        body: Vec<u8>,
        credentials: Option<&Credentials>,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, Self::Error>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    type Error = C::Error;

    fn post(
        &self,
        url: Url,
        body: Vec<u8>,
        credentials: Option<&Credentials>,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<http::Response<Vec<u8>>, Self::Error>> + Send {
        self.as_ref().post(url, body, credentials, headers)
    }
}

/// Response of a call that may carry MIME attachments.
#[derive(Debug)]
pub struct SoapResponse<T> {
    /// Decoded body; `None` when the body was empty.
    pub content: Option<T>,
    /// Attachments of a multipart response.
    pub attachments: Vec<Attachment>,
}

/// SOAP client bound to one endpoint.
///
/// Calls take `&self`, so one client can serve concurrent calls.
/// Dropping a call future aborts the request.
///
/// # Examples
///
/// ```rust,no_run
/// use serde::Deserialize;
/// use serde::Serialize;
/// use soapkit_core::BinaryFields;
/// use soapkit_http::hyper::Client as HyperClient;
/// use soapkit_http::Client;
/// use soapkit_http::ClientSettings;
/// use url::Url;
///
/// #[derive(Serialize)]
/// struct GetLastTradePrice {
///     #[serde(rename = "tickerSymbol")]
///     ticker_symbol: String,
/// }
/// impl BinaryFields for GetLastTradePrice {}
///
/// #[derive(Deserialize)]
/// struct TradePrice {
///     price: f32,
/// }
/// impl BinaryFields for TradePrice {}
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let endpoint = Url::parse("http://example.com/stockquote")?;
/// let client = Client::new(HyperClient::new()?, endpoint, ClientSettings::default());
/// let mut request = GetLastTradePrice { ticker_symbol: "ACME".into() };
/// let price: Option<TradePrice> = client
///     .call("http://example.com/GetLastTradePrice", &mut request)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Client<C: HttpClient> {
    client: C,
    endpoint: Url,
    settings: ClientSettings,
    headers: Vec<String>,
}

impl<C: HttpClient> Client<C> {
    #[must_use]
    pub const fn new(client: C, endpoint: Url, settings: ClientSettings) -> Self {
        Self {
            client,
            endpoint,
            settings,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Add a SOAP header element sent with every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be serialized.
    pub fn add_header<H: Serialize>(&mut self, header: &H) -> Result<(), Error<C::Error>> {
        self.headers.push(to_fragment(header)?);
        Ok(())
    }

    /// Call `action` with `request`. Returns `None` when the response
    /// body is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fault`] for a service fault, [`Error::HttpStatus`]
    /// for other failed responses, and transport or codec errors.
    pub async fn call<Req, Resp>(
        &self,
        action: &str,
        request: &mut Req,
    ) -> Result<Option<Resp>, Error<C::Error>>
    where
        Req: Serialize + BinaryFields,
        Resp: DeserializeOwned + BinaryFields,
    {
        let (body, _) = self.round_trip(action, request, &[]).await?;
        into_content(body)
    }

    /// Like [`Client::call`], decoding a fault detail as `D`. When the
    /// detail has data, the fault's message is `D::error_string()`. The
    /// typed detail can be read back with
    /// [`SoapFault::typed_detail`](soapkit_core::SoapFault::typed_detail).
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`]; a detail that does not match `D` is a
    /// codec error.
    pub async fn call_with_fault_detail<Req, Resp, D>(
        &self,
        action: &str,
        request: &mut Req,
    ) -> Result<Option<Resp>, Error<C::Error>>
    where
        Req: Serialize + BinaryFields,
        Resp: DeserializeOwned + BinaryFields,
        D: FaultDetail,
    {
        let (body, _) = self.round_trip(action, request, &[]).await?;
        match body {
            Body::Fault(mut fault) => {
                fault.decode_detail::<D>()?;
                Err(Error::Fault(Box::new(fault)))
            }
            other => into_content(other),
        }
    }

    /// Call `action` sending `attachments` next to the envelope. The client
    /// must be configured with [`Mode::MimeAttachments`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttachmentsNotEnabled`] for other modes, otherwise
    /// the same errors as [`Client::call`].
    pub async fn call_with_attachments<Req, Resp>(
        &self,
        action: &str,
        request: &mut Req,
        attachments: &[Attachment],
    ) -> Result<SoapResponse<Resp>, Error<C::Error>>
    where
        Req: Serialize + BinaryFields,
        Resp: DeserializeOwned + BinaryFields,
    {
        if self.settings.mode != Mode::MimeAttachments {
            return Err(Error::AttachmentsNotEnabled);
        }
        let (body, attachments) = self.round_trip(action, request, attachments).await?;
        Ok(SoapResponse {
            content: into_content(body)?,
            attachments,
        })
    }

    async fn round_trip<Req, Resp>(
        &self,
        action: &str,
        request: &mut Req,
        attachments: &[Attachment],
    ) -> Result<(Body<Resp>, Vec<Attachment>), Error<C::Error>>
    where
        Req: Serialize + BinaryFields,
        Resp: DeserializeOwned + BinaryFields,
    {
        let version = self.settings.version;
        let (content_type, payload) = match self.settings.mode {
            Mode::Plain => (
                version.content_type(action),
                self.envelope(request)?.encode()?,
            ),
            Mode::Mtom => {
                let encoder = MtomEncoder::new();
                MtomEncoder::prepare(request);
                let envelope = self.envelope(request)?.encode()?;
                (encoder.content_type(), encoder.encode(&envelope, request)?)
            }
            Mode::MimeAttachments => {
                let codec = MimeAttachmentCodec::new();
                let envelope = self.envelope(request)?.encode()?;
                (codec.content_type(), codec.encode(&envelope, attachments)?)
            }
        };

        let headers = self.request_headers(action, &content_type)?;
        debug!(
            action,
            endpoint = %self.endpoint,
            mode = ?self.settings.mode,
            bytes = payload.len(),
            "calling SOAP operation"
        );
        let response = self
            .client
            .post(
                self.endpoint.clone(),
                payload,
                self.settings.credentials.as_ref(),
                &headers,
            )
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        let response_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.into_body();

        if !status.is_success() {
            warn!(action, status = status.as_u16(), "SOAP call failed");
            return match decode_message::<Resp>(response_type.as_deref(), &body) {
                Ok((Body::Fault(fault), attachments)) => Ok((Body::Fault(fault), attachments)),
                _ => Err(Error::HttpStatus {
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                }),
            };
        }
        Ok(decode_message::<Resp>(response_type.as_deref(), &body)?)
    }

    fn envelope<Req: Serialize>(&self, request: &Req) -> Result<Envelope, Error<C::Error>> {
        let mut envelope = Envelope::new(self.settings.version, request)?;
        envelope.extend_headers(self.headers.iter().cloned());
        Ok(envelope)
    }

    fn request_headers(
        &self,
        action: &str,
        content_type: &str,
    ) -> Result<HeaderMap, Error<C::Error>> {
        let value = |v: &str| {
            HeaderValue::from_str(v).map_err(|_| Error::InvalidHeader(v.to_owned()))
        };
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, value(content_type)?);
        headers.insert(HeaderName::from_static(SOAP_ACTION), value(action)?);
        headers.insert(header::USER_AGENT, value(&self.settings.user_agent)?);
        for (name, v) in &self.settings.http_headers {
            headers.insert(name.clone(), v.clone());
        }
        Ok(headers)
    }
}

fn into_content<T, E>(body: Body<T>) -> Result<Option<T>, Error<E>> {
    match body {
        Body::Content(content) => Ok(Some(content)),
        Body::Empty => Ok(None),
        Body::Fault(fault) => Err(Error::Fault(Box::new(fault))),
    }
}
