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

//! HTTP/1.1 transport on hyper with rustls.
//!
//! Connections are set up in two bounded steps: the TCP dial, limited by
//! [`ClientParams::dial_timeout`], then for `https` URLs the TLS handshake,
//! limited by [`ClientParams::tls_handshake_timeout`].

use crate::Credentials;
use crate::HttpClient;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::header;
use http::HeaderMap;
use http::HeaderValue;
use http::Request;
use http::StatusCode;
use http::Uri;
use http_body_util::BodyExt as _;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper_util::client::legacy::connect::Connected;
use hyper_util::client::legacy::connect::Connection;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as LegacyClient;
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::rt::TokioTimer;
use rustls::client::danger::HandshakeSignatureValid;
use rustls::client::danger::ServerCertVerified;
use rustls::client::danger::ServerCertVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::CertificateDer;
use rustls::pki_types::ServerName;
use rustls::pki_types::UnixTime;
use rustls::ClientConfig;
use rustls::DigitallySignedStruct;
use rustls::RootCertStore;
use rustls::SignatureScheme;
use std::convert::TryFrom;
use std::error::Error as StdError;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::io::ReadBuf;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tower_service::Service;
use tracing::debug;
use url::Url;

type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug)]
pub enum TransportError {
    /// TLS client configuration could not be built.
    Tls(rustls::Error),
    /// URL or headers do not form a valid request.
    InvalidRequest(http::Error),
    /// Connection setup or the exchange failed.
    Client(hyper_util::client::legacy::Error),
    /// Response body could not be read.
    Body(hyper::Error),
    /// Request timeout elapsed.
    Timeout(Duration),
    /// Redirect response without a usable `Location`.
    InvalidRedirect(String),
    /// Redirect limit reached.
    TooManyRedirects(usize),
}

impl TransportError {
    /// Request was aborted because a timeout elapsed: the dial, the TLS
    /// handshake or the whole request.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Client(e) => timed_out(e),
            Self::Body(e) => e.is_timeout(),
            Self::Tls(_)
            | Self::InvalidRequest(_)
            | Self::InvalidRedirect(_)
            | Self::TooManyRedirects(_) => false,
        }
    }
}

#[allow(clippy::absolute_paths)]
impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tls(e) => write!(f, "TLS configuration error: {e}"),
            Self::InvalidRequest(e) => write!(f, "Invalid HTTP request: {e}"),
            Self::Client(e) => match root_cause(e) {
                Some(cause) => write!(f, "HTTP client error: {e}: {cause}"),
                None => write!(f, "HTTP client error: {e}"),
            },
            Self::Body(e) => write!(f, "Failed to read HTTP response body: {e}"),
            Self::Timeout(limit) => write!(f, "Request timed out after {limit:?}"),
            Self::InvalidRedirect(location) => write!(f, "Invalid redirect location: {location}"),
            Self::TooManyRedirects(max) => write!(f, "Stopped after {max} redirects"),
        }
    }
}

#[allow(clippy::absolute_paths)]
impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tls(e) => Some(e),
            Self::InvalidRequest(e) => Some(e),
            Self::Client(e) => Some(e),
            Self::Body(e) => Some(e),
            Self::Timeout(_) | Self::InvalidRedirect(_) | Self::TooManyRedirects(_) => None,
        }
    }
}

fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a (dyn StdError + 'static)> {
    let mut cause = err.source()?;
    while let Some(next) = cause.source() {
        cause = next;
    }
    Some(cause)
}

fn timed_out(err: &(dyn StdError + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause
            .downcast_ref::<io::Error>()
            .map_or(false, |e| e.kind() == io::ErrorKind::TimedOut)
        {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Configuration parameters for the hyper HTTP client.
///
/// The dial, TLS handshake and request timeouts are independent. The
/// request timeout covers the whole exchange, redirects included.
///
/// # Examples
///
/// ```rust
/// use soapkit_http::hyper::ClientParams;
/// use std::time::Duration;
///
/// let params = ClientParams::new()
///     .request_timeout(Duration::from_secs(30))
///     .dial_timeout(Duration::from_secs(5))
///     .tls_handshake_timeout(Duration::from_secs(5))
///     .user_agent("MyApp/1.0")
///     .accept_invalid_certs(true);
/// ```
#[derive(Debug, Clone)]
pub struct ClientParams {
    /// TCP connection timeout
    pub dial_timeout: Option<Duration>,
    /// TLS handshake timeout
    pub tls_handshake_timeout: Option<Duration>,
    /// Whole request timeout
    pub request_timeout: Option<Duration>,
    /// User-Agent header value, unless the request sets one
    pub user_agent: Option<String>,
    /// Whether to accept invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// Maximum number of 307/308 redirects to follow, 0 returns them
    pub max_redirects: usize,
    /// TCP keep-alive timeout
    pub tcp_keepalive: Option<Duration>,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: Option<usize>,
    /// List of default headers, added to every request
    pub default_headers: Option<HeaderMap>,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            dial_timeout: Some(Duration::from_secs(30)),
            tls_handshake_timeout: Some(Duration::from_secs(15)),
            request_timeout: Some(Duration::from_secs(90)),
            user_agent: None,
            accept_invalid_certs: false,
            max_redirects: 10,
            tcp_keepalive: Some(Duration::from_secs(30)),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: Some(2),
            default_headers: None,
        }
    }
}

impl ClientParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn tls_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.tls_handshake_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Remove the whole request timeout. Dial and handshake stay bounded.
    #[must_use]
    pub const fn no_timeout(mut self) -> Self {
        self.request_timeout = None;
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    #[must_use]
    pub const fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    #[must_use]
    pub const fn tcp_keepalive(mut self, keepalive: Duration) -> Self {
        self.tcp_keepalive = Some(keepalive);
        self
    }

    #[must_use]
    pub const fn pool_max_idle_per_host(mut self, pool_max_idle_per_host: usize) -> Self {
        self.pool_max_idle_per_host = Some(pool_max_idle_per_host);
        self
    }

    #[must_use]
    pub const fn idle_timeout(mut self, pool_idle_timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(pool_idle_timeout);
        self
    }

    #[must_use]
    pub fn default_headers(mut self, default_headers: HeaderMap) -> Self {
        self.default_headers = Some(default_headers);
        self
    }
}

/// Transport implementation using hyper and rustls.
///
/// Requires a tokio runtime when sending.
///
/// # Examples
///
/// ```rust,no_run
/// use soapkit_http::hyper::Client;
/// use soapkit_http::hyper::ClientParams;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new()?;
///
/// let params = ClientParams::new().request_timeout(Duration::from_secs(60));
/// let client = Client::with_params(params)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    client: LegacyClient<Connector, Full<Bytes>>,
    request_timeout: Option<Duration>,
    max_redirects: usize,
    user_agent: Option<HeaderValue>,
    default_headers: HeaderMap,
}

#[allow(clippy::missing_errors_doc)]
impl Client {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_params(ClientParams::default())
    }

    pub fn with_params(params: ClientParams) -> Result<Self, TransportError> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_nodelay(true);
        http.set_connect_timeout(params.dial_timeout);
        http.set_keepalive(params.tcp_keepalive);

        let tls = tls_config(params.accept_invalid_certs).map_err(TransportError::Tls)?;
        let connector = Connector {
            http,
            tls: TlsConnector::from(Arc::new(tls)),
            handshake_timeout: params.tls_handshake_timeout,
        };

        let mut builder = LegacyClient::builder(TokioExecutor::new());
        builder
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(params.pool_idle_timeout);
        if let Some(max_idle) = params.pool_max_idle_per_host {
            builder.pool_max_idle_per_host(max_idle);
        }

        let user_agent = params
            .user_agent
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| TransportError::InvalidRequest(e.into()))?;

        Ok(Self {
            client: builder.build(connector),
            request_timeout: params.request_timeout,
            max_redirects: params.max_redirects,
            user_agent,
            default_headers: params.default_headers.unwrap_or_default(),
        })
    }

    async fn exchange(
        &self,
        mut url: Url,
        body: Bytes,
        mut credentials: Option<&Credentials>,
        headers: &HeaderMap,
    ) -> Result<http::Response<Vec<u8>>, TransportError> {
        let mut redirects = 0;
        loop {
            let response = self.send(&url, body.clone(), credentials, headers).await?;
            let status = response.status();
            if self.max_redirects == 0
                || (status != StatusCode::TEMPORARY_REDIRECT
                    && status != StatusCode::PERMANENT_REDIRECT)
            {
                return Ok(response);
            }
            if redirects == self.max_redirects {
                return Err(TransportError::TooManyRedirects(self.max_redirects));
            }
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| TransportError::InvalidRedirect(String::new()))?;
            let next = url
                .join(location)
                .map_err(|_| TransportError::InvalidRedirect(location.to_string()))?;
            if next.origin() != url.origin() {
                credentials = None;
            }
            debug!(from = %url, to = %next, status = status.as_u16(), "following redirect");
            url = next;
            redirects += 1;
        }
    }

    async fn send(
        &self,
        url: &Url,
        body: Bytes,
        credentials: Option<&Credentials>,
        headers: &HeaderMap,
    ) -> Result<http::Response<Vec<u8>>, TransportError> {
        let mut request_headers = self.default_headers.clone();
        request_headers.extend(headers.clone());
        if let Some(user_agent) = &self.user_agent {
            if !request_headers.contains_key(header::USER_AGENT) {
                request_headers.insert(header::USER_AGENT, user_agent.clone());
            }
        }
        if let Some(credentials) = credentials {
            request_headers.insert(header::AUTHORIZATION, basic_auth(credentials)?);
        }

        let mut request = Request::post(url.as_str())
            .body(Full::new(body))
            .map_err(TransportError::InvalidRequest)?;
        *request.headers_mut() = request_headers;

        let response = self
            .client
            .request(request)
            .await
            .map_err(TransportError::Client)?;
        let (parts, incoming) = response.into_parts();
        let bytes = incoming
            .collect()
            .await
            .map_err(TransportError::Body)?
            .to_bytes();
        Ok(http::Response::from_parts(parts, bytes.to_vec()))
    }
}

impl HttpClient for Client {
    type Error = TransportError;

    async fn post(
        &self,
        url: Url,
        body: Vec<u8>,
        credentials: Option<&Credentials>,
        headers: &HeaderMap,
    ) -> Result<http::Response<Vec<u8>>, Self::Error> {
        let exchange = self.exchange(url, Bytes::from(body), credentials, headers);
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => exchange.await,
        }
    }
}

fn basic_auth(credentials: &Credentials) -> Result<HeaderValue, TransportError> {
    let token = STANDARD.encode(format!(
        "{}:{}",
        credentials.username,
        credentials.password()
    ));
    let mut value = HeaderValue::from_str(&format!("Basic {token}"))
        .map_err(|e| TransportError::InvalidRequest(e.into()))?;
    value.set_sensitive(true);
    Ok(value)
}

fn tls_config(accept_invalid_certs: bool) -> Result<ClientConfig, rustls::Error> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder =
        ClientConfig::builder_with_provider(provider.clone()).with_safe_default_protocol_versions()?;
    let mut config = if accept_invalid_certs {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert(provider)))
            .with_no_client_auth()
    } else {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        builder.with_root_certificates(roots).with_no_client_auth()
    };
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Ok(config)
}

/// Skips certificate validation but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyCert(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

/// Dials with [`HttpConnector`], then runs the TLS handshake for `https`.
#[derive(Clone)]
struct Connector {
    http: HttpConnector,
    tls: TlsConnector,
    handshake_timeout: Option<Duration>,
}

impl Service<Uri> for Connector {
    type Response = TokioIo<Stream>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.http.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let tls = (uri.scheme_str() == Some("https")).then(|| self.tls.clone());
        Box::pin(connect(
            self.http.clone(),
            uri,
            tls,
            self.handshake_timeout,
        ))
    }
}

async fn connect(
    mut http: HttpConnector,
    uri: Uri,
    tls: Option<TlsConnector>,
    handshake_timeout: Option<Duration>,
) -> Result<TokioIo<Stream>, BoxError> {
    let host = uri
        .host()
        .map(|host| host.trim_start_matches('[').trim_end_matches(']').to_owned());
    let tcp = http.call(uri).await?.into_inner();
    let tls = match tls {
        Some(tls) => tls,
        None => return Ok(TokioIo::new(Stream::Plain(tcp))),
    };

    let host = host.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "URL has no host"))?;
    let handshake = tls.connect(ServerName::try_from(host)?, tcp);
    let stream = match handshake_timeout {
        Some(limit) => tokio::time::timeout(limit, handshake)
            .await
            .map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("TLS handshake timed out after {limit:?}"),
                )
            })??,
        None => handshake.await?,
    };
    Ok(TokioIo::new(Stream::Tls(Box::new(stream))))
}

enum Stream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Connection for Stream {
    fn connected(&self) -> Connected {
        match self {
            Self::Plain(tcp) => tcp.connected(),
            Self::Tls(tls) => tls.get_ref().0.connected(),
        }
    }
}

impl AsyncRead for Stream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(tcp) => Pin::new(tcp).poll_read(cx, buf),
            Self::Tls(tls) => Pin::new(tls.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Stream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(tcp) => Pin::new(tcp).poll_write(cx, buf),
            Self::Tls(tls) => Pin::new(tls.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(tcp) => Pin::new(tcp).poll_flush(cx),
            Self::Tls(tls) => Pin::new(tls.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(tcp) => Pin::new(tcp).poll_shutdown(cx),
            Self::Tls(tls) => Pin::new(tls.as_mut()).poll_shutdown(cx),
        }
    }
}
