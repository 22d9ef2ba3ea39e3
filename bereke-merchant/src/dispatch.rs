//! Request dispatch pipeline.
//!
//! Every gateway call goes through [`Dispatcher::execute`]:
//!
//! ```text
//! credentials ──┐
//!               ├─ merge (credentials win) ─ encode (sorted) ─┬─ sign? ─ send ─ decode
//! caller params ┘                                             │
//!                                                             └─ query string
//! ```
//!
//! The canonical encoded string is computed once. In production with
//! certificate credentials the same string is signed (`X-Hash`,
//! `X-Signature`) and sent; in every other combination it is sent unsigned.
//!
//! RSA signing runs on the blocking thread pool so key decryption never
//! stalls the async workers. Under load prefer [`KeyLoading::Cached`], which
//! reads and decrypts the key file once.
//!
//! A call is cancelled by dropping its future. A per-call
//! [`RequestContext::timeout`] turns an overrun into
//! [`GatewayError::DeadlineExceeded`].

use std::{fmt, sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use tracing::{Span, debug, instrument};

use crate::{
    config::{GatewayConfig, validate_base_url},
    credentials::{AuthMode, Credentials},
    environment::Environment,
    error::{GatewayError, Result},
    params::RequestParameters,
    signing::{KeyLoading, RequestSignature, RequestSigner},
    transport::{HttpMethod, HttpTransport, Transport, TransportRequest, TransportResponse},
};

/// Fixed timeout of the liveness probe.
pub const PING_TIMEOUT: Duration = Duration::from_secs(3);

/// One call to dispatch.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP method.
    pub method: HttpMethod,
    /// Endpoint path relative to the base URL (e.g. `register.do`).
    pub path: &'static str,
    /// Caller parameters, before credentials are merged in.
    pub params: RequestParameters,
    /// Optional deadline for the whole exchange.
    pub timeout: Option<Duration>,
}

impl RequestContext {
    /// Creates a context without a deadline.
    #[must_use]
    pub fn new(method: HttpMethod, path: &'static str, params: RequestParameters) -> Self {
        Self { method, path, params, timeout: None }
    }

    /// Sets the per-call deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fully prepared request: merged parameters, their canonical encoding and
/// the signature when one applies.
#[derive(Clone)]
pub struct PreparedRequest {
    /// Endpoint URL without query.
    pub url: String,
    /// Canonical encoded parameter string.
    pub query: String,
    /// Signature headers, present only for signed traffic.
    pub signature: Option<RequestSignature>,
}

// The query may carry credentials.
impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("url", &self.url)
            .field("query_len", &self.query.len())
            .field("signed", &self.signature.is_some())
            .finish()
    }
}

/// Composes credentials, parameters and signing, performs the exchange and
/// decodes the result.
///
/// Immutable after construction and safe to share between tasks.
#[derive(Debug)]
pub struct Dispatcher<T: Transport = HttpTransport> {
    credentials: Credentials,
    environment: Environment,
    base_url: String,
    signer: Option<Arc<RequestSigner>>,
    transport: T,
}

impl Dispatcher<HttpTransport> {
    /// Creates a dispatcher for the environment's default gateway.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(credentials: Credentials, environment: Environment) -> Result<Self> {
        Self::with_transport(
            credentials,
            environment,
            None,
            KeyLoading::default(),
            HttpTransport::new()?,
        )
    }

    /// Creates a dispatcher from configuration, resolving secrets from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns any configuration, environment or secret lookup error.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;
        Self::with_transport(
            config.credentials()?,
            config.environment()?,
            config.base_url.as_deref(),
            config.signing_key_loading,
            HttpTransport::with_config(&config.http)?,
        )
    }
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher over an explicit transport.
    ///
    /// `base_url` overrides the environment default. The signer is created
    /// only for certificate credentials in production.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the base URL override is
    /// not an http(s) URL.
    pub fn with_transport(
        credentials: Credentials,
        environment: Environment,
        base_url: Option<&str>,
        key_loading: KeyLoading,
        transport: T,
    ) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => {
                validate_base_url(url)?;
                url.to_owned()
            }
            None => environment.base_url().to_owned(),
        };

        let signer = match (&credentials, environment) {
            (Credentials::Certificate { cert_path, passphrase }, Environment::Production) => {
                let signer = RequestSigner::new(cert_path.clone(), passphrase.clone(), key_loading);
                Some(Arc::new(signer))
            }
            _ => None,
        };

        Ok(Self { credentials, environment, base_url, signer, transport })
    }

    /// Returns the environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the authentication mode.
    #[must_use]
    pub const fn auth_mode(&self) -> AuthMode {
        self.credentials.mode()
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true if requests carry `X-Hash` and `X-Signature`.
    #[must_use]
    pub const fn signs_requests(&self) -> bool {
        self.signer.is_some()
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport's protocol name, as recorded on request spans.
    #[must_use]
    pub fn protocol_name(&self) -> &'static str {
        self.transport.protocol_name()
    }

    /// Joins the base URL and an endpoint path.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Merges, encodes and (when required) signs a request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::KeyLoad`] or [`GatewayError::Signing`] when
    /// signing fails.
    pub fn prepare(&self, ctx: &RequestContext) -> Result<PreparedRequest> {
        let query = self.encode_params(ctx);
        let signature = self.signer.as_ref().map(|signer| signer.sign(&query)).transpose()?;

        Ok(PreparedRequest { url: self.endpoint_url(ctx.path), query, signature })
    }

    /// [`Dispatcher::prepare`] with the signing step moved to the blocking
    /// thread pool.
    async fn prepare_off_thread(&self, ctx: &RequestContext) -> Result<PreparedRequest> {
        let query = self.encode_params(ctx);
        let signature = match &self.signer {
            Some(signer) => {
                let signer = Arc::clone(signer);
                let body = query.clone();
                let span = Span::current();
                let task = move || span.in_scope(|| signer.sign(&body));
                let signed = tokio::task::spawn_blocking(task)
                    .await
                    .map_err(|e| GatewayError::Signing(format!("signing task failed: {e}")))??;
                Some(signed)
            }
            None => None,
        };

        Ok(PreparedRequest { url: self.endpoint_url(ctx.path), query, signature })
    }

    fn encode_params(&self, ctx: &RequestContext) -> String {
        let mut params = RequestParameters::new();
        self.credentials.merge_into(&mut params);
        params.fill_missing(&ctx.params);
        params.encode()
    }

    /// Executes a call and decodes the JSON response into `R`.
    ///
    /// An empty (or whitespace-only) body decodes to `R::default()`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::KeyLoad`] / [`GatewayError::Signing`] before any I/O
    /// - [`GatewayError::Transport`] on network failure
    /// - [`GatewayError::DeadlineExceeded`] if the per-call timeout elapses
    /// - [`GatewayError::Decode`] if the body is not valid JSON for `R`
    pub async fn execute<R>(&self, ctx: RequestContext) -> Result<R>
    where
        R: DeserializeOwned + Default,
    {
        let response = self.exchange(ctx).await?;
        decode_body(&response.body)
    }

    /// Executes a call and discards the response body.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::execute`], minus decoding.
    pub async fn execute_discard(&self, ctx: RequestContext) -> Result<()> {
        self.exchange(ctx).await.map(drop)
    }

    #[instrument(
        skip(self, ctx),
        fields(
            method = %ctx.method,
            path = ctx.path,
            auth_mode = self.credentials.mode().as_str(),
            environment = %self.environment,
            protocol = self.transport.protocol_name(),
            signed = tracing::field::Empty
        )
    )]
    async fn exchange(&self, ctx: RequestContext) -> Result<TransportResponse> {
        let prepared = self.prepare_off_thread(&ctx).await?;
        Span::current().record("signed", prepared.signature.is_some());

        let headers = prepared
            .signature
            .as_ref()
            .map(|signature| signature.headers().to_vec())
            .unwrap_or_default();

        let request = TransportRequest {
            method: ctx.method,
            url: &prepared.url,
            query: &prepared.query,
            headers,
        };

        debug!(params = ?ctx.params, "dispatching gateway request");

        let response = match ctx.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.send(request))
                .await
                .map_err(|_| GatewayError::DeadlineExceeded(limit))??,
            None => self.transport.send(request).await?,
        };

        Ok(response)
    }

    /// Checks that the gateway host answers at all.
    ///
    /// Sends a bare `GET` to the base URL, without credentials or signing,
    /// bounded by [`PING_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unreachable`] if no response arrives in time.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn ping(&self) -> Result<()> {
        self.transport.probe(&self.base_url, PING_TIMEOUT).await
    }
}

/// Decodes a gateway response body.
///
/// # Errors
///
/// Returns [`GatewayError::Decode`] if a non-empty body is not valid JSON for `R`.
pub fn decode_body<R>(body: &[u8]) -> Result<R>
where
    R: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        debug!("empty gateway response body");
        return Ok(R::default());
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;

    use super::*;
    use crate::{
        signing::{
            compute_hash,
            test_support::{PASSPHRASE, TEST_KEY, key_file},
            verify,
        },
        transport::sealed,
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Recorded {
        method: HttpMethod,
        url: String,
        query: String,
        headers: Vec<(String, String)>,
    }

    #[derive(Debug)]
    struct RecordingTransport {
        body: Vec<u8>,
        delay: Option<Duration>,
        recorded: Mutex<Vec<Recorded>>,
    }

    impl RecordingTransport {
        fn responding(body: &str) -> Self {
            Self { body: body.as_bytes().to_vec(), delay: None, recorded: Mutex::new(Vec::new()) }
        }

        fn recorded(&self) -> Vec<Recorded> {
            self.recorded.lock().unwrap().clone()
        }
    }

    impl sealed::private::Sealed for RecordingTransport {}

    impl Transport for RecordingTransport {
        async fn send<'a>(&'a self, request: TransportRequest<'a>) -> Result<TransportResponse> {
            self.recorded.lock().unwrap().push(Recorded {
                method: request.method,
                url: request.url.to_owned(),
                query: request.query.to_owned(),
                headers: request
                    .headers
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect(),
            });
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(TransportResponse { status: 200, body: self.body.clone() })
        }

        async fn probe<'a>(&'a self, _url: &'a str, _timeout: Duration) -> Result<()> {
            Ok(())
        }

        fn protocol_name(&self) -> &'static str {
            "recording"
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq, Eq)]
    struct Envelope {
        #[serde(rename = "errorCode", default)]
        error_code: String,
    }

    fn dispatcher(
        credentials: Credentials,
        environment: Environment,
        transport: RecordingTransport,
    ) -> Dispatcher<RecordingTransport> {
        Dispatcher::with_transport(
            credentials,
            environment,
            None,
            KeyLoading::PerRequest,
            transport,
        )
        .unwrap()
    }

    fn order_params() -> RequestParameters {
        [("orderNumber", "ORD-1"), ("amount", "1050")].into_iter().collect()
    }

    fn has_signature_headers(recorded: &Recorded) -> bool {
        recorded.headers.iter().any(|(k, _)| k == "X-Hash")
            && recorded.headers.iter().any(|(k, _)| k == "X-Signature")
    }

    #[tokio::test]
    async fn test_signature_headers_only_for_certificate_in_production() {
        let file = key_file();
        let path = file.path().to_path_buf();

        let cases = [
            (Credentials::login_password("m", "p"), Environment::Test, false),
            (Credentials::login_password("m", "p"), Environment::Production, false),
            (Credentials::token("t"), Environment::Test, false),
            (Credentials::token("t"), Environment::Production, false),
            (Credentials::certificate(&path, PASSPHRASE), Environment::Test, false),
            (Credentials::certificate(&path, PASSPHRASE), Environment::Production, true),
        ];

        for (credentials, environment, signed) in cases {
            let mode = credentials.mode();
            let d = dispatcher(credentials, environment, RecordingTransport::responding("{}"));
            assert_eq!(d.signs_requests(), signed, "{mode:?} in {environment}");

            let ctx = RequestContext::new(HttpMethod::Post, "register.do", order_params());
            d.execute_discard(ctx).await.unwrap();

            let recorded = d.transport().recorded();
            assert_eq!(recorded.len(), 1);
            assert_eq!(has_signature_headers(&recorded[0]), signed, "{mode:?} in {environment}");
        }
    }

    #[tokio::test]
    async fn test_signature_covers_transmitted_query() {
        let file = key_file();
        let d = dispatcher(
            Credentials::certificate(file.path(), PASSPHRASE),
            Environment::Production,
            RecordingTransport::responding("{}"),
        );

        d.execute_discard(RequestContext::new(HttpMethod::Post, "register.do", order_params()))
            .await
            .unwrap();

        let recorded = d.transport().recorded().remove(0);
        assert_eq!(recorded.query, "amount=1050&orderNumber=ORD-1");
        let header = |name: &str| {
            recorded.headers.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()).unwrap()
        };
        assert_eq!(header("X-Hash"), compute_hash(recorded.query.as_bytes()));
        assert!(verify(&TEST_KEY.public_pem, recorded.query.as_bytes(), &header("X-Signature"))
            .unwrap());
    }

    #[tokio::test]
    async fn test_sent_signature_matches_prepared_request() {
        let file = key_file();
        let d = dispatcher(
            Credentials::certificate(file.path(), PASSPHRASE),
            Environment::Production,
            RecordingTransport::responding("{}"),
        );
        let ctx = RequestContext::new(HttpMethod::Post, "register.do", order_params());

        let prepared = d.prepare(&ctx).unwrap();
        d.execute_discard(ctx).await.unwrap();

        let recorded = d.transport().recorded().remove(0);
        let expected: Vec<(String, String)> = prepared
            .signature
            .unwrap()
            .headers()
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        assert_eq!(recorded.query, prepared.query);
        assert_eq!(recorded.headers, expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_signed_calls_on_multi_thread_runtime() {
        let file = key_file();
        let d = Arc::new(dispatcher(
            Credentials::certificate(file.path(), PASSPHRASE),
            Environment::Production,
            RecordingTransport::responding("{}"),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let d = Arc::clone(&d);
                let params: RequestParameters =
                    [("orderId", format!("ord-{i}"))].into_iter().collect();
                tokio::spawn(async move {
                    d.execute_discard(RequestContext::new(HttpMethod::Post, "decline.do", params))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let recorded = d.transport().recorded();
        assert_eq!(recorded.len(), 8);
        for call in &recorded {
            let signature = call.headers.iter().find(|(k, _)| k == "X-Signature").unwrap();
            assert!(verify(&TEST_KEY.public_pem, call.query.as_bytes(), &signature.1).unwrap());
        }
    }

    #[test]
    fn test_protocol_name_comes_from_transport() {
        let d = dispatcher(
            Credentials::token("t"),
            Environment::Test,
            RecordingTransport::responding("{}"),
        );
        assert_eq!(d.protocol_name(), "recording");

        let http = Dispatcher::new(Credentials::token("t"), Environment::Test).unwrap();
        assert_eq!(http.protocol_name(), "http");
    }

    #[tokio::test]
    async fn test_credentials_merged_and_win() {
        let d = dispatcher(
            Credentials::login_password("merchant-api", "secret"),
            Environment::Test,
            RecordingTransport::responding("{}"),
        );
        let mut params = order_params();
        params.insert("userName", "spoofed");

        let ctx = RequestContext::new(HttpMethod::Get, "getOrderStatusExtended.do", params);
        d.execute_discard(ctx).await.unwrap();

        let recorded = d.transport().recorded().remove(0);
        assert_eq!(recorded.method, HttpMethod::Get);
        assert_eq!(
            recorded.url,
            "https://3dsec.berekebank.kz/payment/rest/getOrderStatusExtended.do"
        );
        assert_eq!(
            recorded.query,
            "amount=1050&orderNumber=ORD-1&password=secret&userName=merchant-api"
        );
        assert!(recorded.headers.is_empty());
    }

    #[tokio::test]
    async fn test_certificate_credentials_add_no_fields() {
        let d = dispatcher(
            Credentials::certificate("/unused.pem", "pp"),
            Environment::Test,
            RecordingTransport::responding(""),
        );
        d.execute_discard(RequestContext::new(HttpMethod::Post, "deposit.do", order_params()))
            .await
            .unwrap();
        assert_eq!(d.transport().recorded()[0].query, "amount=1050&orderNumber=ORD-1");
    }

    #[tokio::test]
    async fn test_key_load_failure_aborts_before_send() {
        let d = dispatcher(
            Credentials::certificate("/nonexistent/key.pem", PASSPHRASE),
            Environment::Production,
            RecordingTransport::responding("{}"),
        );
        let ctx = RequestContext::new(HttpMethod::Post, "refund.do", order_params());
        let err = d.execute::<Envelope>(ctx).await.unwrap_err();

        assert!(matches!(err, GatewayError::KeyLoad { .. }));
        assert!(d.transport().recorded().is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_decodes_to_default() {
        for body in ["", "  \n"] {
            let d = dispatcher(
                Credentials::token("t"),
                Environment::Test,
                RecordingTransport::responding(body),
            );
            let envelope: Envelope = d
                .execute(RequestContext::new(HttpMethod::Post, "decline.do", order_params()))
                .await
                .unwrap();
            assert_eq!(envelope, Envelope::default());
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let d = dispatcher(
            Credentials::token("t"),
            Environment::Test,
            RecordingTransport::responding("<html>502 Bad Gateway</html>"),
        );
        let ctx = RequestContext::new(HttpMethod::Post, "reverse.do", order_params());
        let err = d.execute::<Envelope>(ctx).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));

        // Discarding never decodes.
        d.execute_discard(RequestContext::new(HttpMethod::Post, "reverse.do", order_params()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let transport = RecordingTransport {
            delay: Some(Duration::from_secs(5)),
            ..RecordingTransport::responding("{}")
        };
        let d = dispatcher(Credentials::token("t"), Environment::Test, transport);

        let ctx = RequestContext::new(HttpMethod::Post, "register.do", order_params())
            .with_timeout(Some(Duration::from_millis(50)));
        let err = d.execute::<Envelope>(ctx).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::DeadlineExceeded(limit) if limit == Duration::from_millis(50)
        ));
    }

    #[test]
    fn test_base_url_override() {
        let d = Dispatcher::with_transport(
            Credentials::token("t"),
            Environment::Production,
            Some("http://127.0.0.1:9000/payment/rest"),
            KeyLoading::PerRequest,
            RecordingTransport::responding("{}"),
        )
        .unwrap();
        assert_eq!(d.base_url(), "http://127.0.0.1:9000/payment/rest");
        assert_eq!(
            d.endpoint_url("register.do"),
            "http://127.0.0.1:9000/payment/rest/register.do"
        );

        let err = Dispatcher::with_transport(
            Credentials::token("t"),
            Environment::Production,
            Some("ftp://gateway"),
            KeyLoading::PerRequest,
            RecordingTransport::responding("{}"),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfig(_)));
    }

    #[test]
    fn test_endpoint_url_joins_default_base() {
        let d = dispatcher(
            Credentials::token("t"),
            Environment::Production,
            RecordingTransport::responding("{}"),
        );
        assert_eq!(
            d.endpoint_url("register.do"),
            "https://securepayments.berekebank.kz/payment/rest/register.do"
        );
    }

    #[test]
    fn test_decode_body_direct() {
        let envelope: Envelope = decode_body(br#"{"errorCode":"5"}"#).unwrap();
        assert_eq!(envelope.error_code, "5");
        assert!(matches!(decode_body::<Envelope>(b"{"), Err(GatewayError::Decode(_))));
    }

    #[test]
    fn test_dispatcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher>();
    }
}
