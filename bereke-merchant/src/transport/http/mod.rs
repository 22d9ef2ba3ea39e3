//! HTTP transport implementation over reqwest.

use std::time::Duration;

use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE},
};
use tracing::{debug, instrument};
use url::Url;

use super::{
    ACCEPT_VALUE, FORM_CONTENT_TYPE, HttpConfig, HttpMethod, Transport, TransportRequest,
    TransportResponse, sealed,
};
use crate::error::{GatewayError, Result};

/// Validates header name and value for CRLF injection prevention.
fn validate_header(name: &str, value: &str) -> Result<()> {
    let has_control = |s: &str| s.contains(['\r', '\n', '\0']);
    if has_control(name) {
        return Err(GatewayError::InvalidInput(
            "invalid header name: control characters not allowed".to_owned(),
        ));
    }
    if has_control(value) {
        return Err(GatewayError::InvalidInput(format!(
            "invalid value for header {name}: control characters not allowed"
        )));
    }
    Ok(())
}

/// Builds the request URL, attaching the pre-encoded query verbatim.
fn build_url(endpoint: &str, query: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| {
        GatewayError::InvalidConfig(format!("invalid endpoint URL '{endpoint}': {e}"))
    })?;
    if !query.is_empty() {
        url.set_query(Some(query));
    }
    Ok(url)
}

/// Gateway transport using reqwest.
///
/// Connection pooling and keep-alive come from the underlying client.
///
/// # Examples
///
/// ```
/// use bereke_merchant::transport::{HttpConfig, HttpTransport};
///
/// let config = HttpConfig { timeout_secs: 15, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a transport with [`HttpConfig::default`] settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates a transport with custom settings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] for out-of-range values and
    /// [`GatewayError::Transport`] if the HTTP client cannot be created.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(
        skip(self, request),
        fields(method = %request.method, url = request.url, query_len = request.query.len())
    )]
    async fn send<'a>(&'a self, request: TransportRequest<'a>) -> Result<TransportResponse> {
        for (name, value) in &request.headers {
            validate_header(name, value)?;
        }

        let url = build_url(request.url, request.query)?;

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        builder = builder.header(ACCEPT, ACCEPT_VALUE).header(CONTENT_TYPE, FORM_CONTENT_TYPE);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(status, body_len = body.len(), "gateway responded");
        Ok(TransportResponse { status, body })
    }

    #[instrument(skip(self))]
    async fn probe<'a>(&'a self, url: &'a str, timeout: Duration) -> Result<()> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| GatewayError::Unreachable { url: url.to_owned(), source })?;

        debug!(status = response.status().as_u16(), "gateway reachable");
        Ok(())
    }

    fn protocol_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_new() {
        let transport = HttpTransport::new().unwrap();
        assert_eq!(transport.protocol_name(), "http");
    }

    #[test]
    fn test_http_transport_rejects_invalid_config() {
        let config = HttpConfig { timeout_secs: 0, ..HttpConfig::default() };
        assert!(matches!(HttpTransport::with_config(&config), Err(GatewayError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_header_rejects_crlf() {
        assert!(validate_header("X-Hash", "abc=").is_ok());
        assert!(validate_header("X-Hash", "abc\r\nX-Evil: 1").is_err());
        assert!(validate_header("X-\nHash", "abc").is_err());
        assert!(validate_header("X-Hash", "a\0b").is_err());
    }

    #[test]
    fn test_build_url_keeps_query_verbatim() {
        let url = build_url(
            "https://3dsec.berekebank.kz/payment/rest/register.do",
            "description=Order+%231&orderNumber=ORD-1",
        )
        .unwrap();
        assert_eq!(url.path(), "/payment/rest/register.do");
        assert_eq!(url.query(), Some("description=Order+%231&orderNumber=ORD-1"));
    }

    #[test]
    fn test_build_url_without_query() {
        let url = build_url("https://3dsec.berekebank.kz/payment/rest/", "").unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_build_url_invalid() {
        assert!(matches!(build_url("not a url", ""), Err(GatewayError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new().unwrap();
        let url = format!("http://{addr}/");
        let err = transport.probe(&url, Duration::from_secs(3)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unreachable { .. }));
        assert!(err.to_string().contains("server is unreachable"));
    }
}
