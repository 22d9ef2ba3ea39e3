//! Merchant client.

use std::{path::Path, time::Duration};

use serde::de::DeserializeOwned;

use crate::{
    config::GatewayConfig,
    credentials::Credentials,
    dispatch::{Dispatcher, RequestContext},
    environment::Environment,
    error::Result,
    orders::Operation,
    params::ToParameters,
    transport::{HttpTransport, Transport},
};

/// Entry point for gateway operations.
///
/// Holds exactly one authentication mode for its lifetime. Cheap to share:
/// wrap in an `Arc` and call from any number of tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use bereke_merchant::MerchantClient;
///
/// # fn example() -> bereke_merchant::Result<()> {
/// let client = MerchantClient::with_login("merchant-api", "secret", "test")?;
/// assert!(!client.dispatcher().signs_requests());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MerchantClient<T: Transport = HttpTransport> {
    dispatcher: Dispatcher<T>,
    call_timeout: Option<Duration>,
}

impl MerchantClient<HttpTransport> {
    /// Creates a client for the environment's default gateway.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(credentials: Credentials, environment: Environment) -> Result<Self> {
        Ok(Self::from_dispatcher(Dispatcher::new(credentials, environment)?))
    }

    /// Creates a login/password client.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidEnvironment`](crate::GatewayError::InvalidEnvironment)
    /// for unrecognized environment text.
    pub fn with_login(
        login: impl Into<String>,
        password: impl Into<String>,
        environment: &str,
    ) -> Result<Self> {
        Self::new(Credentials::login_password(login, password), environment.parse()?)
    }

    /// Creates a token client.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidEnvironment`](crate::GatewayError::InvalidEnvironment)
    /// for unrecognized environment text.
    pub fn with_token(token: impl Into<String>, environment: &str) -> Result<Self> {
        Self::new(Credentials::token(token), environment.parse()?)
    }

    /// Creates a certificate client.
    ///
    /// The key file is not read here. In production it is read when the
    /// first request is signed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidEnvironment`](crate::GatewayError::InvalidEnvironment)
    /// for unrecognized environment text.
    pub fn with_certificate(
        cert_path: impl AsRef<Path>,
        passphrase: impl Into<String>,
        environment: &str,
    ) -> Result<Self> {
        let credentials = Credentials::certificate(cert_path.as_ref(), passphrase);
        Self::new(credentials, environment.parse()?)
    }

    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns any configuration, environment or secret lookup error.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Ok(Self::from_dispatcher(Dispatcher::from_config(config)?))
    }

    /// Loads a TOML configuration file and creates a client from it.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(&GatewayConfig::from_file(path)?)
    }
}

impl<T: Transport> MerchantClient<T> {
    /// Wraps an existing dispatcher.
    #[must_use]
    pub const fn from_dispatcher(dispatcher: Dispatcher<T>) -> Self {
        Self { dispatcher, call_timeout: None }
    }

    /// Bounds every operation by `timeout`.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Returns the underlying dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// Returns the environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.dispatcher.environment()
    }

    /// Checks that the gateway host answers within three seconds.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unreachable`](crate::GatewayError::Unreachable)
    /// otherwise.
    pub async fn ping(&self) -> Result<()> {
        self.dispatcher.ping().await
    }

    pub(crate) async fn call<Req, Res>(&self, operation: Operation, request: &Req) -> Result<Res>
    where
        Req: ToParameters,
        Res: DeserializeOwned + Default,
    {
        let params = request.to_parameters()?;
        let ctx = RequestContext::new(operation.method(), operation.path(), params)
            .with_timeout(self.call_timeout);
        self.dispatcher.execute(ctx).await
    }
}
