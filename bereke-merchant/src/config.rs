//! Gateway client configuration.
//!
//! A client is described by a small TOML document. Secrets never live in the
//! file itself: the `auth` table names the environment variables that hold
//! them.
//!
//! ```toml
//! environment = "production"
//! signing_key_loading = "cached"
//!
//! [auth]
//! type = "certificate"
//! cert_path = "/etc/bereke/merchant.pem"
//! passphrase_env = "BEREKE_KEY_PASSPHRASE"
//!
//! [http]
//! timeout_secs = 20
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use url::Url;

use crate::{
    credentials::Credentials,
    environment::Environment,
    error::{GatewayError, Result},
    signing::KeyLoading,
    transport::HttpConfig,
};

/// Root gateway configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// `test` or `production`.
    pub environment: String,

    /// Overrides the environment's default base URL (e.g. a local stub).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Private key loading strategy for certificate credentials.
    #[serde(default)]
    pub signing_key_loading: KeyLoading,

    /// How the client authenticates.
    pub auth: AuthConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl GatewayConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] for syntax errors or invalid
    /// values, and [`GatewayError::InvalidEnvironment`] for an unknown
    /// environment name.
    ///
    /// # Examples
    ///
    /// ```
    /// use bereke_merchant::config::GatewayConfig;
    ///
    /// let config = GatewayConfig::from_toml(
    ///     r#"
    ///     environment = "test"
    ///
    ///     [auth]
    ///     type = "token"
    ///     token_env = "BEREKE_TOKEN"
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.base_url().unwrap(), "https://3dsec.berekebank.kz/payment/rest/");
    /// ```
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml)
            .map_err(|e| GatewayError::InvalidConfig(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the file cannot be read,
    /// plus everything [`GatewayConfig::from_toml`] returns.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            GatewayError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.environment()?;
        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url)?;
        }
        self.auth.validate()?;
        self.http.validate()
    }

    /// Parses the configured environment.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidEnvironment`] for unknown names.
    pub fn environment(&self) -> Result<Environment> {
        self.environment.parse()
    }

    /// Returns the base URL: the override if set, otherwise the environment default.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidEnvironment`] for unknown names.
    pub fn base_url(&self) -> Result<String> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Ok(self.environment()?.base_url().to_owned()),
        }
    }

    /// Resolves credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if a referenced variable is unset.
    pub fn credentials(&self) -> Result<Credentials> {
        self.auth.resolve_with(|name| std::env::var(name).ok())
    }
}

/// Validates a base URL override: absolute, with an http(s) scheme and a host.
pub(crate) fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url).map_err(|e| {
        GatewayError::InvalidConfig(format!("invalid base_url '{base_url}': {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::InvalidConfig(format!(
            "base_url must use http or https, got: {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(GatewayError::InvalidConfig(format!("base_url has no host: {base_url}")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(GatewayError::InvalidConfig(format!(
            "base_url must not carry a query or fragment: {base_url}"
        )));
    }

    Ok(())
}

/// Authentication configuration.
///
/// Every secret is referenced by environment variable name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Merchant login and password.
    LoginPassword {
        /// Merchant API login.
        login: String,
        /// Environment variable containing the password.
        password_env: String,
    },
    /// Merchant token.
    Token {
        /// Environment variable containing the token.
        token_env: String,
    },
    /// Client certificate.
    Certificate {
        /// Path to the encrypted PEM private key.
        cert_path: PathBuf,
        /// Environment variable containing the key passphrase.
        passphrase_env: String,
    },
}

impl AuthConfig {
    /// Validates the auth section.
    ///
    /// Checks that environment variable names are alphanumeric with
    /// underscores, the login is present, and the certificate path is set.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if any value is invalid.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::LoginPassword { login, password_env } => {
                if login.trim().is_empty() {
                    return Err(GatewayError::InvalidConfig("login cannot be empty".to_owned()));
                }
                validate_env_var_name(password_env)
            }
            Self::Token { token_env } => validate_env_var_name(token_env),
            Self::Certificate { cert_path, passphrase_env } => {
                if cert_path.as_os_str().is_empty() {
                    return Err(GatewayError::InvalidConfig(
                        "cert_path cannot be empty".to_owned(),
                    ));
                }
                validate_env_var_name(passphrase_env)
            }
        }
    }

    /// Resolves credentials, looking secrets up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if `lookup` finds nothing for a
    /// referenced variable.
    pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        let secret = |name: &str| {
            lookup(name).ok_or_else(|| {
                GatewayError::InvalidConfig(format!("environment variable {name} is not set"))
            })
        };

        Ok(match self {
            Self::LoginPassword { login, password_env } => {
                Credentials::login_password(login.clone(), secret(password_env)?)
            }
            Self::Token { token_env } => Credentials::token(secret(token_env)?),
            Self::Certificate { cert_path, passphrase_env } => {
                Credentials::certificate(cert_path.clone(), secret(passphrase_env)?)
            }
        })
    }
}

/// Validates an environment variable name.
fn validate_env_var_name(name: &str) -> Result<()> {
    let Some(first_char) = name.chars().next() else {
        return Err(GatewayError::InvalidConfig(
            "environment variable name cannot be empty".to_owned(),
        ));
    };

    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(GatewayError::InvalidConfig(format!(
            "environment variable name must start with letter or underscore: {name}"
        )));
    }

    if let Some(ch) = name.chars().find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(GatewayError::InvalidConfig(format!(
            "environment variable name contains invalid character '{ch}': {name}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::credentials::AuthMode;

    const LOGIN_TOML: &str = r#"
        environment = "test"

        [auth]
        type = "login_password"
        login = "merchant-api"
        password_env = "BEREKE_PASSWORD"
    "#;

    #[test]
    fn test_login_config_defaults() {
        let config = GatewayConfig::from_toml(LOGIN_TOML).unwrap();
        assert_eq!(config.environment().unwrap(), Environment::Test);
        assert_eq!(config.base_url().unwrap(), Environment::Test.base_url());
        assert_eq!(config.signing_key_loading, KeyLoading::PerRequest);
        assert_eq!(config.http, HttpConfig::default());
        assert_eq!(
            config.auth,
            AuthConfig::LoginPassword {
                login: "merchant-api".to_owned(),
                password_env: "BEREKE_PASSWORD".to_owned(),
            }
        );
    }

    #[test]
    fn test_certificate_config_full() {
        let config = GatewayConfig::from_toml(
            r#"
            environment = "production"
            base_url = "http://127.0.0.1:8080/payment/rest/"
            signing_key_loading = "cached"

            [auth]
            type = "certificate"
            cert_path = "/etc/bereke/merchant.pem"
            passphrase_env = "BEREKE_KEY_PASSPHRASE"

            [http]
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.environment().unwrap(), Environment::Production);
        assert_eq!(config.base_url().unwrap(), "http://127.0.0.1:8080/payment/rest/");
        assert_eq!(config.signing_key_loading, KeyLoading::Cached);
        assert_eq!(config.http.timeout_secs, 5);
    }

    #[test]
    fn test_unknown_environment() {
        let toml = LOGIN_TOML.replace("\"test\"", "\"STAGING\"");
        let err = GatewayConfig::from_toml(&toml).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidEnvironment(ref s) if s == "STAGING"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = GatewayConfig::from_toml("environment = ").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_auth_type() {
        let err = GatewayConfig::from_toml(
            r#"
            environment = "test"
            [auth]
            type = "oauth2"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfig(_)));
    }

    #[test]
    fn test_base_url_validation() {
        assert!(validate_base_url("https://securepayments.berekebank.kz/payment/rest/").is_ok());
        assert!(validate_base_url("http://localhost:3000/").is_ok());
        assert!(validate_base_url("ftp://example.com/").is_err());
        assert!(validate_base_url("not a url").is_err());
        assert!(validate_base_url("https://example.com/?x=1").is_err());
    }

    #[test]
    fn test_env_var_name_validation() {
        assert!(validate_env_var_name("BEREKE_TOKEN").is_ok());
        assert!(validate_env_var_name("_TOKEN2").is_ok());
        assert!(validate_env_var_name("").is_err());
        assert!(validate_env_var_name("1TOKEN").is_err());
        assert!(validate_env_var_name("TOKEN;rm").is_err());
    }

    #[test]
    fn test_auth_validate_empty_login() {
        let auth = AuthConfig::LoginPassword {
            login: "  ".to_owned(),
            password_env: "BEREKE_PASSWORD".to_owned(),
        };
        assert!(matches!(auth.validate(), Err(GatewayError::InvalidConfig(_))));
    }

    #[test]
    fn test_resolve_with_lookup() {
        let secrets = HashMap::from([("BEREKE_TOKEN", "tok-1"), ("BEREKE_PASSWORD", "pw")]);
        let lookup = |name: &str| secrets.get(name).map(|v| (*v).to_owned());

        let token = AuthConfig::Token { token_env: "BEREKE_TOKEN".to_owned() };
        let creds = token.resolve_with(lookup).unwrap();
        assert_eq!(creds.mode(), AuthMode::Token);
        assert_eq!(creds.fields(), vec![("token", "tok-1")]);

        let cert = AuthConfig::Certificate {
            cert_path: PathBuf::from("/k.pem"),
            passphrase_env: "MISSING".to_owned(),
        };
        let err = cert.resolve_with(lookup).unwrap_err();
        assert!(err.to_string().contains("MISSING"));
    }
}
