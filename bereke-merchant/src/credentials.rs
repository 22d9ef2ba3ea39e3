//! Merchant credentials.
//!
//! A client authenticates in exactly one way for its whole lifetime:
//!
//! | Mode | Inline request fields | Signing |
//! |------|----------------------|---------|
//! | [`AuthMode::LoginPassword`] | `userName`, `password` | never |
//! | [`AuthMode::Token`] | `token` | never |
//! | [`AuthMode::Certificate`] | none | production only |
//!
//! Secrets are wiped from memory on drop and never appear in `Debug` output.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use zeroize::Zeroizing;

use crate::params::RequestParameters;

/// Wire name of the login field.
pub const USER_NAME_FIELD: &str = "userName";
/// Wire name of the password field.
pub const PASSWORD_FIELD: &str = "password";
/// Wire name of the token field.
pub const TOKEN_FIELD: &str = "token";

/// Authentication mode, derived from the credentials variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMode {
    /// Merchant login and password.
    LoginPassword,
    /// Opaque merchant token.
    Token,
    /// Client certificate (RSA private key in a passphrase-protected PEM).
    Certificate,
}

impl AuthMode {
    /// Returns the mode name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoginPassword => "login_password",
            Self::Token => "token",
            Self::Certificate => "certificate",
        }
    }
}

/// Merchant credentials.
#[derive(Clone)]
pub enum Credentials {
    /// Login and password, sent inline with every request.
    LoginPassword {
        /// Merchant API login.
        login: String,
        /// Merchant API password.
        password: Zeroizing<String>,
    },
    /// Token, sent inline with every request.
    Token {
        /// Merchant API token.
        token: Zeroizing<String>,
    },
    /// Certificate material used to sign production requests.
    Certificate {
        /// Path to the encrypted PEM private key.
        cert_path: PathBuf,
        /// Passphrase protecting the key.
        passphrase: Zeroizing<String>,
    },
}

impl Credentials {
    /// Creates login/password credentials.
    #[must_use]
    pub fn login_password(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self::LoginPassword { login: login.into(), password: Zeroizing::new(password.into()) }
    }

    /// Creates token credentials.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token { token: Zeroizing::new(token.into()) }
    }

    /// Creates certificate credentials.
    #[must_use]
    pub fn certificate(cert_path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self::Certificate {
            cert_path: cert_path.into(),
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }

    /// Returns the authentication mode.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        match self {
            Self::LoginPassword { .. } => AuthMode::LoginPassword,
            Self::Token { .. } => AuthMode::Token,
            Self::Certificate { .. } => AuthMode::Certificate,
        }
    }

    /// Returns the key path for certificate credentials.
    #[must_use]
    pub fn cert_path(&self) -> Option<&Path> {
        match self {
            Self::Certificate { cert_path, .. } => Some(cert_path),
            _ => None,
        }
    }

    /// Returns the fields this credential contributes to every request.
    ///
    /// Certificate credentials contribute none.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::LoginPassword { login, password } => {
                vec![(USER_NAME_FIELD, login.as_str()), (PASSWORD_FIELD, password.as_str())]
            }
            Self::Token { token } => vec![(TOKEN_FIELD, token.as_str())],
            Self::Certificate { .. } => Vec::new(),
        }
    }

    /// Writes the credential fields into `params`.
    ///
    /// A caller-supplied parameter with the same name is overwritten.
    pub fn merge_into(&self, params: &mut RequestParameters) {
        for (name, value) in self.fields() {
            params.insert(name, value);
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginPassword { login, .. } => f
                .debug_struct("LoginPassword")
                .field("login", login)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Token { .. } => f.debug_struct("Token").field("token", &"[REDACTED]").finish(),
            Self::Certificate { cert_path, .. } => f
                .debug_struct("Certificate")
                .field("cert_path", cert_path)
                .field("passphrase", &"[REDACTED]")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        assert_eq!(Credentials::login_password("m", "p").mode(), AuthMode::LoginPassword);
        assert_eq!(Credentials::token("t").mode(), AuthMode::Token);
        assert_eq!(Credentials::certificate("/k.pem", "s").mode(), AuthMode::Certificate);
    }

    #[test]
    fn test_login_password_fields() {
        let creds = Credentials::login_password("merchant-api", "secret");
        assert_eq!(creds.fields(), vec![("userName", "merchant-api"), ("password", "secret")]);
    }

    #[test]
    fn test_certificate_contributes_no_fields() {
        let creds = Credentials::certificate("/etc/bereke/key.pem", "pass");
        assert!(creds.fields().is_empty());
        assert_eq!(creds.cert_path(), Some(Path::new("/etc/bereke/key.pem")));

        let mut params = RequestParameters::new();
        creds.merge_into(&mut params);
        assert!(params.is_empty());
    }

    #[test]
    fn test_merge_into_credentials_win() {
        let mut params: RequestParameters =
            [("token", "from-caller"), ("orderId", "42")].into_iter().collect();
        Credentials::token("from-store").merge_into(&mut params);
        assert_eq!(params.get("token"), Some("from-store"));
        assert_eq!(params.get("orderId"), Some("42"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", Credentials::login_password("merchant", "hunter2"));
        assert!(debug.contains("merchant"));
        assert!(!debug.contains("hunter2"));

        let debug = format!("{:?}", Credentials::token("tok-123"));
        assert!(!debug.contains("tok-123"));

        let debug = format!("{:?}", Credentials::certificate("/k.pem", "pp-secret"));
        assert!(debug.contains("/k.pem"));
        assert!(!debug.contains("pp-secret"));
    }
}
