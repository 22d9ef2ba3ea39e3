//! Gateway environments.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Base URL of the test (sandbox) gateway.
pub const TEST_BASE_URL: &str = "https://3dsec.berekebank.kz/payment/rest/";

/// Base URL of the production gateway.
pub const PRODUCTION_BASE_URL: &str = "https://securepayments.berekebank.kz/payment/rest/";

/// Gateway environment.
///
/// Selects the default base URL and whether certificate credentials must
/// sign their requests (production only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Sandbox gateway.
    Test,
    /// Live gateway.
    Production,
}

impl Environment {
    /// Returns the default base URL for this environment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Test => TEST_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = GatewayError;

    /// Parses `test` or `production` (also `prod`), ignoring case and
    /// surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(GatewayError::InvalidEnvironment(s.to_owned())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_environments() {
        assert_eq!("test".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Test);
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" Prod ".parse::<Environment>().unwrap(), Environment::Production);
    }

    #[test]
    fn test_parse_unknown_environment() {
        let err = "STAGING".parse::<Environment>().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidEnvironment(ref s) if s == "STAGING"));
        assert!("".parse::<Environment>().is_err());
    }

    #[test]
    fn test_base_urls() {
        assert_eq!(Environment::Test.base_url(), "https://3dsec.berekebank.kz/payment/rest/");
        assert_eq!(
            Environment::Production.base_url(),
            "https://securepayments.berekebank.kz/payment/rest/"
        );
    }

    #[test]
    fn test_display_round_trips() {
        for env in [Environment::Test, Environment::Production] {
            assert_eq!(env.to_string().parse::<Environment>().unwrap(), env);
        }
    }
}
