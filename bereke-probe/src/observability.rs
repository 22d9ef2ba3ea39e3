//! Logging setup and the probe report.

use std::io;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`: `json` selects JSON, anything else pretty.
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Installs the global subscriber.
///
/// Level filter comes from `RUST_LOG` (default `info`). Output goes to
/// stderr so stdout carries only the report.
pub fn init_observability(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Outcome of one probe step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Step succeeded.
    Pass,
    /// Step failed.
    Fail,
    /// Gateway answered with a business error.
    Warn,
}

impl CheckStatus {
    /// Returns the report value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Warn => "warn",
        }
    }
}

/// One probe step.
#[derive(Debug, Clone)]
pub struct ProbeCheck {
    /// Step name.
    pub name: &'static str,
    /// Step outcome.
    pub status: CheckStatus,
    /// Details.
    pub message: String,
}

impl ProbeCheck {
    /// Passing step.
    #[must_use]
    pub fn pass(name: &'static str, message: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, message: message.into() }
    }

    /// Step with a business-level warning.
    #[must_use]
    pub fn warn(name: &'static str, message: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Warn, message: message.into() }
    }

    /// Failed step.
    #[must_use]
    pub fn fail(name: &'static str, message: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, message: message.into() }
    }
}

/// Report printed on stdout.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Probe version.
    pub version: &'static str,
    /// Gateway environment, if the configuration was loaded.
    pub environment: Option<String>,
    /// Gateway base URL, if the configuration was loaded.
    pub base_url: Option<String>,
    /// Steps in execution order.
    pub checks: Vec<ProbeCheck>,
}

impl ProbeReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            environment: None,
            base_url: None,
            checks: Vec::new(),
        }
    }

    /// Worst step outcome; `Pass` for an empty report.
    #[must_use]
    pub fn status(&self) -> CheckStatus {
        if self.checks.iter().any(|c| c.status == CheckStatus::Fail) {
            CheckStatus::Fail
        } else if self.checks.iter().any(|c| c.status == CheckStatus::Warn) {
            CheckStatus::Warn
        } else {
            CheckStatus::Pass
        }
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::json!({
            "status": self.status().as_str(),
            "version": self.version,
            "environment": self.environment,
            "base_url": self.base_url,
            "checks": self.checks.iter().map(|c| serde_json::json!({
                "name": c.name,
                "status": c.status.as_str(),
                "message": c.message,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&json)
    }
}

impl Default for ProbeReport {
    fn default() -> Self {
        Self::new()
    }
}
