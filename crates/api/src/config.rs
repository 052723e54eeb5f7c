//! Runtime configuration, read from the environment once at startup.
//!
//! | variable | required | default | meaning |
//! |---|---|---|---|
//! | `CARTWHEEL_TOKEN_SECRET` | yes | none | session token signing key, min 32 chars |
//! | `CARTWHEEL_HOST` | no | `127.0.0.1` | bind address |
//! | `CARTWHEEL_PORT` | no | `8000` | listen port |
//! | `CARTWHEEL_ALLOWED_ORIGIN` | no | any | CORS origin |
//! | `CARTWHEEL_MODE` | no | `development` | `production`, `development`, or `test` |
//! | `SENTRY_DSN` | no | none | error tracking |
//!
//! The signing secret is vetted on load: obvious placeholders and
//! low-entropy strings are rejected outright, since a guessable key makes
//! every session token forgeable.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS: f64 = 3.3;

/// Markers that show up in secrets nobody generated (case-insensitive).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("{key} is not a usable signing secret: {reason}")]
    WeakSecret { key: &'static str, reason: String },
}

/// Operating mode of the process.
///
/// Admission control is bypassed outside production so local development
/// and test runs are never throttled. That bypass is deliberate, not a
/// missing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    Production,
    #[default]
    Development,
    Test,
}

impl OperatingMode {
    /// Whether admission control should actually throttle.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::str::FromStr for OperatingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Session token signing secret.
    pub token_secret: SecretString,
    /// Allowed CORS origin; `None` allows any origin.
    pub allowed_origin: Option<String>,
    /// Operating mode, gates admission control.
    pub mode: OperatingMode,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    /// Read the configuration from the environment, consulting a `.env`
    /// file first when one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is missing or unparseable, or
    /// when the signing secret fails vetting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: parse_var("CARTWHEEL_HOST", "127.0.0.1")?,
            port: parse_var("CARTWHEEL_PORT", "8000")?,
            token_secret: signing_secret("CARTWHEEL_TOKEN_SECRET")?,
            allowed_origin: std::env::var("CARTWHEEL_ALLOWED_ORIGIN").ok(),
            mode: parse_var("CARTWHEEL_MODE", "development")?,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// The address the server binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse a variable, substituting `default` when it is unset.
fn parse_var<T>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_owned())
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

/// Load the signing secret, vetting it before it is wrapped.
fn signing_secret(key: &'static str) -> Result<SecretString, ConfigError> {
    let value = std::env::var(key).map_err(|_| ConfigError::Missing(key))?;
    match vet_signing_secret(&value) {
        Ok(()) => Ok(SecretString::from(value)),
        Err(reason) => Err(ConfigError::WeakSecret { key, reason }),
    }
}

/// Reject secrets that were clearly never generated: too short, carrying a
/// well-known placeholder marker, or with too little per-character
/// variation to be random.
fn vet_signing_secret(value: &str) -> Result<(), String> {
    if value.len() < MIN_SECRET_LENGTH {
        return Err(format!(
            "shorter than {MIN_SECRET_LENGTH} characters ({} given)",
            value.len()
        ));
    }

    let lowered = value.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lowered.contains(**m)) {
        return Err(format!("contains the placeholder marker '{marker}'"));
    }

    let bits = entropy_per_char(value);
    if bits < MIN_ENTROPY_BITS {
        return Err(format!(
            "entropy is {bits:.2} bits/char, below {MIN_ENTROPY_BITS}; generate it randomly"
        ));
    }

    Ok(())
}

/// Shannon entropy of the character distribution, in bits per character.
fn entropy_per_char(s: &str) -> f64 {
    let mut histogram: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *histogram.entry(c).or_default() += 1;
        total = total.saturating_add(1);
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    histogram
        .values()
        .map(|&count| {
            let p = f64::from(count) / total;
            -(p * p.log2())
        })
        .sum()
}
