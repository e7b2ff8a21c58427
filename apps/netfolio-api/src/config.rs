//! Application configuration loaded from environment variables.
//!
//! Fail-fast: required variables must be present and valid or the process
//! exits with a clear error before binding the listener. Insecure defaults
//! are tolerated (with warnings) in development and refused in production.

use std::env;
use thiserror::Error;

/// Default JWT_SECRET, acceptable only in development mode.
pub const INSECURE_JWT_SECRET: &str = "development-jwt-secret-change-in-production";

/// Application environment mode.
///
/// - `Development`: insecure defaults are allowed with WARN-level logging.
/// - `Production`: insecure defaults cause the application to refuse startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Parse from the `APP_ENV` environment variable value.
    /// Defaults to `Development` if unset or unrecognized.
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => {
                tracing::warn!(
                    value = other,
                    "Unrecognized APP_ENV value, defaulting to Development"
                );
                Self::Development
            }
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// SMTP relay settings. Absent as a whole when email delivery is disabled.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `"Netfolio <no-reply@netfolio.app>"`.
    pub from: String,
}

/// Twilio credentials. Absent as a whole when SMS delivery is disabled.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// E.164 sender number.
    pub from_number: String,
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Application environment (development or production).
    pub app_env: AppEnvironment,

    /// PostgreSQL connection string
    pub database_url: String,

    /// HS256 secret for signing session, activation, and reset tokens
    pub jwt_secret: String,

    /// Issuer claim stamped into every token
    pub jwt_issuer: String,

    /// Frontend URL embedded in activation and reset links
    pub frontend_url: String,

    /// Google OAuth client ID; federated login is disabled when unset
    pub google_client_id: Option<String>,

    /// SMTP relay; lifecycle emails are dropped (with a log) when unset
    pub smtp: Option<SmtpConfig>,

    /// Twilio credentials; welcome SMS is dropped (with a log) when unset
    pub twilio: Option<TwilioConfig>,

    /// Tracing filter directive (e.g., "info,netfolio=debug")
    pub rust_log: String,

    /// Allowed CORS origins (comma-separated URLs or "*" for development)
    pub cors_origins: Vec<String>,

    /// Server bind address
    pub host: String,

    /// Server listen port
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_env", &self.app_env)
            .field("database_url", &"[redacted]")
            .field("jwt_secret", &"[redacted]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("frontend_url", &self.frontend_url)
            .field("google_client_id", &self.google_client_id)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DATABASE_URL` is missing, the port is
    /// invalid, or a dependent variable group (SMTP, Twilio) is only
    /// partially set.
    ///
    /// # Required Variables
    ///
    /// - `DATABASE_URL` - PostgreSQL connection string
    ///
    /// # Optional Variables
    ///
    /// - `JWT_SECRET` - Token signing secret (insecure default in development)
    /// - `JWT_ISSUER` - Token issuer claim (default: "netfolio")
    /// - `FRONTEND_URL` - Link base for emails (default: "http://localhost:3000")
    /// - `GOOGLE_CLIENT_ID` - Enables `POST /api/auth/google` when set
    /// - `SMTP_HOST` / `SMTP_USERNAME` / `SMTP_PASSWORD` / `EMAIL_FROM` - all or none
    /// - `TWILIO_ACCOUNT_SID` / `TWILIO_AUTH_TOKEN` / `TWILIO_PHONE_NUMBER` - all or none
    /// - `RUST_LOG` - Log level filter (default: "info")
    /// - `CORS_ORIGINS` - Comma-separated allowed origins (default: "*")
    /// - `HOST` - Bind address (default: "0.0.0.0")
    /// - `PORT` - Listen port (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        let app_env = AppEnvironment::from_env_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| INSECURE_JWT_SECRET.to_string());
        let jwt_issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "netfolio".to_string());

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let google_client_id = env::var("GOOGLE_CLIENT_ID").ok().filter(|s| !s.is_empty());

        let smtp = group_config(
            "SMTP",
            &["SMTP_HOST", "SMTP_USERNAME", "SMTP_PASSWORD", "EMAIL_FROM"],
        )?
        .map(|mut vars| SmtpConfig {
            from: vars.pop().unwrap_or_default(),
            password: vars.pop().unwrap_or_default(),
            username: vars.pop().unwrap_or_default(),
            host: vars.pop().unwrap_or_default(),
        });

        let twilio = group_config(
            "TWILIO",
            &[
                "TWILIO_ACCOUNT_SID",
                "TWILIO_AUTH_TOKEN",
                "TWILIO_PHONE_NUMBER",
            ],
        )?
        .map(|mut vars| TwilioConfig {
            from_number: vars.pop().unwrap_or_default(),
            auth_token: vars.pop().unwrap_or_default(),
            account_sid: vars.pop().unwrap_or_default(),
        });

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);
        validate_cors_origins(&cors_origins, &app_env)?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        Ok(Config {
            app_env,
            database_url,
            jwt_secret,
            jwt_issuer,
            frontend_url,
            google_client_id,
            smtp,
            twilio,
            rust_log,
            cors_origins,
            host,
            port,
        })
    }

    /// Get the server bind address as a socket address string.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate security configuration based on the application environment.
    ///
    /// In **production** mode: returns `Err(errors)` listing all insecure
    /// defaults found. In **development** mode: returns `Ok(warnings)`.
    pub fn validate_security_config(&self) -> Result<Vec<String>, Vec<String>> {
        let mut issues = Vec::new();

        if self.jwt_secret == INSECURE_JWT_SECRET {
            issues.push("JWT_SECRET is using the default insecure value".to_string());
        }

        if self.cors_origins.iter().any(|o| o == "*") {
            issues.push(
                "CORS_ORIGINS contains wildcard '*' which is not allowed in production".to_string(),
            );
        }

        if self.smtp.is_none() {
            issues.push(
                "SMTP is not configured; activation and reset emails will be dropped".to_string(),
            );
        }

        if issues.is_empty() {
            return Ok(Vec::new());
        }

        if self.app_env.is_production() {
            Err(issues)
        } else {
            Ok(issues)
        }
    }
}

/// Read an all-or-nothing group of environment variables.
///
/// Returns `Ok(None)` when every variable is unset, `Ok(Some(values))` (in
/// the order requested) when every variable is set, and `InvalidValue` when
/// the group is only partially set.
fn group_config(group: &str, vars: &[&str]) -> Result<Option<Vec<String>>, ConfigError> {
    let values: Vec<Option<String>> = vars
        .iter()
        .map(|v| env::var(v).ok().filter(|s| !s.is_empty()))
        .collect();

    if values.iter().all(Option::is_none) {
        return Ok(None);
    }
    if let Some(missing) = values.iter().position(Option::is_none) {
        return Err(ConfigError::InvalidValue {
            var: vars[missing].to_string(),
            message: format!("{group} is partially configured; set all of {vars:?} or none"),
        });
    }

    Ok(Some(values.into_iter().flatten().collect()))
}

/// Validate CORS origin URL formats at startup.
///
/// In production mode, invalid URLs cause a startup error. In development
/// mode they produce a warning. The wildcard "*" origin is allowed through
/// (but rejected separately by `validate_security_config`).
fn validate_cors_origins(origins: &[String], app_env: &AppEnvironment) -> Result<(), ConfigError> {
    for origin in origins {
        if origin == "*" {
            continue;
        }

        let is_valid = origin.starts_with("http://") || origin.starts_with("https://");
        if !is_valid {
            let msg = format!(
                "CORS origin '{origin}' is not a valid URL (must start with http:// or https://)"
            );
            if app_env.is_production() {
                return Err(ConfigError::InvalidValue {
                    var: "CORS_ORIGINS".to_string(),
                    message: msg,
                });
            }
            tracing::warn!(target: "security", origin = %origin, "{}", msg);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config_secure() -> Config {
        Config {
            app_env: AppEnvironment::Production,
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: "long-random-secret-from-the-vault".to_string(),
            jwt_issuer: "netfolio".to_string(),
            frontend_url: "https://app.netfolio.example".to_string(),
            google_client_id: Some("client-id.apps.googleusercontent.com".to_string()),
            smtp: Some(SmtpConfig {
                host: "smtp.example.com".to_string(),
                username: "mailer".to_string(),
                password: "hunter2".to_string(),
                from: "Netfolio <no-reply@netfolio.example>".to_string(),
            }),
            twilio: None,
            rust_log: "info".to_string(),
            cors_origins: vec!["https://app.netfolio.example".to_string()],
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVar("DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: DATABASE_URL"
        );

        let err = ConfigError::InvalidValue {
            var: "PORT".to_string(),
            message: "Must be a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for PORT: Must be a number");
    }

    #[test]
    fn test_bind_addr() {
        let mut config = test_config_secure();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_app_environment_parse() {
        assert_eq!(
            AppEnvironment::from_env_str("production"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("prod"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("PRODUCTION"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("development"),
            AppEnvironment::Development
        );
        assert_eq!(
            AppEnvironment::from_env_str("dev"),
            AppEnvironment::Development
        );
    }

    #[test]
    fn test_app_environment_unrecognized_defaults_to_development() {
        assert_eq!(
            AppEnvironment::from_env_str("staging"),
            AppEnvironment::Development
        );
        assert_eq!(AppEnvironment::from_env_str(""), AppEnvironment::Development);
    }

    #[test]
    fn test_app_environment_display() {
        assert_eq!(AppEnvironment::Development.to_string(), "development");
        assert_eq!(AppEnvironment::Production.to_string(), "production");
    }

    #[test]
    fn test_production_rejects_default_jwt_secret() {
        let mut config = test_config_secure();
        config.jwt_secret = INSECURE_JWT_SECRET.to_string();

        let result = config.validate_security_config();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.contains("JWT_SECRET")));
    }

    #[test]
    fn test_production_rejects_cors_wildcard() {
        let mut config = test_config_secure();
        config.cors_origins = vec!["*".to_string()];

        let result = config.validate_security_config();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.contains("CORS_ORIGINS")));
    }

    #[test]
    fn test_production_rejects_missing_smtp() {
        let mut config = test_config_secure();
        config.smtp = None;

        let result = config.validate_security_config();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.iter().any(|e| e.contains("SMTP")));
    }

    #[test]
    fn test_development_allows_insecure_defaults_with_warnings() {
        let mut config = test_config_secure();
        config.app_env = AppEnvironment::Development;
        config.jwt_secret = INSECURE_JWT_SECRET.to_string();
        config.cors_origins = vec!["*".to_string()];
        config.smtp = None;

        let result = config.validate_security_config();
        assert!(result.is_ok());
        let warnings = result.unwrap();
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn test_production_passes_with_secure_config() {
        let config = test_config_secure();

        let result = config.validate_security_config();
        assert!(result.is_ok());
        assert!(result.unwrap().is_empty());
    }

    // All group_config scenarios share one test (and private var names) to
    // avoid env races when tests run in parallel.
    #[test]
    fn test_group_config_from_env() {
        std::env::remove_var("NF_GROUP_TEST_A");
        std::env::remove_var("NF_GROUP_TEST_B");
        let vars = ["NF_GROUP_TEST_A", "NF_GROUP_TEST_B"];

        assert!(group_config("NF_GROUP_TEST", &vars).unwrap().is_none());

        std::env::set_var("NF_GROUP_TEST_A", "alpha");
        let err = group_config("NF_GROUP_TEST", &vars).unwrap_err();
        assert!(err.to_string().contains("NF_GROUP_TEST_B"));
        assert!(err.to_string().contains("partially configured"));

        std::env::set_var("NF_GROUP_TEST_B", "beta");
        let values = group_config("NF_GROUP_TEST", &vars).unwrap().unwrap();
        assert_eq!(values, vec!["alpha".to_string(), "beta".to_string()]);

        std::env::remove_var("NF_GROUP_TEST_A");
        std::env::remove_var("NF_GROUP_TEST_B");
    }

    #[test]
    fn test_cors_valid_origins_pass() {
        let origins = vec![
            "https://app.netfolio.example".to_string(),
            "http://localhost:3000".to_string(),
        ];
        assert!(validate_cors_origins(&origins, &AppEnvironment::Production).is_ok());
    }

    #[test]
    fn test_cors_wildcard_passes_format_validation() {
        let origins = vec!["*".to_string()];
        assert!(validate_cors_origins(&origins, &AppEnvironment::Production).is_ok());
    }

    #[test]
    fn test_cors_invalid_origin_rejected_in_production() {
        let origins = vec!["not-a-url".to_string()];
        let result = validate_cors_origins(&origins, &AppEnvironment::Production);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a valid URL"));
    }

    #[test]
    fn test_cors_invalid_origin_warns_in_development() {
        let origins = vec!["not-a-url".to_string()];
        assert!(validate_cors_origins(&origins, &AppEnvironment::Development).is_ok());
    }
}
