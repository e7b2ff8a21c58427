//! Netfolio account API
//!
//! Serves registration, activation, login, password reset, and Google
//! federated login over Axum, backed by PostgreSQL.

mod config;
mod health;
mod logging;
mod openapi;

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Extension, Router};
use config::Config;
use health::health_handler;
use netfolio_api_auth::services::{
    AccountService, EmailMessage, EmailSender, Notifier, NotifyError, SmsSender, SmtpEmailSender,
    TokenService, TwilioSmsSender,
};
use netfolio_api_auth::{auth_router, users_router};
use netfolio_api_social::{social_router, GoogleAuthService};
use netfolio_db::{run_migrations, DbPool};
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        env = %config.app_env,
        "Starting netfolio API"
    );

    match config.validate_security_config() {
        Ok(warnings) => {
            for warning in &warnings {
                tracing::warn!(target: "security", "{}", warning);
            }
            if !warnings.is_empty() {
                tracing::warn!(
                    target: "security",
                    count = warnings.len(),
                    "Insecure default values detected (allowed in {} mode)",
                    config.app_env
                );
            }
        }
        Err(errors) => {
            for error in &errors {
                tracing::error!(target: "security", "{}", error);
            }
            eprintln!(
                "FATAL: {} insecure default(s) detected in production mode. \
                 Set proper secrets or use APP_ENV=development.",
                errors.len()
            );
            std::process::exit(1);
        }
    }

    // Create database connection pool
    let pool = match DbPool::connect(&config.database_url).await {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        eprintln!("Failed to run database migrations: {e}");
        std::process::exit(1);
    }
    info!("Database migrations applied");

    let tokens = Arc::new(TokenService::new(
        config.jwt_secret.as_bytes().to_vec(),
        config.jwt_issuer.clone(),
    ));

    let email: Arc<dyn EmailSender> = match &config.smtp {
        Some(smtp) => {
            match SmtpEmailSender::new(
                &smtp.host,
                smtp.username.clone(),
                smtp.password.clone(),
                &smtp.from,
            ) {
                Ok(sender) => Arc::new(sender),
                Err(e) => {
                    eprintln!("Failed to configure SMTP transport: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => Arc::new(DisabledEmailSender),
    };

    let sms: Arc<dyn SmsSender> = match &config.twilio {
        Some(twilio) => Arc::new(TwilioSmsSender::new(
            twilio.account_sid.clone(),
            twilio.auth_token.clone(),
            twilio.from_number.clone(),
        )),
        None => Arc::new(DisabledSmsSender),
    };

    let notifier = Notifier::new(email, sms, config.frontend_url.clone());
    let accounts = Arc::new(AccountService::new(
        pool.inner().clone(),
        Arc::clone(&tokens),
        notifier,
    ));

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api-docs/openapi.json", get(openapi::openapi_handler))
        .merge(users_router())
        .merge(auth_router());

    // Federated login mounts only when a Google client ID is configured.
    let app = match &config.google_client_id {
        Some(client_id) => {
            let google = Arc::new(GoogleAuthService::new(
                pool.inner().clone(),
                Arc::clone(&tokens),
                client_id.clone(),
            ));
            app.merge(social_router()).layer(Extension(google))
        }
        None => {
            tracing::warn!("GOOGLE_CLIENT_ID not set; federated login disabled");
            app
        }
    };

    let app = app
        .layer(Extension(accounts))
        .layer(Extension(tokens))
        .layer(build_cors_layer(&config.cors_origins));

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    info!(addr = %addr, "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Shutdown complete");
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Logs and drops outbound email when no SMTP relay is configured.
struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        tracing::warn!(
            to = %message.to,
            subject = %message.subject,
            "SMTP not configured; dropping email"
        );
        Ok(())
    }
}

/// Logs and drops outbound SMS when Twilio is not configured.
struct DisabledSmsSender;

#[async_trait]
impl SmsSender for DisabledSmsSender {
    async fn send(&self, to: &str, _body: &str) -> Result<(), NotifyError> {
        tracing::warn!(to = %to, "Twilio not configured; dropping SMS");
        Ok(())
    }
}
