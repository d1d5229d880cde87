use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tripway_api::{app, state::{AppState, AuthConfig}};
use tripway_core::notify::{EmailSender, LogNotifier, SmsSender};
use tripway_store::app_config::NotificationConfig;
use tripway_store::{
    DbClient, MySqlBookingRepository, MySqlDestinationRepository, MySqlHotelRepository,
    MySqlPackageRepository, MySqlUserRepository, RedisClient, SendGridClient, TwilioClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripway_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = tripway_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting Tripway API on port {}", config.server.port);

    // MySQL Connection
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to MySQL")?;
    db.migrate().await.context("Failed to run migrations")?;

    // Redis Connection
    let redis = RedisClient::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    let (email, sms) = notifiers(&config.notifications).context("Failed to set up notifiers")?;

    let app_state = AppState {
        users: Arc::new(MySqlUserRepository::new(db.pool.clone())),
        bookings: Arc::new(MySqlBookingRepository::new(db.pool.clone())),
        hotels: Arc::new(MySqlHotelRepository::new(db.pool.clone())),
        destinations: Arc::new(MySqlDestinationRepository::new(db.pool.clone())),
        packages: Arc::new(MySqlPackageRepository::new(db.pool.clone())),
        ephemeral: Arc::new(redis),
        email,
        sms,
        business_rules: config.business_rules.clone(),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Real providers when credentials are configured, log-only delivery otherwise.
fn notifiers(
    config: &NotificationConfig,
) -> anyhow::Result<(Arc<dyn EmailSender>, Arc<dyn SmsSender>)> {
    let email: Arc<dyn EmailSender> = match (&config.sendgrid_api_key, &config.sendgrid_from) {
        (Some(key), Some(from)) => Arc::new(SendGridClient::new(key.clone(), from.clone())?),
        _ => {
            tracing::warn!("SendGrid not configured; emails will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let sms: Arc<dyn SmsSender> = match (
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_from,
    ) {
        (Some(sid), Some(token), Some(from)) => {
            Arc::new(TwilioClient::new(sid.clone(), token.clone(), from.clone())?)
        }
        _ => {
            tracing::warn!("Twilio not configured; SMS will only be logged");
            Arc::new(LogNotifier)
        }
    };

    Ok((email, sms))
}
