use migration::{ Migrator, MigratorTrait };
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };
use wallet_alerts::{
    api::{ self, AppState, StateOptions },
    chains::aptos::AptosProvider,
    email::{ EmailSender, LogMailer, ResendMailer },
    providers::BalanceFetcher,
    scheduler::Scheduler,
    AppError,
    Config,
    Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "wallet_alerts=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| AppError::Config(e.to_string()))?;

    tracing::info!(
        "Starting wallet-alerts on {:?} via {}",
        config.aptos_network,
        config.aptos_node_url
    );

    // Initialize database connection
    let db = sea_orm::Database::connect(&config.database_url).await.map_err(AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Run migrations
    Migrator::up(&db, None).await.map_err(AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    let timeout = Duration::from_secs(config.fetch_timeout_secs);

    let fetcher: Arc<dyn BalanceFetcher> = Arc::new(
        AptosProvider::new(&config.aptos_node_url, timeout)?
    );

    let mailer: Arc<dyn EmailSender> = match &config.resend_api_key {
        Some(api_key) => {
            tracing::info!("Sending alert emails through Resend as {}", config.email_from);
            Arc::new(ResendMailer::new(api_key.clone(), config.email_from.clone(), timeout)?)
        }
        None => {
            tracing::warn!("RESEND_API_KEY not set, alert emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let app_state = AppState::new(db, fetcher, mailer, StateOptions {
        owner_page_size: config.owner_page_size,
        session_ttl_hours: config.session_ttl_hours,
        cron_secret: config.cron_secret.clone(),
    });

    if config.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET not set, the alert trigger endpoint is open");
    }

    if let Some(period) = config.alert_check_interval_secs {
        let scheduler = Scheduler::new(app_state.evaluator.clone(), period);
        tokio::spawn(scheduler.start());
    }

    let app = api::router(app_state);

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
