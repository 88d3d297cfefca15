use axum::{ extract::State, http::StatusCode, routing::{ delete, get, post }, Json, Router };
use sea_orm::DatabaseConnection;
use serde_json::{ json, Value };
use std::sync::Arc;
use tower_http::{ cors::CorsLayer, trace::TraceLayer };

pub mod auth;
pub mod cron;
pub mod notification;
pub mod settings;
pub mod wallet;

use crate::alert_checker::AlertEvaluator;
use crate::db::{ NotificationRepository, SettingsRepository, UserRepository, WalletRepository };
use crate::email::EmailSender;
use crate::providers::BalanceFetcher;
use crate::services::{
    AuthService,
    BalanceService,
    NotificationService,
    SettingsService,
    WalletService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth_service: Arc<AuthService>,
    pub wallet_service: Arc<WalletService>,
    pub balance_service: Arc<BalanceService>,
    pub settings_service: Arc<SettingsService>,
    pub notification_service: Arc<NotificationService>,
    pub evaluator: Arc<AlertEvaluator>,
    pub cron_secret: Option<Arc<str>>,
}

/// Knobs for [`AppState::new`] that come from configuration.
#[derive(Debug, Clone)]
pub struct StateOptions {
    pub owner_page_size: u64,
    pub session_ttl_hours: i64,
    pub cron_secret: Option<String>,
}

impl AppState {
    /// Builds every repository and service over one shared connection.
    pub fn new(
        db: DatabaseConnection,
        fetcher: Arc<dyn BalanceFetcher>,
        mailer: Arc<dyn EmailSender>,
        options: StateOptions
    ) -> Self {
        let wallets = Arc::new(WalletRepository::new(db.clone()));
        let settings = Arc::new(SettingsRepository::new(db.clone()));
        let notifications = Arc::new(NotificationRepository::new(db.clone()));
        let users = Arc::new(UserRepository::new(db.clone()));

        let evaluator = Arc::new(
            AlertEvaluator::new(
                wallets.clone(),
                settings.clone(),
                notifications.clone(),
                fetcher.clone(),
                mailer,
                options.owner_page_size
            )
        );

        Self {
            db,
            auth_service: Arc::new(AuthService::new(users, options.session_ttl_hours)),
            wallet_service: Arc::new(WalletService::new(wallets.clone())),
            balance_service: Arc::new(BalanceService::new(wallets, fetcher)),
            settings_service: Arc::new(SettingsService::new(settings)),
            notification_service: Arc::new(NotificationService::new(notifications)),
            evaluator,
            cron_secret: options.cron_secret.map(Arc::from),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/user", get(auth::current_user))
        .route("/api/auth/session", get(auth::session))
        .route("/api/wallets", get(wallet::list_wallets).post(wallet::create_wallet))
        .route("/api/wallets/overview", get(wallet::overview))
        .route(
            "/api/wallets/{id}",
            get(wallet::get_wallet).patch(wallet::update_wallet).delete(wallet::delete_wallet)
        )
        .route("/api/wallets/{id}/balance", get(wallet::get_balance))
        .route("/api/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/api/settings/emails", post(settings::add_email))
        .route("/api/settings/emails/{email}", delete(settings::remove_email))
        .route("/api/notifications", get(notification::list_notifications))
        .route("/api/notifications/{id}", delete(notification::delete_notification))
        .route("/api/cron/check-alerts", get(cron::check_alerts).post(cron::check_alerts))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "database": "connected" }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ setup_test_db, FakeFetcher, RecordingMailer };
    use axum::body::{ to_bytes, Body };
    use axum::http::{ header, Method, Request };
    use tower::ServiceExt;

    async fn app(cron_secret: Option<&str>) -> (Router, Arc<RecordingMailer>) {
        let db = setup_test_db().await;
        let mailer = Arc::new(RecordingMailer::default());
        let fetcher = Arc::new(FakeFetcher::new(&[("0xabcdef0123", "3")]));

        let state = AppState::new(db, fetcher, mailer.clone(), StateOptions {
            owner_page_size: 100,
            session_ttl_hours: 24,
            cron_secret: cron_secret.map(str::to_string),
        });

        (router(state), mailer)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) =>
                builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn sign_up(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/sign-up",
            None,
            Some(json!({ "email": "ops@example.com", "password": "secret1" }))
        ).await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_reports_database() {
        let (app, _) = app(None).await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_dashboard_routes_require_token() {
        let (app, _) = app(None).await;

        let (status, body) = send(&app, Method::GET, "/api/wallets", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, Method::GET, "/api/settings", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::GET, "/api/auth/session", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["session"].is_null());
    }

    #[tokio::test]
    async fn test_wallet_settings_and_alert_flow() {
        let (app, mailer) = app(None).await;
        let token = sign_up(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/wallets",
            Some(&token),
            Some(json!({ "address": "nope", "threshold": "10" }))
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "address");

        let (status, wallet) = send(
            &app,
            Method::POST,
            "/api/wallets",
            Some(&token),
            Some(json!({ "address": "0xabcdef0123", "threshold": "10", "nickname": "ops" }))
        ).await;
        assert_eq!(status, StatusCode::CREATED);
        let wallet_id = wallet["id"].as_str().unwrap().to_string();

        let (status, overview) = send(
            &app,
            Method::GET,
            "/api/wallets/overview?status=alert",
            Some(&token),
            None
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["wallet_count"], 1);
        assert_eq!(overview["counts"]["alert"], 1);
        assert_eq!(overview["wallets"][0]["id"], wallet_id.as_str());

        let (status, settings) = send(
            &app,
            Method::POST,
            "/api/settings/emails",
            Some(&token),
            Some(json!({ "email": "alerts@example.com" }))
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["notification_emails"], json!(["alerts@example.com"]));

        let (status, body) = send(&app, Method::POST, "/api/cron/check-alerts", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["report"]["alerts_created"], 1);
        assert_eq!(mailer.sent().len(), 1);

        let (status, history) = send(&app, Method::GET, "/api/notifications", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/wallets/{}", wallet_id),
            Some(&token),
            None
        ).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, history) = send(&app, Method::GET, "/api/notifications", Some(&token), None).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_routes() {
        let (app, _) = app(None).await;
        let token = sign_up(&app).await;

        let (_, wallet) = send(
            &app,
            Method::POST,
            "/api/wallets",
            Some(&token),
            Some(json!({ "address": "0xabcdef0123", "threshold": "10" }))
        ).await;
        let wallet_id = wallet["id"].as_str().unwrap().to_string();

        let (status, patched) = send(
            &app,
            Method::PATCH,
            &format!("/api/wallets/{}", wallet_id),
            Some(&token),
            Some(json!({ "nickname": "cold storage", "threshold": "2" }))
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["nickname"], "cold storage");
        let threshold: sea_orm::prelude::Decimal = patched["threshold"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(threshold, sea_orm::prelude::Decimal::from(2));

        let (status, settings) = send(
            &app,
            Method::PUT,
            "/api/settings",
            Some(&token),
            Some(
                json!({
                    "notification_frequency": "daily",
                    "notification_emails": ["a@example.com", "b@example.com"]
                })
            )
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["notification_frequency"], "daily");
        assert_eq!(settings["email_notifications"], true);

        let (status, settings) = send(
            &app,
            Method::DELETE,
            "/api/settings/emails/a%40example.com",
            Some(&token),
            None
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["notification_emails"], json!(["b@example.com"]));

        // Threshold 2 against balance 3 is a warning; raise it to fire an alert.
        send(
            &app,
            Method::PATCH,
            &format!("/api/wallets/{}", wallet_id),
            Some(&token),
            Some(json!({ "threshold": "10" }))
        ).await;
        send(&app, Method::POST, "/api/cron/check-alerts", None, None).await;

        let (_, history) = send(
            &app,
            Method::GET,
            "/api/notifications?search=COLD&status=alert&sort=balance&limit=5",
            Some(&token),
            None
        ).await;
        let history = history.as_array().unwrap().clone();
        assert_eq!(history.len(), 1);
        let notification_id = history[0]["id"].as_str().unwrap().to_string();

        let (_, filtered) = send(
            &app,
            Method::GET,
            "/api/notifications?status=healthy",
            Some(&token),
            None
        ).await;
        assert!(filtered.as_array().unwrap().is_empty());

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/notifications/{}", notification_id),
            Some(&token),
            None
        ).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, history) = send(&app, Method::GET, "/api/notifications", Some(&token), None).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_removing_email_without_settings_returns_defaults() {
        let (app, _) = app(None).await;
        let token = sign_up(&app).await;

        let (status, settings) = send(
            &app,
            Method::DELETE,
            "/api/settings/emails/ops%40example.com",
            Some(&token),
            None
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert!(settings["updated_at"].is_null());
        assert_eq!(settings["notification_emails"], json!([]));
    }

    #[tokio::test]
    async fn test_cron_secret_is_enforced() {
        let (app, _) = app(Some("s3cret")).await;

        let (status, body) = send(&app, Method::GET, "/api/cron/check-alerts", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/cron/check-alerts",
            Some("s3cret"),
            None
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Alerts checked successfully");
    }
}
