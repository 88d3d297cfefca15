use axum::{ extract::{ Path, State }, Json };
use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

use crate::db::entity::user_settings;
use crate::enums::NotificationFrequency;
use crate::error::Result;
use crate::services::settings_service::SettingsUpdate;

use super::auth::AuthUser;
use super::AppState;

/// Settings as the dashboard sees them. Users who never saved any get the
/// defaults, with `updated_at` unset.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub email_notifications: bool,
    pub notification_frequency: NotificationFrequency,
    pub notification_emails: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Option<user_settings::Model>> for SettingsResponse {
    fn from(settings: Option<user_settings::Model>) -> Self {
        match settings {
            Some(settings) =>
                Self {
                    email_notifications: settings.email_notifications,
                    notification_frequency: settings.frequency(),
                    notification_emails: settings.notification_emails.0,
                    updated_at: Some(settings.updated_at),
                },
            None =>
                Self {
                    email_notifications: true,
                    notification_frequency: NotificationFrequency::default(),
                    notification_emails: Vec::new(),
                    updated_at: None,
                },
        }
    }
}

#[derive(Deserialize)]
pub struct AddEmailRequest {
    pub email: String,
}

pub async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser
) -> Result<Json<SettingsResponse>> {
    let settings = state.settings_service.get_settings(auth.user.id).await?;
    Ok(Json(settings.into()))
}

pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<SettingsUpdate>
) -> Result<Json<SettingsResponse>> {
    let settings = state.settings_service.update_settings(auth.user.id, update).await?;
    Ok(Json(Some(settings).into()))
}

pub async fn add_email(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<AddEmailRequest>
) -> Result<Json<SettingsResponse>> {
    let settings = state.settings_service.add_email(auth.user.id, &request.email).await?;
    Ok(Json(Some(settings).into()))
}

pub async fn remove_email(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(email): Path<String>
) -> Result<Json<SettingsResponse>> {
    let settings = state.settings_service.remove_email(auth.user.id, &email).await?;
    Ok(Json(settings.into()))
}
