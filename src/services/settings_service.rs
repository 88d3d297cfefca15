use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::entity::user_settings;
use crate::db::{ SettingsChanges, SettingsRepository };
use crate::enums::NotificationFrequency;
use crate::error::{ AppError, Result };

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub email_notifications: Option<bool>,
    #[serde(default)]
    pub notification_frequency: Option<NotificationFrequency>,
    #[serde(default)]
    pub notification_emails: Option<Vec<String>>,
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidEmail);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(AppError::InvalidEmail);
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(AppError::InvalidEmail),
    }
}

pub struct SettingsService {
    repository: Arc<SettingsRepository>,
}

impl SettingsService {
    pub fn new(repository: Arc<SettingsRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_settings(&self, user_id: Uuid) -> Result<Option<user_settings::Model>> {
        self.repository.find_by_user(user_id).await
    }

    pub async fn update_settings(
        &self,
        user_id: Uuid,
        update: SettingsUpdate
    ) -> Result<user_settings::Model> {
        let notification_emails = match update.notification_emails {
            Some(emails) => {
                let mut cleaned: Vec<String> = Vec::with_capacity(emails.len());
                for email in emails {
                    let email = email.trim().to_string();
                    validate_email(&email)?;
                    if cleaned.contains(&email) {
                        return Err(
                            AppError::InvalidInput(
                                format!("Email address {} is listed twice", email)
                            )
                        );
                    }
                    cleaned.push(email);
                }
                Some(cleaned)
            }
            None => None,
        };

        self.repository.upsert(user_id, SettingsChanges {
            email_notifications: update.email_notifications,
            notification_frequency: update.notification_frequency,
            notification_emails,
        }).await
    }

    /// Appends a recipient. The duplicate check happens here, not in storage.
    pub async fn add_email(&self, user_id: Uuid, email: &str) -> Result<user_settings::Model> {
        let email = email.trim();
        validate_email(email)?;

        let mut emails = self.current_emails(user_id).await?;
        if emails.iter().any(|e| e == email) {
            return Err(AppError::InvalidInput("This email address is already added".to_string()));
        }
        emails.push(email.to_string());

        self.repository.upsert(user_id, SettingsChanges {
            notification_emails: Some(emails),
            ..Default::default()
        }).await
    }

    /// Drops a recipient. Nothing is written when the user has no settings
    /// or the address is not listed, so this never creates a settings row.
    pub async fn remove_email(
        &self,
        user_id: Uuid,
        email: &str
    ) -> Result<Option<user_settings::Model>> {
        let email = email.trim();
        let Some(settings) = self.repository.find_by_user(user_id).await? else {
            return Ok(None);
        };
        if !settings.emails().iter().any(|e| e == email) {
            return Ok(Some(settings));
        }

        let emails: Vec<String> = settings.notification_emails.0
            .into_iter()
            .filter(|e| e != email)
            .collect();

        let updated = self.repository.upsert(user_id, SettingsChanges {
            notification_emails: Some(emails),
            ..Default::default()
        }).await?;
        Ok(Some(updated))
    }

    async fn current_emails(&self, user_id: Uuid) -> Result<Vec<String>> {
        Ok(
            self.repository
                .find_by_user(user_id).await?
                .map(|s| s.notification_emails.0)
                .unwrap_or_default()
        )
    }
}
