use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use uuid::Uuid;

use crate::db::entity::notification;
use crate::error::Result;
use crate::services::notification_service::HistoryQuery;

use super::auth::AuthUser;
use super::AppState;

pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>
) -> Result<Json<Vec<notification::Model>>> {
    let notifications = state.notification_service.list_notifications(auth.user.id, query).await?;
    Ok(Json(notifications))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<Uuid>
) -> Result<StatusCode> {
    state.notification_service.delete_notification(auth.user.id, notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
