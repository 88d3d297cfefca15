use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use uuid::Uuid;

use crate::db::entity::wallet;
use crate::error::Result;
use crate::services::balance_service::{ OverviewQuery, WalletBalance, WalletOverview };
use crate::services::wallet_service::{ NewWallet, WalletUpdate };

use super::auth::AuthUser;
use super::AppState;

pub async fn list_wallets(
    State(state): State<AppState>,
    auth: AuthUser
) -> Result<Json<Vec<wallet::Model>>> {
    let wallets = state.wallet_service.list_wallets(auth.user.id).await?;
    Ok(Json(wallets))
}

pub async fn create_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<NewWallet>
) -> Result<(StatusCode, Json<wallet::Model>)> {
    let wallet = state.wallet_service.add_wallet(auth.user.id, request).await?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

pub async fn get_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(wallet_id): Path<Uuid>
) -> Result<Json<wallet::Model>> {
    let wallet = state.wallet_service.get_wallet(auth.user.id, wallet_id).await?;
    Ok(Json(wallet))
}

pub async fn update_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(wallet_id): Path<Uuid>,
    Json(update): Json<WalletUpdate>
) -> Result<Json<wallet::Model>> {
    let wallet = state.wallet_service.update_wallet(auth.user.id, wallet_id, update).await?;
    Ok(Json(wallet))
}

pub async fn delete_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(wallet_id): Path<Uuid>
) -> Result<StatusCode> {
    state.wallet_service.delete_wallet(auth.user.id, wallet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(wallet_id): Path<Uuid>
) -> Result<Json<WalletBalance>> {
    let balance = state.balance_service.get_wallet_balance(auth.user.id, wallet_id).await?;
    Ok(Json(balance))
}

pub async fn overview(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<OverviewQuery>
) -> Result<Json<WalletOverview>> {
    let overview = state.balance_service.overview(auth.user.id, query).await?;
    Ok(Json(overview))
}
