use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::entity::notification;
use crate::db::NotificationRepository;
use crate::enums::WalletStatus;
use crate::error::Result;

const MAX_PAGE: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySort {
    /// Newest first.
    #[default]
    Date,
    /// Lowest balance first.
    Balance,
    /// Highest threshold first.
    Threshold,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub search: Option<String>,
    /// Status derived from the snapshot balance and threshold of each row.
    #[serde(default)]
    pub status: Option<WalletStatus>,
    #[serde(default)]
    pub sort: Option<HistorySort>,
}

pub struct NotificationService {
    repository: Arc<NotificationRepository>,
}

impl NotificationService {
    pub fn new(repository: Arc<NotificationRepository>) -> Self {
        Self { repository }
    }

    /// Alert history for a user, filtered and sorted, then cut to `limit`
    /// (at most 500).
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        query: HistoryQuery
    ) -> Result<Vec<notification::Model>> {
        let search = query.search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut history: Vec<notification::Model> = self.repository
            .find_by_user(user_id, None).await?
            .into_iter()
            .filter(|n| {
                let matches_search = match &search {
                    Some(needle) =>
                        n.wallet_address.to_lowercase().contains(needle) ||
                            n.wallet_nickname
                                .as_deref()
                                .map(|nick| nick.to_lowercase().contains(needle))
                                .unwrap_or(false),
                    None => true,
                };
                let matches_status = query.status
                    .map(|s| s == WalletStatus::from_balance(n.balance, n.threshold))
                    .unwrap_or(true);
                matches_search && matches_status
            })
            .collect();

        // Rows arrive newest first, and the sorts are stable.
        match query.sort.unwrap_or_default() {
            HistorySort::Date => {}
            HistorySort::Balance => history.sort_by(|a, b| a.balance.cmp(&b.balance)),
            HistorySort::Threshold => history.sort_by(|a, b| b.threshold.cmp(&a.threshold)),
        }

        if let Some(limit) = query.limit {
            history.truncate(limit.min(MAX_PAGE) as usize);
        }

        Ok(history)
    }

    pub async fn delete_notification(&self, user_id: Uuid, notification_id: Uuid) -> Result<()> {
        self.repository.delete(user_id, notification_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewNotification;
    use crate::test_utils::{ dec, setup_test_db };

    async fn service() -> (NotificationService, Arc<NotificationRepository>) {
        let db = setup_test_db().await;
        let repo = Arc::new(NotificationRepository::new(db));
        (NotificationService::new(repo.clone()), repo)
    }

    async fn record(
        repo: &NotificationRepository,
        owner: Uuid,
        address: &str,
        nickname: Option<&str>,
        balance: &str,
        threshold: &str
    ) -> notification::Model {
        repo.create(NewNotification {
            user_id: owner,
            wallet_id: Uuid::new_v4(),
            wallet_address: address.to_string(),
            wallet_nickname: nickname.map(str::to_string),
            balance: dec(balance),
            threshold: dec(threshold),
        }).await.unwrap()
    }

    #[tokio::test]
    async fn test_limit_is_capped() {
        let (service, repo) = service().await;
        let owner = Uuid::new_v4();
        for _ in 0..(MAX_PAGE + 3) {
            record(&repo, owner, "0xaaaaaaaaaa", None, "1", "10").await;
        }

        let capped = service
            .list_notifications(owner, HistoryQuery {
                limit: Some(10_000),
                ..Default::default()
            }).await
            .unwrap();
        assert_eq!(capped.len() as u64, MAX_PAGE);

        let small = service
            .list_notifications(owner, HistoryQuery {
                limit: Some(2),
                ..Default::default()
            }).await
            .unwrap();
        assert_eq!(small.len(), 2);
    }

    #[tokio::test]
    async fn test_search_and_status_filters() {
        let (service, repo) = service().await;
        let owner = Uuid::new_v4();
        record(&repo, owner, "0xaaaaaaaaaa", Some("Treasury"), "1", "10").await;
        record(&repo, owner, "0xbbbbbbbbbb", None, "12", "10").await;
        record(&repo, owner, "0xcccccccccc", None, "20", "10").await;

        let by_nickname = service
            .list_notifications(owner, HistoryQuery {
                search: Some("treas".into()),
                ..Default::default()
            }).await
            .unwrap();
        assert_eq!(by_nickname.len(), 1);
        assert_eq!(by_nickname[0].wallet_address, "0xaaaaaaaaaa");

        let by_address = service
            .list_notifications(owner, HistoryQuery {
                search: Some("0XBBB".into()),
                ..Default::default()
            }).await
            .unwrap();
        assert_eq!(by_address.len(), 1);

        let warnings = service
            .list_notifications(owner, HistoryQuery {
                status: Some(WalletStatus::Warning),
                ..Default::default()
            }).await
            .unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].wallet_address, "0xbbbbbbbbbb");

        let healthy = service
            .list_notifications(owner, HistoryQuery {
                status: Some(WalletStatus::Healthy),
                ..Default::default()
            }).await
            .unwrap();
        assert_eq!(healthy[0].wallet_address, "0xcccccccccc");
    }

    #[tokio::test]
    async fn test_sort_by_balance_and_threshold() {
        let (service, repo) = service().await;
        let owner = Uuid::new_v4();
        record(&repo, owner, "0xaaaaaaaaaa", None, "4", "5").await;
        record(&repo, owner, "0xbbbbbbbbbb", None, "1", "20").await;
        record(&repo, owner, "0xcccccccccc", None, "2", "10").await;

        let by_balance = service
            .list_notifications(owner, HistoryQuery {
                sort: Some(HistorySort::Balance),
                ..Default::default()
            }).await
            .unwrap();
        let balances: Vec<_> = by_balance
            .iter()
            .map(|n| n.balance)
            .collect();
        assert_eq!(balances, vec![dec("1"), dec("2"), dec("4")]);

        let by_threshold = service
            .list_notifications(owner, HistoryQuery {
                sort: Some(HistorySort::Threshold),
                ..Default::default()
            }).await
            .unwrap();
        let thresholds: Vec<_> = by_threshold
            .iter()
            .map(|n| n.threshold)
            .collect();
        assert_eq!(thresholds, vec![dec("20"), dec("10"), dec("5")]);
    }

    #[tokio::test]
    async fn test_delete_is_owner_scoped() {
        let (service, repo) = service().await;
        let owner = Uuid::new_v4();
        let row = record(&repo, owner, "0xaaaaaaaaaa", None, "1", "10").await;

        service.delete_notification(Uuid::new_v4(), row.id).await.unwrap();
        assert_eq!(service.list_notifications(owner, HistoryQuery::default()).await.unwrap().len(), 1);

        service.delete_notification(owner, row.id).await.unwrap();
        assert!(service.list_notifications(owner, HistoryQuery::default()).await.unwrap().is_empty());
    }
}
