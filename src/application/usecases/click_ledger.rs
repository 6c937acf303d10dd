use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::usecases::link_registry::{TrackingError, TrackingResult};
use crate::domain::{
    entities::clicks::InsertClickEntity,
    repositories::{clicks::ClickRepository, tracking_links::TrackingLinkRepository},
    value_objects::tracking::{ClientMeta, RecordedClickModel},
};

pub struct ClickLedgerUseCase<C, L>
where
    C: ClickRepository + Send + Sync,
    L: TrackingLinkRepository + Send + Sync,
{
    click_repo: Arc<C>,
    link_repo: Arc<L>,
}

impl<C, L> ClickLedgerUseCase<C, L>
where
    C: ClickRepository + Send + Sync,
    L: TrackingLinkRepository + Send + Sync,
{
    pub fn new(click_repo: Arc<C>, link_repo: Arc<L>) -> Self {
        Self {
            click_repo,
            link_repo,
        }
    }

    /// Resolves a slug and appends one click record. Every visit produces its
    /// own record and its own click id; nothing is deduplicated.
    pub async fn record_click(
        &self,
        slug: &str,
        client_meta: ClientMeta,
    ) -> TrackingResult<RecordedClickModel> {
        let link = self
            .link_repo
            .find_by_slug(slug)
            .await
            .map_err(|err| {
                error!(slug, db_error = ?err, "click ledger: failed to resolve slug");
                TrackingError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(slug, "click ledger: unknown slug, nothing recorded");
                TrackingError::LinkNotFound
            })?;

        let click_id = self
            .click_repo
            .record(InsertClickEntity {
                click_id: Uuid::new_v4(),
                link_id: link.id,
                ip_address: client_meta.ip_address,
                user_agent: client_meta.user_agent,
                created_at: Utc::now(),
            })
            .await
            .map_err(|err| {
                error!(
                    slug,
                    link_id = link.id,
                    db_error = ?err,
                    "click ledger: failed to append click record"
                );
                TrackingError::Internal(err)
            })?;

        info!(slug, link_id = link.id, %click_id, "click ledger: click recorded");

        Ok(RecordedClickModel {
            click_id,
            destination_url: link.destination_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::tracking_links::TrackingLinkEntity,
        repositories::{clicks::MockClickRepository, tracking_links::MockTrackingLinkRepository},
    };
    use mockall::predicate::eq;

    fn link() -> TrackingLinkEntity {
        TrackingLinkEntity {
            id: 3,
            user_id: Uuid::new_v4(),
            product_id: 7,
            slug: "abc123xy".to_string(),
            destination_url: "https://example.test/products/view/7".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn unknown_slug_writes_no_record() {
        let mut link_repo = MockTrackingLinkRepository::new();
        link_repo
            .expect_find_by_slug()
            .with(eq("nope"))
            .returning(|_| Ok(None));

        let mut click_repo = MockClickRepository::new();
        click_repo.expect_record().never();

        let usecase = ClickLedgerUseCase::new(Arc::new(click_repo), Arc::new(link_repo));
        let result = usecase.record_click("nope", ClientMeta::default()).await;

        assert!(matches!(result, Err(TrackingError::LinkNotFound)));
    }

    #[tokio::test]
    async fn repeated_clicks_get_independent_ids() {
        let mut link_repo = MockTrackingLinkRepository::new();
        link_repo
            .expect_find_by_slug()
            .returning(|_| Ok(Some(link())));

        let mut click_repo = MockClickRepository::new();
        click_repo
            .expect_record()
            .times(2)
            .returning(|click| Ok(click.click_id));

        let usecase = ClickLedgerUseCase::new(Arc::new(click_repo), Arc::new(link_repo));

        let first = usecase
            .record_click(
                "abc123xy",
                ClientMeta {
                    ip_address: Some("10.0.0.1".to_string()),
                    user_agent: Some("agent-a".to_string()),
                },
            )
            .await
            .unwrap();
        let second = usecase
            .record_click(
                "abc123xy",
                ClientMeta {
                    ip_address: Some("10.0.0.2".to_string()),
                    user_agent: Some("agent-b".to_string()),
                },
            )
            .await
            .unwrap();

        assert_ne!(first.click_id, second.click_id);
        assert_eq!(first.destination_url, second.destination_url);
    }
}
