use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::tracking_links::{InsertTrackingLinkEntity, TrackingLinkEntity};

#[automock]
#[async_trait]
pub trait TrackingLinkRepository {
    /// Returns `None` when the slug is already taken so the caller can retry
    /// with a fresh one.
    async fn create(&self, link: InsertTrackingLinkEntity) -> Result<Option<TrackingLinkEntity>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TrackingLinkEntity>>;
}
