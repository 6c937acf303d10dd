use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::tracking_links::TrackingLinkEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateLinkModel {
    pub product_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingLinkModel {
    pub slug: String,
    pub destination_url: String,
    pub tracking_url: String,
}

impl TrackingLinkModel {
    pub fn from_entity(entity: &TrackingLinkEntity, base_url: &str) -> Self {
        Self {
            slug: entity.slug.clone(),
            destination_url: entity.destination_url.clone(),
            tracking_url: format!("{}/t/{}", base_url.trim_end_matches('/'), entity.slug),
        }
    }
}

/// Client metadata captured alongside each click.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordedClickModel {
    pub click_id: Uuid,
    pub destination_url: String,
}

/// Resolved click-to-affiliate linkage used for attribution at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickAttribution {
    pub link_id: i64,
    pub affiliate_id: Uuid,
    pub product_id: i64,
}
