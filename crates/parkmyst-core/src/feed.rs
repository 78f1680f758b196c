//! Boundary to the content-delivery transport.

use crate::definition::PlayerPermission;
use crate::error::FeedError;
use crate::id::{FeedId, InstanceId};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// What a component asks the transport to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedRequest {
    pub owner: InstanceId,
    pub template: String,
    pub permission: PlayerPermission,
    pub data: Value,
}

/// Delivers feeds to players.
///
/// Feeds are never collected by the platform: every handle returned by
/// `create_feed` must eventually be passed to `remove_feed` exactly once.
#[async_trait]
pub trait FeedService: Send + Sync {
    async fn create_feed(&self, request: FeedRequest) -> Result<FeedId, FeedError>;

    async fn remove_feed(&self, feed: &FeedId) -> Result<(), FeedError>;
}
