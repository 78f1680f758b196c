//! In-process feed service.

use async_trait::async_trait;
use parkmyst_core::{FeedError, FeedId, FeedRequest, FeedService, InstanceId};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct Ledger {
    next_id: u64,
    live: BTreeMap<FeedId, FeedRequest>,
    created: usize,
    removed: usize,
}

/// Feed service that keeps feeds in memory.
///
/// Useful as the default transport and for leak checks in tests: every
/// created feed stays in [`live`](Self::live) until it is removed.
#[derive(Debug, Default)]
pub struct MemoryFeeds {
    ledger: Mutex<Ledger>,
}

impl MemoryFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds created and not yet removed.
    pub fn live(&self) -> Vec<(FeedId, FeedRequest)> {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger
            .live
            .iter()
            .map(|(id, request)| (id.clone(), request.clone()))
            .collect()
    }

    pub fn live_for(&self, owner: InstanceId) -> Vec<FeedId> {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger
            .live
            .iter()
            .filter(|(_, request)| request.owner == owner)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn live_count(&self) -> usize {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.live.len()
    }

    pub fn created_count(&self) -> usize {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.created
    }

    pub fn removed_count(&self) -> usize {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.removed
    }
}

#[async_trait]
impl FeedService for MemoryFeeds {
    async fn create_feed(&self, request: FeedRequest) -> Result<FeedId, FeedError> {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.next_id += 1;
        let id = FeedId::new(format!("feed-{}", ledger.next_id));
        ledger.live.insert(id.clone(), request);
        ledger.created += 1;
        Ok(id)
    }

    async fn remove_feed(&self, feed: &FeedId) -> Result<(), FeedError> {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        match ledger.live.remove(feed) {
            Some(_) => {
                ledger.removed += 1;
                Ok(())
            }
            None => Err(FeedError::NotFound(feed.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkmyst_core::PlayerPermission;
    use serde_json::json;

    fn request(owner: u32) -> FeedRequest {
        FeedRequest {
            owner: InstanceId::new(owner),
            template: "message".to_string(),
            permission: PlayerPermission::User,
            data: json!({"message": "hello"}),
        }
    }

    #[tokio::test]
    async fn test_create_and_remove() {
        let feeds = MemoryFeeds::new();
        let a = feeds.create_feed(request(1)).await.unwrap();
        let b = feeds.create_feed(request(2)).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(feeds.live_for(InstanceId::new(1)), vec![a.clone()]);

        feeds.remove_feed(&a).await.unwrap();
        assert_eq!(feeds.live_count(), 1);
        assert_eq!(feeds.created_count(), 2);
        assert_eq!(feeds.removed_count(), 1);
    }

    #[tokio::test]
    async fn test_double_remove_is_refused() {
        let feeds = MemoryFeeds::new();
        let a = feeds.create_feed(request(1)).await.unwrap();
        feeds.remove_feed(&a).await.unwrap();
        assert!(matches!(
            feeds.remove_feed(&a).await,
            Err(FeedError::NotFound(_))
        ));
        assert_eq!(feeds.removed_count(), 1);
    }
}
