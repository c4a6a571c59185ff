//! Reuse of the complete product collection between queries.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::providers::catalog::{CatalogClientError, ClientTrait, Product};

/// The complete product collection together with the time it was fetched.
#[derive(Debug)]
struct Snapshot {
    fetched_at: Instant,
    products: Arc<Vec<Product>>,
}

/// Holds the complete product collection for up to `ttl`.
///
/// Recounting a query needs the whole collection, which rarely changes
/// between two page flips. A [SnapshotCache] lets consecutive queries share
/// one fetch. A failed refetch leaves the previous (expired) snapshot in
/// place and reports the error, so the caller can fall back to an estimate.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            snapshot: Mutex::new(None),
        }
    }

    /// The cached collection, if it is younger than the ttl.
    pub fn fresh(&self) -> Option<Arc<Vec<Product>>> {
        let snapshot = self.snapshot.lock().expect("snapshot lock poisoned");
        snapshot
            .as_ref()
            .filter(|snapshot| snapshot.fetched_at.elapsed() < self.ttl)
            .map(|snapshot| Arc::clone(&snapshot.products))
    }

    /// Drop the cached collection, the next query fetches it again.
    pub fn invalidate(&self) {
        *self.snapshot.lock().expect("snapshot lock poisoned") = None;
    }

    /// The cached collection if fresh, otherwise fetch and store a new one.
    pub async fn get_or_fetch(
        &self,
        client: &impl ClientTrait,
    ) -> Result<Arc<Vec<Product>>, CatalogClientError> {
        if let Some(products) = self.fresh() {
            debug!(n_products = products.len(), "using cached product snapshot");
            return Ok(products);
        }

        // the lock is not held across the fetch
        let products = Arc::new(client.all_products().await?);
        debug!(n_products = products.len(), "storing product snapshot");
        *self.snapshot.lock().expect("snapshot lock poisoned") = Some(Snapshot {
            fetched_at: Instant::now(),
            products: Arc::clone(&products),
        });
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use storefront_catalog::types::test_helpers::{category, product};

    use super::*;
    use crate::providers::catalog::{MockClient, Request};

    #[tokio::test]
    async fn fresh_snapshot_is_reused() {
        let misc = category(5, "Miscellaneous");
        let mut client = MockClient::default();
        client.push_products_response(vec![product(1, "Mug", 8.0, &misc)]);

        let cache = SnapshotCache::new(Duration::from_secs(60));
        let first = cache.get_or_fetch(&client).await.unwrap();
        let second = cache.get_or_fetch(&client).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(client.requests(), vec![Request::AllProducts]);
    }

    #[tokio::test]
    async fn expired_snapshot_is_refetched() {
        let misc = category(5, "Miscellaneous");
        let mut client = MockClient::default();
        client.push_products_response(vec![product(1, "Mug", 8.0, &misc)]);
        client.push_products_response(vec![]);

        let cache = SnapshotCache::new(Duration::ZERO);
        assert_eq!(cache.get_or_fetch(&client).await.unwrap().len(), 1);
        assert_eq!(cache.get_or_fetch(&client).await.unwrap().len(), 0);
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let mut client = MockClient::default();
        client.push_products_response(vec![]);
        client.push_products_response(vec![]);

        let cache = SnapshotCache::new(Duration::from_secs(60));
        cache.get_or_fetch(&client).await.unwrap();
        cache.invalidate();
        assert!(cache.fresh().is_none());
        cache.get_or_fetch(&client).await.unwrap();
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_previous_snapshot() {
        let misc = category(5, "Miscellaneous");
        let mut client = MockClient::default();
        client.push_products_response(vec![product(1, "Mug", 8.0, &misc)]);
        client.push_error_response(503);

        let cache = SnapshotCache::new(Duration::ZERO);
        cache.get_or_fetch(&client).await.unwrap();
        assert!(cache.get_or_fetch(&client).await.is_err());

        let kept = cache.snapshot.lock().unwrap();
        assert_eq!(kept.as_ref().map(|s| s.products.len()), Some(1));
    }
}
