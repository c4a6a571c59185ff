//! Ordering of concurrently issued queries.
//!
//! Results of queries can arrive in a different order than the queries were
//! issued. Every issued query takes a [QueryTicket] from a shared
//! [QuerySequencer]; its result is only applied while no newer ticket has
//! been issued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Hands out [QueryTicket]s, cloning shares the sequence.
#[derive(Debug, Clone, Default)]
pub struct QuerySequencer {
    latest: Arc<AtomicU64>,
}

/// Sequence number of one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket(u64);

impl QuerySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket newer than every ticket issued before.
    pub fn issue(&self) -> QueryTicket {
        QueryTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `ticket` is the latest issued ticket.
    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Pass `result` through if `ticket` is still current, discard it
    /// otherwise.
    pub fn accept<T>(&self, ticket: QueryTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!(
                ticket = ticket.0,
                latest = self.latest.load(Ordering::Acquire),
                "discarding stale query result"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use storefront_catalog::types::test_helpers::{category, product};
    use tokio::sync::oneshot;

    use super::*;
    use crate::models::products::{ProductsPage, get_products};
    use crate::models::query::Query;
    use crate::providers::catalog::MockClient;

    #[test]
    fn tickets_increase() {
        let sequencer = QuerySequencer::new();
        let first = sequencer.issue();
        let second = sequencer.clone().issue();
        assert!(second > first);
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn stale_result_is_discarded() {
        let sequencer = QuerySequencer::new();
        let stale = sequencer.issue();
        let current = sequencer.issue();

        assert_eq!(sequencer.accept(stale, "old"), None);
        assert_eq!(sequencer.accept(current, "new"), Some("new"));
    }

    #[tokio::test]
    async fn slow_older_query_does_not_overwrite_newer_result() {
        let misc = category(5, "Miscellaneous");
        let sequencer = QuerySequencer::new();

        let mut old_client = MockClient::default();
        old_client.push_products_response(vec![product(1, "Old", 1.0, &misc)]);
        old_client.push_products_response(vec![]);
        let mut new_client = MockClient::default();
        new_client.push_products_response(vec![product(2, "New", 2.0, &misc)]);
        new_client.push_products_response(vec![]);

        let (release_old, old_released) = oneshot::channel::<()>();

        let old_ticket = sequencer.issue();
        let old_query = async {
            old_released.await.unwrap();
            let page = get_products(&old_client, &Query::default()).await.unwrap();
            sequencer.accept(old_ticket, page)
        };

        let new_ticket = sequencer.issue();
        let new_query = async {
            let page = get_products(&new_client, &Query::default()).await.unwrap();
            let accepted = sequencer.accept(new_ticket, page);
            release_old.send(()).unwrap();
            accepted
        };

        // the newer query completes first, the older one is applied after it
        let (old_page, new_page) = tokio::join!(old_query, new_query);
        let shown: Option<ProductsPage> = old_page.or(new_page);

        assert_eq!(shown.unwrap().items[0].title, "New");
    }
}
