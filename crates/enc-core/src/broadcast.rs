use std::sync::Arc;

use futures::{stream, StreamExt};

use crate::{
    dispatch::{Delivery, Dispatcher},
    domain::ChatId,
    store::UserStore,
    texts,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub total: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Fans a text out to every registered user.
///
/// The store is read once up front; users registering mid-run are not part of
/// that run. `concurrency` bounds in-flight sends (1 = strictly sequential).
pub struct BroadcastEngine {
    store: Arc<dyn UserStore>,
    dispatcher: Dispatcher,
    concurrency: usize,
}

impl BroadcastEngine {
    pub fn new(store: Arc<dyn UserStore>, dispatcher: Dispatcher, concurrency: usize) -> Self {
        Self {
            store,
            dispatcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Deliver `text` to the snapshot, reporting progress and the summary to `origin`.
    pub async fn broadcast(&self, origin: ChatId, text: &str) -> BroadcastSummary {
        let mut users = self.store.load();
        let total = users.len();

        self.report(origin, &texts::broadcast_progress(total)).await;
        tracing::info!(total, concurrency = self.concurrency, "broadcast started");

        // Previously blocked users are attempted like everyone else.
        let dispatcher = &self.dispatcher;
        let outcomes: Vec<(i64, Delivery)> = stream::iter(users.keys().copied())
            .map(|user_id| async move {
                (user_id, dispatcher.notify(ChatId(user_id), text).await)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = BroadcastSummary {
            total,
            ..BroadcastSummary::default()
        };
        for (user_id, outcome) in outcomes {
            match outcome {
                Delivery::Delivered => summary.delivered += 1,
                Delivery::Unreachable => {
                    summary.failed += 1;
                    if let Some(record) = users.get_mut(&user_id) {
                        record.blocked = true;
                    }
                }
            }
        }

        self.store.save(&users);

        tracing::info!(
            total = summary.total,
            delivered = summary.delivered,
            failed = summary.failed,
            "broadcast complete"
        );
        self.report(origin, &texts::broadcast_summary(&summary)).await;

        summary
    }

    async fn report(&self, origin: ChatId, text: &str) {
        if let Err(e) = self.dispatcher.messenger().send_text(origin, text).await {
            tracing::warn!(chat_id = origin.0, error = %e, "failed to report broadcast status");
        }
    }
}
