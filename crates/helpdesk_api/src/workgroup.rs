//! Bounded fan-out over the items of one page.

use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::error::Result;

/// Runs a per-item action over a collection with at most `limit` actions in flight, returning only after every action has finished.
#[derive(Clone, Copy, Debug)]
pub struct WorkGroup {
    limit: usize,
}

impl WorkGroup {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Items are admitted in input order. A failing item never cancels its siblings; once all items are done, the first failure (in input order) is returned.
    pub async fn run<I, F, Fut>(&self, items: I, action: F) -> Result<usize>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut outcomes: Vec<(usize, Result<()>)> = stream::iter(items)
            .map(action)
            .enumerate()
            .map(|(index, work)| async move { (index, work.await) })
            .buffer_unordered(self.limit)
            .collect()
            .await;

        let completed = outcomes.len();
        outcomes.sort_by_key(|(index, _)| *index);
        for (_, outcome) in outcomes {
            outcome?;
        }
        Ok(completed)
    }
}
