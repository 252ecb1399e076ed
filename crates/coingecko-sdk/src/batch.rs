//! Batch state and the drain that executes it
//!
//! [`BatchState`] holds everything queued since the last drain. The client
//! moves it out with [`std::mem::take`] before [`BatchRunner::drain`] starts,
//! so the client is empty again however the drain ends.

use crate::error::GeckoResult;
use crate::hooks::{Hooks, Progress};
use crate::pagination::{resolve_pending, PagePlan};
use crate::queue::{CallQueue, QueuedCall};
use crate::results::{BatchResults, ResultsCache};
use crate::retry::RetryExecutor;
use coingecko_types::{CallArgs, Endpoint};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

/// Default progress granularity, in percent
pub const DEFAULT_PROGRESS_INTERVAL: u32 = 10;

/// Calls queued since the last drain
#[derive(Debug, Default)]
pub struct BatchState {
    queue: CallQueue,
    page_range_qids: HashSet<String>,
    pending_inference: Vec<String>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a call under `qid`, expanding page ranges
    ///
    /// A bounded range queues one call per page; only the first is checked
    /// for a reused qid. An unbounded range queues its first page and marks
    /// the qid for page count inference.
    pub fn enqueue(
        &mut self,
        qid: &str,
        endpoint: Arc<dyn Endpoint>,
        args: CallArgs,
        paginated: bool,
        hooks: &Hooks,
    ) -> GeckoResult<()> {
        let plan = PagePlan::build(endpoint.name(), args, paginated)?;

        match plan {
            PagePlan::Single(args) => {
                self.push(qid, QueuedCall::new(endpoint, args), true, hooks);
            }
            PagePlan::Bounded { args, pages } => {
                self.page_range_qids.insert(qid.to_string());
                let first = QueuedCall::new(endpoint, args);
                for (i, page) in pages.enumerate() {
                    self.push(qid, first.for_page(page), i == 0, hooks);
                }
            }
            PagePlan::Unbounded { args, start } => {
                self.page_range_qids.insert(qid.to_string());
                let call = QueuedCall::new(endpoint, args.with_page(start));
                self.push(qid, call, true, hooks);
                if !self.pending_inference.iter().any(|q| q == qid) {
                    self.pending_inference.push(qid.to_string());
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, qid: &str, call: QueuedCall, dup_check: bool, hooks: &Hooks) {
        if self.queue.enqueue(qid, call, dup_check) {
            hooks.emit_duplicate_qid(qid);
        }
    }

    /// Queued calls, before page count inference
    pub fn queue(&self) -> &CallQueue {
        &self.queue
    }

    /// Whether `qid` names a page range query
    pub fn is_page_range(&self, qid: &str) -> bool {
        self.page_range_qids.contains(qid)
    }

    /// Qids whose last page is not known yet, in queueing order
    pub fn pending_inference(&self) -> &[String] {
        &self.pending_inference
    }

    /// Total queued calls
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Emits a progress observation each time another interval is crossed
#[derive(Debug)]
struct ProgressTracker {
    total: usize,
    completed: usize,
    interval: f64,
    last: f64,
}

impl ProgressTracker {
    fn new(total: usize, interval: u32) -> Self {
        Self {
            total,
            completed: 0,
            interval: f64::from(interval),
            last: 0.0,
        }
    }

    /// Count one call; returns an observation when a threshold is crossed
    fn advance(&mut self) -> Option<Progress> {
        self.completed += 1;
        if self.total == 0 {
            return None;
        }
        let progress = self.completed as f64 / self.total as f64 * 100.0;
        if progress < self.last + self.interval {
            return None;
        }
        self.last = progress;
        Some(Progress {
            percent: progress.floor() as u32,
            completed: self.completed,
            total: self.total,
        })
    }
}

/// Drains a [`BatchState`] into [`BatchResults`]
#[derive(Debug, Clone)]
pub struct BatchRunner {
    executor: RetryExecutor,
    hooks: Hooks,
    progress_interval: u32,
}

impl BatchRunner {
    pub fn new(executor: RetryExecutor, hooks: Hooks, progress_interval: u32) -> Self {
        Self {
            executor,
            hooks,
            progress_interval,
        }
    }

    /// Executor used for every call of the batch
    pub fn executor(&self) -> &RetryExecutor {
        &self.executor
    }

    /// Execute every call in `state`
    ///
    /// Unbounded page ranges are resolved first, then calls run one at a time
    /// in queue order. The first fatal error aborts the drain and partial
    /// results are dropped.
    #[instrument(skip(self, state), fields(calls = state.len()))]
    pub async fn drain(&self, state: BatchState) -> GeckoResult<BatchResults> {
        let BatchState {
            mut queue,
            page_range_qids,
            pending_inference,
        } = state;
        let mut cache = ResultsCache::new();

        for qid in &pending_inference {
            resolve_pending(qid, &mut queue, &self.executor, &mut cache, &self.hooks).await?;
        }

        let total = queue.len();
        info!("Begin executing {} queued calls", total);
        let mut tracker = ProgressTracker::new(total, self.progress_interval);

        for (qid, calls) in queue.iter() {
            for call in calls {
                // first pages of inferred ranges were fetched above
                if !cache.is_satisfied(qid, call.page()) {
                    let payload = self.executor.execute(call, false).await?;
                    if page_range_qids.contains(qid) {
                        cache.put_page(qid, payload.body);
                    } else {
                        cache.put(qid, payload.body);
                    }
                }

                if let Some(progress) = tracker.advance() {
                    info!("Progress: {}%", progress.percent);
                    self.hooks.emit_progress(&progress);
                }
            }
        }

        Ok(cache.finish(queue.iter().map(|(qid, _)| qid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageRangeError;
    use crate::testing::ScriptedEndpoint;
    use crate::GeckoError;

    fn markets() -> Arc<dyn Endpoint> {
        Arc::new(ScriptedEndpoint::new("coins_markets"))
    }

    fn pages(state: &BatchState, qid: &str) -> Vec<Option<u64>> {
        state
            .queue()
            .calls(qid)
            .map(|calls| calls.iter().map(QueuedCall::page).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_bounded_range_expands() {
        let mut state = BatchState::new();
        let args = CallArgs::new().arg("usd").page_start(2).page_end(4);
        state.enqueue("m", markets(), args, true, &Hooks::new()).unwrap();

        assert_eq!(pages(&state, "m"), vec![Some(2), Some(3), Some(4)]);
        assert!(state.is_page_range("m"));
        assert!(state.pending_inference().is_empty());
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_unbounded_range_pending() {
        let mut state = BatchState::new();
        state
            .enqueue("m", markets(), CallArgs::new().page_start(3), true, &Hooks::new())
            .unwrap();

        assert_eq!(pages(&state, "m"), vec![Some(3)]);
        assert_eq!(state.pending_inference(), &["m".to_string()]);
    }

    #[test]
    fn test_single_page_not_a_range() {
        let mut state = BatchState::new();
        state
            .enqueue("m", markets(), CallArgs::new().page(5), true, &Hooks::new())
            .unwrap();

        assert_eq!(pages(&state, "m"), vec![Some(5)]);
        assert!(!state.is_page_range("m"));
    }

    #[test]
    fn test_invalid_range_queues_nothing() {
        let mut state = BatchState::new();
        let err = state
            .enqueue("m", markets(), CallArgs::new().page_start(3).page_end(1), true, &Hooks::new())
            .unwrap_err();

        assert!(matches!(
            err,
            GeckoError::PageRange(PageRangeError::EndBeforeStart { start: 3, end: 1 })
        ));
        assert!(state.is_empty());
    }

    #[test]
    fn test_duplicate_hook_only_for_independent_calls() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let hooks = Hooks::new().on_duplicate_qid(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut state = BatchState::new();
        let range = CallArgs::new().page_start(1).page_end(5);
        state.enqueue("m", markets(), range, true, &hooks).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        state.enqueue("m", markets(), CallArgs::new(), true, &hooks).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_progress_thresholds() {
        let mut tracker = ProgressTracker::new(4, 10);
        let percents: Vec<_> = (0..4)
            .filter_map(|_| tracker.advance())
            .map(|p| p.percent)
            .collect();
        assert_eq!(percents, vec![25, 50, 75, 100]);

        // the threshold moves to the observed value, not the interval mark
        let mut tracker = ProgressTracker::new(3, 50);
        let percents: Vec<_> = (0..3)
            .filter_map(|_| tracker.advance())
            .map(|p| p.percent)
            .collect();
        assert_eq!(percents, vec![66]);
    }

    #[test]
    fn test_progress_skips_between_thresholds() {
        let mut tracker = ProgressTracker::new(8, 25);
        let observed: Vec<_> = (0..8).filter_map(|_| tracker.advance()).collect();
        let completed: Vec<_> = observed.iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![2, 4, 6, 8]);
        assert_eq!(observed[3].percent, 100);
        assert_eq!(observed[3].total, 8);
    }
}
