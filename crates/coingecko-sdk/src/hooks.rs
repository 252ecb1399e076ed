//! Observability hooks for batch execution
//!
//! This module provides callbacks for observing what the request engine does
//! without parsing its logs. Useful for progress bars, metrics, and tests.
//!
//! # Example
//!
//! ```
//! use coingecko_sdk::hooks::Hooks;
//!
//! let hooks = Hooks::new()
//!     .on_progress(|progress| {
//!         println!("{}% ({}/{})", progress.percent, progress.completed, progress.total);
//!     })
//!     .on_rate_limited(|attempt, delay| {
//!         eprintln!("Rate limited (attempt {}), waiting {:?}", attempt, delay);
//!     });
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Progress observation emitted while draining a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Completed share of the batch, floored to a whole percent
    pub percent: u32,
    /// Calls completed so far
    pub completed: usize,
    /// Calls in the batch
    pub total: usize,
}

/// Page range discovered from a first page's headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRangeInfo {
    /// Call identifier of the page range query
    pub qid: String,
    /// First page requested
    pub page_start: u64,
    /// Last page, computed as `ceil(total / per_page)`
    pub page_end: u64,
    /// Items per page reported by the API
    pub per_page: u64,
    /// Total items reported by the API
    pub total: u64,
}

/// Type alias for hook callbacks
pub type ProgressHook = Arc<dyn Fn(&Progress) + Send + Sync>;
pub type RateLimitedHook = Arc<dyn Fn(u32, Duration) + Send + Sync>;
pub type DuplicateQidHook = Arc<dyn Fn(&str) + Send + Sync>;
pub type PageRangeHook = Arc<dyn Fn(&PageRangeInfo) + Send + Sync>;

/// Observability hooks container
///
/// All hooks are optional and executed synchronously on the calling task.
#[derive(Clone, Default)]
pub struct Hooks {
    pub(crate) on_progress: Option<ProgressHook>,
    pub(crate) on_rate_limited: Option<RateLimitedHook>,
    pub(crate) on_duplicate_qid: Option<DuplicateQidHook>,
    pub(crate) on_page_range_resolved: Option<PageRangeHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_progress", &self.on_progress.as_ref().map(|_| "..."))
            .field("on_rate_limited", &self.on_rate_limited.as_ref().map(|_| "..."))
            .field("on_duplicate_qid", &self.on_duplicate_qid.as_ref().map(|_| "..."))
            .field(
                "on_page_range_resolved",
                &self.on_page_range_resolved.as_ref().map(|_| "..."),
            )
            .finish()
    }
}

impl Hooks {
    /// Create a new empty hooks container
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for progress observations
    ///
    /// Called whenever batch progress crosses the next progress interval.
    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(&Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(f));
        self
    }

    /// Register a callback for rate-limited attempts
    ///
    /// Called before each backoff sleep with the number of the failed
    /// attempt (1-indexed) and the delay about to be slept.
    pub fn on_rate_limited<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, Duration) + Send + Sync + 'static,
    {
        self.on_rate_limited = Some(Arc::new(f));
        self
    }

    /// Register a callback for qids reused by independent calls
    pub fn on_duplicate_qid<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_duplicate_qid = Some(Arc::new(f));
        self
    }

    /// Register a callback for unbounded page ranges whose end was discovered
    pub fn on_page_range_resolved<F>(mut self, f: F) -> Self
    where
        F: Fn(&PageRangeInfo) + Send + Sync + 'static,
    {
        self.on_page_range_resolved = Some(Arc::new(f));
        self
    }

    pub(crate) fn emit_progress(&self, progress: &Progress) {
        if let Some(hook) = &self.on_progress {
            hook(progress);
        }
    }

    pub(crate) fn emit_rate_limited(&self, attempt: u32, delay: Duration) {
        if let Some(hook) = &self.on_rate_limited {
            hook(attempt, delay);
        }
    }

    pub(crate) fn emit_duplicate_qid(&self, qid: &str) {
        if let Some(hook) = &self.on_duplicate_qid {
            hook(qid);
        }
    }

    pub(crate) fn emit_page_range_resolved(&self, info: &PageRangeInfo) {
        if let Some(hook) = &self.on_page_range_resolved {
            hook(info);
        }
    }
}
