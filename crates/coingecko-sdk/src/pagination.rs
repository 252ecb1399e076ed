//! Page range planning and page count inference
//!
//! A call on a pagination-capable operation may ask for a single page, a
//! bounded range (`page_start` and `page_end`) or an unbounded range
//! (`page_start` only). Unbounded ranges are resolved at drain time: the
//! first page is fetched with its response metadata, and the `Per-Page` and
//! `Total` headers tell how many pages remain.

use crate::error::{GeckoError, GeckoResult};
use crate::hooks::{Hooks, PageRangeInfo};
use crate::queue::{CallQueue, QueuedCall};
use crate::results::ResultsCache;
use crate::retry::RetryExecutor;
use coingecko_types::{CallArgs, Value, PAGE, PAGE_END, PAGE_START, PER_PAGE_HEADER, TOTAL_HEADER};
use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::debug;

/// Misuse of page range arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageRangeError {
    #[error("page_start must be defined")]
    StartUndefined,

    #[error("page_start must be int")]
    StartNotInt,

    #[error("page_end was specified but was not an int")]
    EndNotInt,

    #[error("page_end: {end} less than page_start: {start}")]
    EndBeforeStart { start: i64, end: i64 },

    #[error("page_start: {start} was less than or equal to 0")]
    StartNotPositive { start: i64 },

    /// Page ranges were requested from an operation without pagination
    #[error("{operation} does not support page_start/page_end")]
    NotPaginated { operation: String },

    /// Page ranges only make sense for queued calls
    #[error("page_start/page_end require a qid")]
    RequiresQid,
}

/// A validated page range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u64,
    /// Last page, inclusive; `None` when it must be inferred
    pub end: Option<u64>,
}

impl PageRange {
    /// Pages of a bounded range
    pub fn pages(&self) -> Option<RangeInclusive<u64>> {
        self.end.map(|end| self.start..=end)
    }
}

/// Validate user supplied `page_start` and `page_end`
///
/// Rules are checked in order and the first failure wins: `page_start`
/// defined, `page_start` integral, `page_end` integral if given,
/// `page_end >= page_start`, `page_start > 0`. JSON `null` counts as absent.
pub fn validate_page_range(
    page_start: Option<&Value>,
    page_end: Option<&Value>,
) -> Result<PageRange, PageRangeError> {
    let page_start = page_start.filter(|v| !v.is_null());
    let page_end = page_end.filter(|v| !v.is_null());

    let start = page_start
        .ok_or(PageRangeError::StartUndefined)?
        .as_i64()
        .ok_or(PageRangeError::StartNotInt)?;
    let end = match page_end {
        Some(value) => Some(value.as_i64().ok_or(PageRangeError::EndNotInt)?),
        None => None,
    };
    if let Some(end) = end {
        if end < start {
            return Err(PageRangeError::EndBeforeStart { start, end });
        }
    }
    if start <= 0 {
        return Err(PageRangeError::StartNotPositive { start });
    }

    // start > 0 and end >= start, so both fit in u64
    Ok(PageRange {
        start: start as u64,
        end: end.map(|end| end as u64),
    })
}

/// How one call on an operation should be queued
#[derive(Debug, Clone, PartialEq)]
pub enum PagePlan {
    /// One call; either no paging arguments or an explicit `page`
    Single(CallArgs),
    /// One call per page in the range
    Bounded {
        args: CallArgs,
        pages: RangeInclusive<u64>,
    },
    /// One call for `start` now, the rest once the page count is known
    Unbounded { args: CallArgs, start: u64 },
}

impl PagePlan {
    /// Plan a call, consuming the `page_start`/`page_end` arguments
    ///
    /// An explicit `page` wins over a page range. Operations that are not
    /// pagination-capable reject page range arguments.
    pub fn build(
        operation: &str,
        mut args: CallArgs,
        paginated: bool,
    ) -> Result<Self, PageRangeError> {
        let page_start = args.take_kwarg(PAGE_START).filter(|v| !v.is_null());
        let page_end = args.take_kwarg(PAGE_END).filter(|v| !v.is_null());
        let has_page = args.get(PAGE).map_or(false, |v| !v.is_null());

        if page_start.is_none() && page_end.is_none() {
            return Ok(Self::Single(args));
        }
        if !paginated {
            return Err(PageRangeError::NotPaginated {
                operation: operation.to_string(),
            });
        }
        if has_page {
            return Ok(Self::Single(args));
        }

        let range = validate_page_range(page_start.as_ref(), page_end.as_ref())?;
        Ok(match range.pages() {
            Some(pages) => Self::Bounded { args, pages },
            None => Self::Unbounded {
                args,
                start: range.start,
            },
        })
    }

    /// Whether this plan produces a page range query
    pub fn is_page_range(&self) -> bool {
        !matches!(self, Self::Single(_))
    }
}

/// Number of pages needed for `total` items at `per_page` items per page
pub fn page_count(total: u64, per_page: u64) -> Option<u64> {
    if per_page == 0 {
        return None;
    }
    Some(total.div_ceil(per_page))
}

/// Resolve one unbounded page range query
///
/// Executes the single queued call for `qid` with response metadata, records
/// its result in `cache` so it is not executed again, and queues one call
/// for each remaining page.
pub(crate) async fn resolve_pending(
    qid: &str,
    queue: &mut CallQueue,
    executor: &RetryExecutor,
    cache: &mut ResultsCache,
    hooks: &Hooks,
) -> GeckoResult<()> {
    let call: QueuedCall = match queue.calls(qid) {
        Some([call]) => call.clone(),
        Some(calls) => {
            return Err(GeckoError::Internal(format!(
                "infer page_end was true but {} calls are queued for {}",
                calls.len(),
                qid
            )))
        }
        None => {
            return Err(GeckoError::Internal(format!(
                "infer page_end was true but no call is queued for {}",
                qid
            )))
        }
    };
    let page_start = call.page().ok_or_else(|| {
        GeckoError::Internal(format!("first call of page range query {} has no page", qid))
    })?;

    let payload = executor.execute(&call, true).await?;
    let meta = payload.meta.ok_or_else(|| GeckoError::PaginationHeaders {
        qid: qid.to_string(),
        message: "response carried no metadata".to_string(),
    })?;
    cache.put_inferred_first(qid, page_start, payload.body);

    let header_error = |message: String| GeckoError::PaginationHeaders {
        qid: qid.to_string(),
        message,
    };
    let per_page = meta.header_u64(PER_PAGE_HEADER).map_err(header_error)?;
    let total = meta.header_u64(TOTAL_HEADER).map_err(header_error)?;
    let page_end = page_count(total, per_page)
        .ok_or_else(|| header_error(format!("{} header was 0", PER_PAGE_HEADER)))?;

    debug!(
        "page range query: {} page_start: {:4} page_end: {:4} per_page: {:4} total: {}",
        qid, page_start, page_end, per_page, total
    );
    hooks.emit_page_range_resolved(&PageRangeInfo {
        qid: qid.to_string(),
        page_start,
        page_end,
        per_page,
        total,
    });

    // page_start is already done
    for page in page_start.saturating_add(1)..=page_end {
        queue.enqueue(qid, call.for_page(page), false);
    }
    Ok(())
}
