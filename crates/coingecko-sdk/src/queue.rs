//! Ordered queue of deferred calls keyed by call identifier

use coingecko_types::{CallArgs, Endpoint};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// One deferred endpoint invocation
#[derive(Clone)]
pub struct QueuedCall {
    /// Endpoint to invoke
    pub endpoint: Arc<dyn Endpoint>,
    /// Arguments for the invocation
    pub args: CallArgs,
}

impl QueuedCall {
    pub fn new(endpoint: Arc<dyn Endpoint>, args: CallArgs) -> Self {
        Self { endpoint, args }
    }

    /// Operation name of the endpoint
    pub fn operation(&self) -> &str {
        self.endpoint.name()
    }

    /// Page this call requests, if any
    pub fn page(&self) -> Option<u64> {
        self.args.page_number()
    }

    /// Same call for a different page
    pub fn for_page(&self, page: u64) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            args: self.args.with_page(page),
        }
    }
}

impl fmt::Debug for QueuedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedCall")
            .field("operation", &self.operation())
            .field("args", &self.args)
            .finish()
    }
}

/// Insertion-ordered multimap from qid to queued calls
///
/// Both the order of qids and the order of calls within a qid are
/// preserved; they define execution order.
#[derive(Debug, Default)]
pub struct CallQueue {
    order: Vec<String>,
    calls: HashMap<String, Vec<QueuedCall>>,
}

impl CallQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call under `qid`
    ///
    /// With `dup_check` set, queueing under a qid that already holds calls
    /// logs a warning and returns `true`. The earlier calls stay queued; for
    /// a single-call qid the most recent call's result is the one kept.
    pub fn enqueue(&mut self, qid: &str, call: QueuedCall, dup_check: bool) -> bool {
        let duplicate = dup_check && self.calls.contains_key(qid);
        if duplicate {
            warn!(
                "Warning: multiple calls queued with identical qid: {}. \
                 Most recent call will overwrite old call.",
                qid
            );
        }

        debug!(qid, operation = call.operation(), page = ?call.page(), "Queueing call");

        match self.calls.get_mut(qid) {
            Some(list) => list.push(call),
            None => {
                self.order.push(qid.to_string());
                self.calls.insert(qid.to_string(), vec![call]);
            }
        }
        duplicate
    }

    /// Calls queued under `qid`, in insertion order
    pub fn calls(&self, qid: &str) -> Option<&[QueuedCall]> {
        self.calls.get(qid).map(Vec::as_slice)
    }

    /// Whether any call is queued under `qid`
    pub fn contains(&self, qid: &str) -> bool {
        self.calls.contains_key(qid)
    }

    /// Iterate qids and their calls in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[QueuedCall])> {
        self.order.iter().filter_map(move |qid| {
            self.calls
                .get(qid)
                .map(|calls| (qid.as_str(), calls.as_slice()))
        })
    }

    /// Total number of queued calls across all qids
    pub fn len(&self) -> usize {
        self.calls.values().map(Vec::len).sum()
    }

    /// Number of distinct qids
    pub fn qid_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
