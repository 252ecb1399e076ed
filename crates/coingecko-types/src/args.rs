//! Call arguments for API operations
//!
//! Every CoinGecko operation takes positional path arguments (e.g. the coin
//! id in `/coins/{id}/tickers`) and keyword query arguments. A handful of
//! keywords are reserved by the request engine rather than sent to the API:
//! `qid`, `page_start` and `page_end`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keyword naming the caller's call identifier
pub const QID: &str = "qid";
/// Keyword selecting a single page
pub const PAGE: &str = "page";
/// Keyword selecting the first page of a page range
pub const PAGE_START: &str = "page_start";
/// Keyword selecting the last page of a page range
pub const PAGE_END: &str = "page_end";

/// Arguments for one API operation call
///
/// Keyword values are kept as JSON values so that argument validation
/// (e.g. "page_start must be an integer") happens at the point the engine
/// interprets them, exactly like the API would.
///
/// # Example
///
/// ```
/// use coingecko_types::CallArgs;
///
/// let args = CallArgs::new()
///     .arg("bitcoin")
///     .kwarg("vs_currency", "usd")
///     .page_start(1)
///     .qid("btc-tickers");
///
/// assert_eq!(args.positional().len(), 1);
/// assert_eq!(args.get_qid(), Some("btc-tickers".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional (path) argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword (query) argument, replacing any previous value
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Set the call identifier, which makes the call queued instead of immediate
    pub fn qid(mut self, qid: impl Into<String>) -> Self {
        self.keyword.insert(QID.to_string(), Value::String(qid.into()));
        self
    }

    /// Request a single page
    pub fn page(self, page: impl Into<Value>) -> Self {
        self.kwarg(PAGE, page)
    }

    /// Request a page range starting at `page_start`
    pub fn page_start(self, page_start: impl Into<Value>) -> Self {
        self.kwarg(PAGE_START, page_start)
    }

    /// Bound a page range at `page_end` (inclusive)
    pub fn page_end(self, page_end: impl Into<Value>) -> Self {
        self.kwarg(PAGE_END, page_end)
    }

    /// Append another argument set
    ///
    /// Positional arguments of `other` follow ours; its keyword arguments
    /// win on conflicts.
    pub fn merge(mut self, other: CallArgs) -> Self {
        self.positional.extend(other.positional);
        self.keyword.extend(other.keyword);
        self
    }

    /// Positional arguments, in order
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments, ordered by name
    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    /// Look up a keyword argument
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }

    /// Remove a keyword argument, returning its value
    pub fn take_kwarg(&mut self, name: &str) -> Option<Value> {
        self.keyword.remove(name)
    }

    /// Remove the call identifier
    ///
    /// Non-string identifiers are stringified, so `qid(7)` and `qid("7")`
    /// address the same queued call.
    pub fn take_qid(&mut self) -> Option<String> {
        self.take_kwarg(QID).map(|v| value_to_string(&v))
    }

    /// The call identifier, if present
    pub fn get_qid(&self) -> Option<String> {
        self.get(QID).map(value_to_string)
    }

    /// The requested page as an integer, if present and integral
    pub fn page_number(&self) -> Option<u64> {
        self.get(PAGE).and_then(Value::as_u64)
    }

    /// Copy of these arguments with `page` set to `page`
    pub fn with_page(&self, page: u64) -> Self {
        let mut args = self.clone();
        args.keyword.insert(PAGE.to_string(), Value::from(page));
        args
    }

    /// Keyword arguments rendered as query-string pairs
    ///
    /// Reserved engine keywords are never rendered; `null` values are skipped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.keyword
            .iter()
            .filter(|(k, _)| !is_reserved(k))
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect()
    }

    /// Positional arguments rendered as strings
    pub fn path_segments(&self) -> Vec<String> {
        self.positional.iter().map(value_to_string).collect()
    }
}

/// Whether a keyword is consumed by the request engine
pub fn is_reserved(name: &str) -> bool {
    matches!(name, QID | PAGE_START | PAGE_END)
}

/// Render a JSON scalar the way it appears in a URL
///
/// Strings are rendered without quotes, arrays are comma-joined
/// (CoinGecko's convention for multi-valued parameters).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
