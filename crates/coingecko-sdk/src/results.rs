//! Results of a drained batch

use coingecko_types::Value;
use std::collections::{HashMap, HashSet};

/// Result stored under one qid
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Body of a plain call; the last call queued under the qid wins
    Single(Value),
    /// Bodies of a page range query, one per page in page order
    Pages(Vec<Value>),
}

impl QueryResult {
    /// Body of a plain call
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Self::Single(value) => Some(value),
            Self::Pages(_) => None,
        }
    }

    /// Bodies of a page range query
    pub fn as_pages(&self) -> Option<&[Value]> {
        match self {
            Self::Single(_) => None,
            Self::Pages(pages) => Some(pages),
        }
    }

    /// Collapse into a single JSON value; pages become an array
    pub fn into_value(self) -> Value {
        match self {
            Self::Single(value) => value,
            Self::Pages(pages) => Value::Array(pages),
        }
    }
}

/// Mapping from qid to result, returned by
/// [`CoinGeckoClient::execute_queued`](crate::CoinGeckoClient::execute_queued)
///
/// Iteration follows the order in which qids were first queued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResults {
    order: Vec<String>,
    results: HashMap<String, QueryResult>,
}

impl BatchResults {
    pub fn get(&self, qid: &str) -> Option<&QueryResult> {
        self.results.get(qid)
    }

    /// Body of a plain call queued under `qid`
    pub fn single(&self, qid: &str) -> Option<&Value> {
        self.get(qid).and_then(QueryResult::as_single)
    }

    /// Pages of a page range query queued under `qid`
    pub fn pages(&self, qid: &str) -> Option<&[Value]> {
        self.get(qid).and_then(QueryResult::as_pages)
    }

    pub fn contains(&self, qid: &str) -> bool {
        self.results.contains_key(qid)
    }

    /// Qids in queue order
    pub fn qids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(qid, result)` pairs in queue order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryResult)> {
        self.order
            .iter()
            .filter_map(|qid| self.results.get(qid).map(|result| (qid.as_str(), result)))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Drop the ordering and keep only the map
    pub fn into_inner(self) -> HashMap<String, QueryResult> {
        self.results
    }
}

impl IntoIterator for BatchResults {
    type Item = (String, QueryResult);
    type IntoIter = std::vec::IntoIter<(String, QueryResult)>;

    fn into_iter(self) -> Self::IntoIter {
        let mut results = self.results;
        self.order
            .into_iter()
            .filter_map(|qid| results.remove(&qid).map(|result| (qid, result)))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// Accumulates results while a batch drains
///
/// Tracks which `(qid, page)` pairs were already fetched while inferring a
/// page range, so the drain does not fetch them again.
#[derive(Debug, Default)]
pub(crate) struct ResultsCache {
    results: HashMap<String, QueryResult>,
    satisfied: HashSet<(String, u64)>,
}

impl ResultsCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store a plain call's body, replacing any earlier one
    pub(crate) fn put(&mut self, qid: &str, body: Value) {
        self.results.insert(qid.to_string(), QueryResult::Single(body));
    }

    /// Append a page to a page range query
    pub(crate) fn put_page(&mut self, qid: &str, body: Value) {
        match self.results.get_mut(qid) {
            Some(QueryResult::Pages(pages)) => pages.push(body),
            _ => {
                self.results
                    .insert(qid.to_string(), QueryResult::Pages(vec![body]));
            }
        }
    }

    /// Store the first page fetched during page range inference
    pub(crate) fn put_inferred_first(&mut self, qid: &str, page: u64, body: Value) {
        self.put_page(qid, body);
        self.satisfied.insert((qid.to_string(), page));
    }

    /// Whether `(qid, page)` was fetched during inference
    pub(crate) fn is_satisfied(&self, qid: &str, page: Option<u64>) -> bool {
        match page {
            Some(page) => self.satisfied.contains(&(qid.to_string(), page)),
            None => false,
        }
    }

    /// Close the batch, ordering results by `order`
    ///
    /// Qids in `order` without a stored result are skipped.
    pub(crate) fn finish<'a>(self, order: impl IntoIterator<Item = &'a str>) -> BatchResults {
        let order = order
            .into_iter()
            .filter(|qid| self.results.contains_key(*qid))
            .map(str::to_string)
            .collect();
        BatchResults {
            order,
            results: self.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_last_write_wins() {
        let mut cache = ResultsCache::new();
        cache.put("q", json!(1));
        cache.put("q", json!(2));

        let results = cache.finish(["q"]);
        assert_eq!(results.single("q"), Some(&json!(2)));
        assert!(results.pages("q").is_none());
    }

    #[test]
    fn test_pages_accumulate() {
        let mut cache = ResultsCache::new();
        cache.put_inferred_first("markets", 1, json!({"page": 1}));
        cache.put_page("markets", json!({"page": 2}));

        assert!(cache.is_satisfied("markets", Some(1)));
        assert!(!cache.is_satisfied("markets", Some(2)));
        assert!(!cache.is_satisfied("markets", None));

        let results = cache.finish(["markets"]);
        assert_eq!(
            results.pages("markets"),
            Some(&[json!({"page": 1}), json!({"page": 2})][..])
        );
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_finish_orders_by_queue() {
        let mut cache = ResultsCache::new();
        // inference stores range pages before any plain call runs
        cache.put_inferred_first("markets", 1, json!([]));
        cache.put("ping", json!({}));
        cache.put("coin", json!({}));

        let results = cache.finish(["coin", "missing", "markets", "ping"]);
        assert_eq!(results.qids().collect::<Vec<_>>(), vec!["coin", "markets", "ping"]);
        assert_eq!(
            results.iter().map(|(qid, _)| qid).collect::<Vec<_>>(),
            vec!["coin", "markets", "ping"]
        );
        let owned: Vec<String> = results.into_iter().map(|(qid, _)| qid).collect();
        assert_eq!(owned, vec!["coin", "markets", "ping"]);
    }

    #[test]
    fn test_into_value() {
        let pages = QueryResult::Pages(vec![json!(1), json!(2)]);
        assert_eq!(pages.into_value(), json!([1, 2]));
        assert_eq!(QueryResult::Single(json!("x")).into_value(), json!("x"));
    }
}
