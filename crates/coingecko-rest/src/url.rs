//! Request URL construction
//!
//! Turns an operation's path template plus call arguments into the URL to
//! request, e.g. `/coins/{id}/market_chart` with `["bitcoin", "usd", 1]`
//! becomes `.../coins/bitcoin/market_chart?vs_currency=usd&days=1`.

use crate::endpoints::registry::OperationSpec;
use coingecko_types::{value_to_string, CallArgs, InvokeError};
use reqwest::Url;

/// Materialize the URL for one call of `spec`
///
/// Positional arguments fill the `{param}` tokens of the path first, then the
/// required query parameters in declaration order. Required query parameters
/// not given positionally must be present as keyword arguments.
pub fn materialize_url(
    base: &Url,
    spec: &OperationSpec,
    args: &CallArgs,
) -> Result<Url, InvokeError> {
    let path_params = spec.path_params();
    let positional = args.path_segments();

    if positional.len() < path_params.len() {
        return Err(InvokeError::InvalidRequest(format!(
            "{} expects path arguments {:?}, got {}",
            spec.name,
            path_params,
            positional.len()
        )));
    }
    if positional.len() > path_params.len() + spec.required_query.len() {
        return Err(InvokeError::InvalidRequest(format!(
            "{} takes at most {} positional arguments, got {}",
            spec.name,
            path_params.len() + spec.required_query.len(),
            positional.len()
        )));
    }

    let (path_values, query_values) = positional.split_at(path_params.len());

    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            InvokeError::InvalidRequest(format!("base URL {} cannot carry a path", base))
        })?;
        segments.pop_if_empty();

        let mut values = path_values.iter();
        for segment in spec.path.split('/').filter(|s| !s.is_empty()) {
            if segment.starts_with('{') && segment.ends_with('}') {
                // length was checked above
                if let Some(value) = values.next() {
                    segments.push(value);
                }
            } else {
                segments.push(segment);
            }
        }
    }

    let mut pairs: Vec<(String, String)> = Vec::new();
    for (i, name) in spec.required_query.iter().enumerate() {
        match query_values.get(i) {
            Some(value) => pairs.push((name.to_string(), value.clone())),
            None => match args.get(name) {
                Some(value) => pairs.push((name.to_string(), value_to_string(value))),
                None => {
                    return Err(InvokeError::InvalidRequest(format!(
                        "{} requires query parameter {}",
                        spec.name, name
                    )))
                }
            },
        }
    }
    pairs.extend(
        args.query_pairs()
            .into_iter()
            .filter(|(k, _)| !spec.required_query.contains(&k.as_str())),
    );

    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url)
}
