//! Registry of public CoinGecko v3 GET operations
//!
//! Each entry names an operation, its path template and its query
//! parameters. Required query parameters may be supplied positionally after
//! the path arguments, in the order listed here.

/// Static description of one API operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    /// Operation name used for dispatch
    pub name: &'static str,
    /// Path template relative to the API root, e.g. `/coins/{id}/tickers`
    pub path: &'static str,
    /// Required query parameters, in positional order
    pub required_query: &'static [&'static str],
    /// Optional query parameters
    pub optional_query: &'static [&'static str],
}

impl OperationSpec {
    /// Whether the operation accepts the named query parameter
    pub fn accepts(&self, param: &str) -> bool {
        self.required_query.contains(&param) || self.optional_query.contains(&param)
    }

    /// Pagination-capable operations accept both `page` and `per_page`
    pub fn is_paginated(&self) -> bool {
        self.accepts("page") && self.accepts("per_page")
    }

    /// Names of the `{param}` tokens in the path template, in order
    pub fn path_params(&self) -> Vec<&'static str> {
        self.path
            .split('/')
            .filter_map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
            })
            .collect()
    }
}

macro_rules! op {
    ($name:literal, $path:literal) => {
        op!($name, $path, [], [])
    };
    ($name:literal, $path:literal, [$($req:literal),*], [$($opt:literal),*]) => {
        OperationSpec {
            name: $name,
            path: $path,
            required_query: &[$($req),*],
            optional_query: &[$($opt),*],
        }
    };
}

/// Every public GET operation of the v3 API
pub static OPERATIONS: &[OperationSpec] = &[
    // ping
    op!("ping", "/ping"),
    // simple
    op!(
        "simple_price",
        "/simple/price",
        ["ids", "vs_currencies"],
        [
            "include_market_cap",
            "include_24hr_vol",
            "include_24hr_change",
            "include_last_updated_at",
            "precision"
        ]
    ),
    op!(
        "simple_token_price",
        "/simple/token_price/{id}",
        ["contract_addresses", "vs_currencies"],
        [
            "include_market_cap",
            "include_24hr_vol",
            "include_24hr_change",
            "include_last_updated_at",
            "precision"
        ]
    ),
    op!("simple_supported_vs_currencies", "/simple/supported_vs_currencies"),
    // coins
    op!("coins_list", "/coins/list", [], ["include_platform"]),
    op!(
        "coins_markets",
        "/coins/markets",
        ["vs_currency"],
        [
            "ids",
            "category",
            "order",
            "per_page",
            "page",
            "sparkline",
            "price_change_percentage",
            "locale",
            "precision"
        ]
    ),
    op!(
        "coins_id",
        "/coins/{id}",
        [],
        [
            "localization",
            "tickers",
            "market_data",
            "community_data",
            "developer_data",
            "sparkline"
        ]
    ),
    op!(
        "coins_id_tickers",
        "/coins/{id}/tickers",
        [],
        ["exchange_ids", "include_exchange_logo", "page", "order", "depth"]
    ),
    op!(
        "coins_id_history",
        "/coins/{id}/history",
        ["date"],
        ["localization"]
    ),
    op!(
        "coins_id_market_chart",
        "/coins/{id}/market_chart",
        ["vs_currency", "days"],
        ["interval", "precision"]
    ),
    op!(
        "coins_id_market_chart_range",
        "/coins/{id}/market_chart/range",
        ["vs_currency", "from", "to"],
        ["precision"]
    ),
    op!(
        "coins_id_ohlc",
        "/coins/{id}/ohlc",
        ["vs_currency", "days"],
        ["precision"]
    ),
    // contract
    op!("coins_contract", "/coins/{id}/contract/{contract_address}"),
    op!(
        "coins_contract_market_chart",
        "/coins/{id}/contract/{contract_address}/market_chart",
        ["vs_currency", "days"],
        ["precision"]
    ),
    op!(
        "coins_contract_market_chart_range",
        "/coins/{id}/contract/{contract_address}/market_chart/range",
        ["vs_currency", "from", "to"],
        ["precision"]
    ),
    // asset platforms
    op!("asset_platforms", "/asset_platforms", [], ["filter"]),
    // categories
    op!("coins_categories_list", "/coins/categories/list"),
    op!("coins_categories", "/coins/categories", [], ["order"]),
    // exchanges
    op!("exchanges", "/exchanges", [], ["per_page", "page"]),
    op!("exchanges_list", "/exchanges/list"),
    op!("exchanges_id", "/exchanges/{id}"),
    op!(
        "exchanges_id_tickers",
        "/exchanges/{id}/tickers",
        [],
        ["coin_ids", "include_exchange_logo", "page", "depth", "order"]
    ),
    op!(
        "exchanges_id_volume_chart",
        "/exchanges/{id}/volume_chart",
        ["days"],
        []
    ),
    // indexes
    op!("indexes", "/indexes", [], ["per_page", "page"]),
    op!("indexes_market_id_id", "/indexes/{market_id}/{id}"),
    op!("indexes_list", "/indexes/list"),
    // derivatives
    op!("derivatives", "/derivatives", [], ["include_tickers"]),
    op!(
        "derivatives_exchanges",
        "/derivatives/exchanges",
        [],
        ["order", "per_page", "page"]
    ),
    op!(
        "derivatives_exchanges_id",
        "/derivatives/exchanges/{id}",
        [],
        ["include_tickers"]
    ),
    op!("derivatives_exchanges_list", "/derivatives/exchanges/list"),
    // nfts
    op!("nfts_list", "/nfts/list", [], ["order", "per_page", "page"]),
    op!("nfts_id", "/nfts/{id}"),
    // exchange rates, search, trending, global
    op!("exchange_rates", "/exchange_rates"),
    op!("search", "/search", ["query"], []),
    op!("search_trending", "/search/trending"),
    op!("global", "/global"),
    op!("global_decentralized_finance_defi", "/global/decentralized_finance_defi"),
    // companies
    op!(
        "companies_public_treasury_coin_id",
        "/companies/public_treasury/{coin_id}"
    ),
];

/// Names of every registered operation
pub fn operation_names() -> Vec<&'static str> {
    OPERATIONS.iter().map(|op| op.name).collect()
}

/// Names of the pagination-capable operations
pub fn paginated_operation_names() -> Vec<&'static str> {
    OPERATIONS
        .iter()
        .filter(|op| op.is_paginated())
        .map(|op| op.name)
        .collect()
}

/// Look up an operation by name
pub fn find_operation(name: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|op| op.name == name)
}
